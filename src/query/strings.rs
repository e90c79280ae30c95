// Tue Jan 13 2026 - Alex

use crate::config::StringConfig;
use crate::hprof::{FieldType, Id};
use crate::model::{HeapObject, ObjectIndex};
use crate::query::AnalysisContext;
use crate::utils::{truncate_string, ContentHasher};
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

const SAMPLE_IDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateStringGroup {
    pub content_hash: u64,
    pub content_bytes: usize,
    pub count: usize,
    pub per_instance_overhead: u64,
    pub wasted_bytes: u64,
    pub preview: String,
    pub sample_ids: Vec<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringDuplicateReport {
    pub total_strings: usize,
    pub distinct_contents: usize,
    pub total_wasted: u64,
    pub groups: Vec<DuplicateStringGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ContentKey {
    hash: u64,
    len: usize,
    element_type: FieldType,
}

struct StringContent<'a> {
    key: ContentKey,
    bytes: &'a [u8],
    utf16_le: bool,
    array: ObjectIndex,
}

/// Backing content of a string instance: the value array, narrowed by the
/// `offset`/`count` fields older runtimes carry.
fn string_content<'a>(ctx: &AnalysisContext<'a>, index: ObjectIndex, value_field: &str) -> Option<StringContent<'a>> {
    let decoder = ctx.decoder();
    let array = decoder.read_reference(index, value_field)?;
    let (element_type, data) = ctx.model.objects.get(array).object.primitive_data()?;
    let width = element_type.size(ctx.model.objects.id_size());

    let offset = decoder.read_int(index, "offset").unwrap_or(0).max(0) as usize;
    let count = decoder.read_int(index, "count").map(|c| c.max(0) as usize);
    let start = (offset * width).min(data.len());
    let end = match count {
        Some(count) => (start + count * width).min(data.len()),
        None => data.len(),
    };
    let bytes = &data[start..end];
    let utf16_le = element_type == FieldType::Byte && decoder.read_int(index, "coder") == Some(1);

    Some(StringContent {
        key: ContentKey {
            hash: ContentHasher::fnv1a_64(bytes),
            len: bytes.len(),
            element_type,
        },
        bytes,
        utf16_le,
        array,
    })
}

fn decode_preview(content: &StringContent<'_>, max_chars: usize) -> String {
    let text = match content.key.element_type {
        FieldType::Char => {
            let units: Vec<u16> = content.bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
            String::from_utf16_lossy(&units)
        }
        FieldType::Byte if content.utf16_le => {
            let units: Vec<u16> = content.bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            String::from_utf16_lossy(&units)
        }
        _ => content.bytes.iter().map(|&b| b as char).collect(),
    };
    truncate_string(&text, max_chars)
}

/// Groups live strings by backing content. Wasted memory of a group is
/// `(count - 1) * per_instance_overhead`.
pub fn duplicate_strings(ctx: &AnalysisContext<'_>, config: &StringConfig) -> StringDuplicateReport {
    let class_ids = ctx.classes_where(|name| name == config.string_class);
    let strings = ctx.live_instances_of(&class_ids);
    let total_strings = strings.len();

    let mut contents: Vec<(StringContent<'_>, ObjectIndex)> = strings
        .into_par_iter()
        .filter_map(|index| string_content(ctx, index, &config.value_field).map(|c| (c, index)))
        .collect();
    contents.par_sort_unstable_by(|a, b| a.0.key.cmp(&b.0.key).then(a.1.cmp(&b.1)));

    let mut distinct_contents = 0;
    let mut groups = Vec::new();
    for (key, members) in &contents.iter().chunk_by(|(content, _)| content.key) {
        distinct_contents += 1;
        let members: Vec<&(StringContent<'_>, ObjectIndex)> = members.collect();
        if members.len() < config.min_group_size {
            continue;
        }
        let (first, first_index) = members[0];
        let per_instance_overhead = ctx.shallow(*first_index) + ctx.shallow(first.array);
        let count = members.len();
        groups.push(DuplicateStringGroup {
            content_hash: key.hash,
            content_bytes: key.len,
            count,
            per_instance_overhead,
            wasted_bytes: (count as u64 - 1) * per_instance_overhead,
            preview: decode_preview(first, config.preview_chars),
            sample_ids: members.iter().take(SAMPLE_IDS).map(|(_, i)| ctx.object_id(*i)).collect(),
        });
    }
    groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes).then(a.content_hash.cmp(&b.content_hash)));

    let total_wasted = groups.iter().map(|g| g.wasted_bytes).sum();
    log::debug!(
        "strings: {} live, {} distinct, {} duplicate groups",
        total_strings,
        distinct_contents,
        groups.len()
    );
    StringDuplicateReport {
        total_strings,
        distinct_contents,
        total_wasted,
        groups,
    }
}

pub fn read_string(ctx: &AnalysisContext<'_>, index: ObjectIndex, config: &StringConfig) -> Option<String> {
    if !matches!(ctx.model.objects.get(index).object, HeapObject::Instance { .. }) {
        return None;
    }
    let content = string_content(ctx, index, &config.value_field)?;
    Some(decode_preview(&content, usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hprof::{FieldValue, Id};
    use crate::utils::testing::{analyze, HprofWriter};

    const STRING: Id = 0x10;
    const COMPACT_STRING: Id = 0x11;

    #[test]
    fn test_offset_and_count_narrow_content() {
        let mut w = HprofWriter::new(4);
        w.define_class(
            STRING,
            "java.lang.String",
            0,
            &[("value", FieldType::Object), ("offset", FieldType::Int), ("count", FieldType::Int)],
        );
        w.char_array(0x100, "hello world");
        for (id, offset, count) in [(0x1, 0, 5), (0x2, 6, 5), (0x3, 0, 5)] {
            w.root_jni_global(id);
            w.instance_with(
                id,
                STRING,
                &[FieldValue::Object(0x100), FieldValue::Int(offset), FieldValue::Int(count)],
            );
        }
        let analysis = analyze(w.finish()).unwrap();
        let ctx = analysis.context();
        let config = &analysis.config().strings;

        let second = ctx.model.objects.resolve(0x2).unwrap();
        assert_eq!(read_string(&ctx, second, config).as_deref(), Some("world"));

        let report = analysis.duplicate_strings();
        assert_eq!(report.total_strings, 3);
        assert_eq!(report.distinct_contents, 2);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].preview, "hello");
        assert_eq!(report.groups[0].sample_ids, vec![0x1, 0x3]);
    }

    #[test]
    fn test_latin1_and_utf16_byte_strings() {
        let mut w = HprofWriter::new(4);
        w.define_class(
            COMPACT_STRING,
            "java.lang.String",
            0,
            &[("value", FieldType::Object), ("coder", FieldType::Byte)],
        );
        w.root_jni_global(0x1);
        w.instance_with(0x1, COMPACT_STRING, &[FieldValue::Object(0x101), FieldValue::Byte(0)]);
        w.primitive_array(0x101, FieldType::Byte, b"latin");
        w.root_jni_global(0x2);
        w.instance_with(0x2, COMPACT_STRING, &[FieldValue::Object(0x102), FieldValue::Byte(1)]);
        let utf16: Vec<u8> = "é!".encode_utf16().flat_map(|c| c.to_le_bytes()).collect();
        w.primitive_array(0x102, FieldType::Byte, &utf16);
        let analysis = analyze(w.finish()).unwrap();
        let ctx = analysis.context();
        let config = &analysis.config().strings;

        let latin = ctx.model.objects.resolve(0x1).unwrap();
        let wide = ctx.model.objects.resolve(0x2).unwrap();
        let array = ctx.model.objects.resolve(0x101).unwrap();
        assert_eq!(read_string(&ctx, latin, config).as_deref(), Some("latin"));
        assert_eq!(read_string(&ctx, wide, config).as_deref(), Some("é!"));
        assert_eq!(read_string(&ctx, array, config), None);
    }

    #[test]
    fn test_long_preview_truncated() {
        let mut w = HprofWriter::new(4);
        w.define_class(STRING, "java.lang.String", 0, &[("value", FieldType::Object)]);
        let text = "x".repeat(200);
        for id in [0x1, 0x2] {
            w.root_jni_global(id);
            w.instance_with(id, STRING, &[FieldValue::Object(id + 0x100)]);
            w.char_array(id + 0x100, &text);
        }
        let analysis = analyze(w.finish()).unwrap();
        let report = analysis.duplicate_strings();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].preview.chars().count(), 64);
        assert!(report.groups[0].preview.ends_with("..."));
        assert_eq!(report.groups[0].wasted_bytes, 4 + 400);
    }
}
