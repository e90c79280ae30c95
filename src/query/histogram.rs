// Tue Jan 13 2026 - Alex

use crate::hprof::{FieldType, Id};
use crate::model::{package_of, HeapObject, ObjectIndex};
use crate::query::AnalysisContext;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct HistogramFilter {
    pub heap_name: Option<String>,
    pub live_only: bool,
}

impl HistogramFilter {
    pub fn live() -> Self {
        Self {
            heap_name: None,
            live_only: true,
        }
    }

    pub fn with_heap(mut self, heap_name: &str) -> Self {
        self.heap_name = Some(heap_name.to_string());
        self
    }

    fn accepts(&self, ctx: &AnalysisContext<'_>, index: ObjectIndex) -> bool {
        if self.live_only && !ctx.is_live(index) {
            return false;
        }
        match &self.heap_name {
            Some(name) => ctx.model.objects.heap_name(ctx.model.objects.get(index).heap) == name,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeapTotals {
    pub instance_count: usize,
    pub instance_bytes: u64,
    pub object_array_count: usize,
    pub object_array_bytes: u64,
    pub primitive_array_count: usize,
    pub primitive_array_bytes: u64,
    pub class_count: usize,
    pub class_bytes: u64,
}

impl HeapTotals {
    pub fn object_count(&self) -> usize {
        self.instance_count + self.object_array_count + self.primitive_array_count + self.class_count
    }

    pub fn total_bytes(&self) -> u64 {
        self.instance_bytes + self.object_array_bytes + self.primitive_array_bytes + self.class_bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassHistogramEntry {
    pub class_name: String,
    pub instance_count: usize,
    pub shallow_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageHistogramEntry {
    pub package: String,
    pub class_count: usize,
    pub instance_count: usize,
    pub shallow_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimitiveArrayEntry {
    pub element_type: FieldType,
    pub count: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeArray {
    pub object_id: Id,
    pub element_type: FieldType,
    pub length: u32,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringStats {
    pub count: usize,
    pub shallow_bytes: u64,
    pub value_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HistogramKey {
    Instance(Id),
    ObjectArray(Id),
    PrimitiveArray(FieldType),
    ClassObject,
}

pub fn heap_totals(ctx: &AnalysisContext<'_>, filter: &HistogramFilter) -> HeapTotals {
    let mut totals = HeapTotals::default();
    for (index, entry) in ctx.model.objects.iter() {
        if !filter.accepts(ctx, index) {
            continue;
        }
        let size = ctx.shallow(index);
        match entry.object {
            HeapObject::Instance { .. } => {
                totals.instance_count += 1;
                totals.instance_bytes += size;
            }
            HeapObject::ObjectArray { .. } => {
                totals.object_array_count += 1;
                totals.object_array_bytes += size;
            }
            HeapObject::PrimitiveArray { .. } => {
                totals.primitive_array_count += 1;
                totals.primitive_array_bytes += size;
            }
            HeapObject::Class { .. } => {
                totals.class_count += 1;
                totals.class_bytes += size;
            }
        }
    }
    totals
}

pub fn class_histogram(ctx: &AnalysisContext<'_>, filter: &HistogramFilter) -> Vec<ClassHistogramEntry> {
    let mut buckets: IndexMap<HistogramKey, (usize, u64, ObjectIndex)> = IndexMap::new();
    for (index, entry) in ctx.model.objects.iter() {
        if !filter.accepts(ctx, index) {
            continue;
        }
        let key = match &entry.object {
            HeapObject::Instance { class_id, .. } => HistogramKey::Instance(*class_id),
            HeapObject::ObjectArray { array_class_id, .. } => HistogramKey::ObjectArray(*array_class_id),
            HeapObject::PrimitiveArray { element_type, .. } => HistogramKey::PrimitiveArray(*element_type),
            HeapObject::Class { .. } => HistogramKey::ClassObject,
        };
        let bucket = buckets.entry(key).or_insert((0, 0, index));
        bucket.0 += 1;
        bucket.1 += ctx.shallow(index);
    }

    let mut entries: Vec<ClassHistogramEntry> = buckets
        .into_iter()
        .map(|(key, (instance_count, shallow_bytes, sample))| ClassHistogramEntry {
            class_name: match key {
                HistogramKey::ClassObject => "java.lang.Class".to_string(),
                _ => ctx.class_name(sample),
            },
            instance_count,
            shallow_bytes,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.shallow_bytes
            .cmp(&a.shallow_bytes)
            .then(b.instance_count.cmp(&a.instance_count))
            .then(a.class_name.cmp(&b.class_name))
    });
    entries
}

pub fn package_histogram(ctx: &AnalysisContext<'_>, filter: &HistogramFilter) -> Vec<PackageHistogramEntry> {
    let mut packages: IndexMap<String, PackageHistogramEntry> = IndexMap::new();
    for class in class_histogram(ctx, filter) {
        let element = class.class_name.trim_end_matches("[]");
        let package = package_of(element).unwrap_or("<default>").to_string();
        let entry = packages.entry(package.clone()).or_insert(PackageHistogramEntry {
            package,
            class_count: 0,
            instance_count: 0,
            shallow_bytes: 0,
        });
        entry.class_count += 1;
        entry.instance_count += class.instance_count;
        entry.shallow_bytes += class.shallow_bytes;
    }
    let mut entries: Vec<PackageHistogramEntry> = packages.into_values().collect();
    entries.sort_by(|a, b| b.shallow_bytes.cmp(&a.shallow_bytes).then(a.package.cmp(&b.package)));
    entries
}

pub fn primitive_array_histogram(ctx: &AnalysisContext<'_>, filter: &HistogramFilter) -> Vec<PrimitiveArrayEntry> {
    let mut by_type: IndexMap<FieldType, (usize, u64)> = IndexMap::new();
    for (index, entry) in ctx.model.objects.iter() {
        if let HeapObject::PrimitiveArray { element_type, .. } = entry.object {
            if filter.accepts(ctx, index) {
                let slot = by_type.entry(element_type).or_insert((0, 0));
                slot.0 += 1;
                slot.1 += ctx.shallow(index);
            }
        }
    }
    let mut entries: Vec<PrimitiveArrayEntry> = by_type
        .into_iter()
        .map(|(element_type, (count, bytes))| PrimitiveArrayEntry {
            element_type,
            count,
            bytes,
        })
        .collect();
    entries.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    entries
}

pub fn large_primitive_arrays(ctx: &AnalysisContext<'_>, filter: &HistogramFilter, min_bytes: u64) -> Vec<LargeArray> {
    let mut arrays: Vec<LargeArray> = ctx
        .model
        .objects
        .iter()
        .filter_map(|(index, entry)| match entry.object {
            HeapObject::PrimitiveArray { element_type, length, .. } => {
                let bytes = ctx.shallow(index);
                (bytes >= min_bytes && filter.accepts(ctx, index)).then(|| LargeArray {
                    object_id: entry.id,
                    element_type,
                    length,
                    bytes,
                })
            }
            _ => None,
        })
        .collect();
    arrays.sort_by(|a, b| b.bytes.cmp(&a.bytes).then(a.object_id.cmp(&b.object_id)));
    arrays
}

pub fn string_stats(ctx: &AnalysisContext<'_>, filter: &HistogramFilter, string_class: &str, value_field: &str) -> StringStats {
    let class_ids = ctx.classes_where(|name| name == string_class);
    let decoder = ctx.decoder();
    let mut stats = StringStats::default();
    for (index, entry) in ctx.model.objects.iter() {
        let is_string = matches!(&entry.object, HeapObject::Instance { class_id, .. } if class_ids.contains(class_id));
        if !is_string || !filter.accepts(ctx, index) {
            continue;
        }
        stats.count += 1;
        stats.shallow_bytes += ctx.shallow(index);
        if let Some(value) = decoder.read_reference(index, value_field) {
            stats.value_bytes += ctx.shallow(value);
        }
    }
    stats
}
