// Tue Jan 13 2026 - Alex

use crate::dominator::Dominator;
use crate::hprof::Id;
use crate::model::ObjectIndex;
use crate::query::AnalysisContext;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetainedEntry {
    pub object_id: Id,
    pub class_name: String,
    pub retained_size: u64,
    pub shallow_size: u64,
}

impl RetainedEntry {
    fn of(ctx: &AnalysisContext<'_>, index: ObjectIndex, retained_size: u64) -> Self {
        Self {
            object_id: ctx.object_id(index),
            class_name: ctx.class_name(index),
            retained_size,
            shallow_size: ctx.shallow(index),
        }
    }
}

pub fn top_retained(ctx: &AnalysisContext<'_>, n: usize) -> Vec<RetainedEntry> {
    let retained = match ctx.retained {
        Some(retained) => retained,
        None => return Vec::new(),
    };
    let mut ranked: Vec<(u64, Id, ObjectIndex)> = ctx
        .live_indices()
        .into_par_iter()
        .filter_map(|index| retained.retained(index).map(|size| (size, ctx.object_id(index), index)))
        .collect();
    ranked.par_sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.truncate(n);
    ranked
        .into_iter()
        .map(|(size, _, index)| RetainedEntry::of(ctx, index, size))
        .collect()
}

pub fn dominated_children(ctx: &AnalysisContext<'_>, dominator: Dominator) -> Vec<RetainedEntry> {
    let (tree, retained) = match (ctx.dominators, ctx.retained) {
        (Some(tree), Some(retained)) => (tree, retained),
        _ => return Vec::new(),
    };
    let mut children: Vec<RetainedEntry> = tree
        .children(dominator)
        .iter()
        .map(|&child| RetainedEntry::of(ctx, child, retained.retained_or_zero(child)))
        .collect();
    children.sort_by(|a, b| b.retained_size.cmp(&a.retained_size).then(a.object_id.cmp(&b.object_id)));
    children
}

#[cfg(test)]
mod tests {
    use crate::hprof::{FieldType, FieldValue, Id};
    use crate::utils::testing::{analyze, HprofWriter};

    const PAIR: Id = 0x10;

    #[test]
    fn test_dominator_children_ranked() {
        let mut w = HprofWriter::new(4);
        w.define_class(PAIR, "com.example.Pair", 0, &[("left", FieldType::Object), ("right", FieldType::Object)]);
        w.root_jni_global(0x1);
        w.instance_with(0x1, PAIR, &[FieldValue::Object(0x2), FieldValue::Object(0x3)]);
        w.primitive_array(0x2, FieldType::Long, &[0; 64]);
        w.primitive_array(0x3, FieldType::Long, &[0; 16]);
        w.root_jni_global(0x4);
        w.instance_with(0x4, PAIR, &[FieldValue::Object(0x3), FieldValue::Object(0)]);
        let analysis = analyze(w.finish()).unwrap();

        let top: Vec<Id> = analysis.dominated_by(None).iter().map(|e| e.object_id).collect();
        assert_eq!(top, vec![0x1, 0x3, 0x4]);

        let children = analysis.dominated_by(Some(0x1));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].object_id, 0x2);
        assert_eq!(children[0].class_name, "long[]");
        assert_eq!(children[0].retained_size, 64);

        let ranked = analysis.top_retained(10);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].retained_size, 8 + 64);
        assert!(ranked.windows(2).all(|w| w[0].retained_size >= w[1].retained_size));
        assert!(analysis.dominated_by(Some(0xdead)).is_empty());
    }
}
