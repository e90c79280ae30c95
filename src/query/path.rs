// Tue Jan 13 2026 - Alex

use crate::graph::StrengthFilter;
use crate::hprof::{Id, RootCategory};
use crate::model::ObjectIndex;
use crate::query::AnalysisContext;
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub object_id: Id,
    pub class_name: String,
    pub via: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathResult {
    Found {
        root_category: RootCategory,
        steps: Vec<PathStep>,
    },
    Unreachable,
}

impl PathResult {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PathResult::Unreachable)
    }

    pub fn steps(&self) -> &[PathStep] {
        match self {
            PathResult::Found { steps, .. } => steps,
            PathResult::Unreachable => &[],
        }
    }

    pub fn object_ids(&self) -> Vec<Id> {
        self.steps().iter().map(|s| s.object_id).collect()
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathResult::Unreachable => f.write_str("unreachable"),
            PathResult::Found { root_category, steps } => {
                write!(f, "[{}]", root_category)?;
                for step in steps {
                    match &step.via {
                        Some(via) => write!(f, " -{}-> {}@{:#x}", via, step.class_name, step.object_id)?,
                        None => write!(f, " {}@{:#x}", step.class_name, step.object_id)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Shortest path from an anchoring GC root to `target`, found by
/// level-wise BFS over incoming edges. Edges whose strength is in
/// `exclude` are not followed.
///
/// Predecessor edges are visited in ascending edge order. When a level
/// reaches several roots, the one with the lowest (category, object id)
/// wins.
pub fn path_to_root(ctx: &AnalysisContext<'_>, target: ObjectIndex, exclude: StrengthFilter) -> PathResult {
    if !ctx.is_live(target) {
        return PathResult::Unreachable;
    }
    let allowed = exclude.complement();
    let graph = ctx.graph;

    // Edge leading from each visited node one step closer to the target.
    let mut toward_target: AHashMap<ObjectIndex, Option<u32>> = AHashMap::new();
    toward_target.insert(target, None);
    let mut frontier = vec![target];

    loop {
        let best = frontier
            .iter()
            .filter_map(|&node| {
                ctx.roots
                    .primary_category(node, ctx.anchor_unreachable)
                    .map(|category| (category, ctx.object_id(node), node))
            })
            .min();
        if let Some((root_category, _, root)) = best {
            return PathResult::Found {
                root_category,
                steps: walk_to_target(ctx, root, &toward_target),
            };
        }

        let mut next = Vec::new();
        for &node in &frontier {
            for &edge_index in graph.incoming_indices(node) {
                let edge = graph.edge(edge_index);
                if !allowed.allows(edge.strength) || !ctx.is_live(edge.source) {
                    continue;
                }
                if toward_target.contains_key(&edge.source) {
                    continue;
                }
                toward_target.insert(edge.source, Some(edge_index));
                next.push(edge.source);
            }
        }
        if next.is_empty() {
            return PathResult::Unreachable;
        }
        frontier = next;
    }
}

fn walk_to_target(
    ctx: &AnalysisContext<'_>,
    root: ObjectIndex,
    toward_target: &AHashMap<ObjectIndex, Option<u32>>,
) -> Vec<PathStep> {
    let mut steps = vec![PathStep {
        object_id: ctx.object_id(root),
        class_name: ctx.class_name(root),
        via: None,
    }];
    let mut current = root;
    while let Some(Some(edge_index)) = toward_target.get(&current) {
        let edge = ctx.graph.edge(*edge_index);
        current = edge.target;
        steps.push(PathStep {
            object_id: ctx.object_id(current),
            class_name: ctx.class_name(current),
            via: Some(edge.label.to_string()),
        });
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hprof::{FieldType, FieldValue, SubRecordTag};
    use crate::utils::testing::{analyze, HprofWriter};

    const NODE: Id = 0x10;

    fn writer() -> HprofWriter {
        let mut w = HprofWriter::new(8);
        w.define_class(NODE, "com.example.Node", 0, &[("next", FieldType::Object), ("other", FieldType::Object)]);
        w
    }

    fn node(w: &mut HprofWriter, id: Id, next: Id, other: Id) {
        w.instance_with(id, NODE, &[FieldValue::Object(next), FieldValue::Object(other)]);
    }

    #[test]
    fn test_lowest_category_wins_at_equal_depth() {
        let mut w = writer();
        w.root_in_frame(SubRecordTag::RootJavaFrame, 0x1, 1, 0);
        w.root_jni_global(0x2);
        node(&mut w, 0x1, 0x3, 0);
        node(&mut w, 0x2, 0x3, 0);
        node(&mut w, 0x3, 0, 0);
        let analysis = analyze(w.finish()).unwrap();

        match analysis.path_to_root(0x3, StrengthFilter::empty()) {
            PathResult::Found { root_category, steps } => {
                assert_eq!(root_category, RootCategory::JniGlobal);
                assert_eq!(steps.len(), 2);
                assert_eq!(steps[0].object_id, 0x2);
                assert_eq!(steps[1].via.as_deref(), Some(".next"));
            }
            PathResult::Unreachable => panic!("expected a path"),
        }
    }

    #[test]
    fn test_lowest_object_id_breaks_category_tie() {
        let mut w = writer();
        w.root_jni_global(0x5);
        w.root_jni_global(0x4);
        node(&mut w, 0x5, 0x6, 0);
        node(&mut w, 0x4, 0, 0x6);
        node(&mut w, 0x6, 0, 0);
        let analysis = analyze(w.finish()).unwrap();

        let path = analysis.path_to_root(0x6, StrengthFilter::empty());
        assert_eq!(path.object_ids(), vec![0x4, 0x6]);
        assert_eq!(path.steps()[1].via.as_deref(), Some(".other"));
    }

    #[test]
    fn test_shortest_path_preferred() {
        let mut w = writer();
        w.root_jni_global(0x1);
        w.root(SubRecordTag::RootMonitorUsed, 0x9);
        node(&mut w, 0x1, 0x2, 0);
        node(&mut w, 0x2, 0x3, 0);
        node(&mut w, 0x3, 0x4, 0);
        node(&mut w, 0x9, 0x4, 0);
        node(&mut w, 0x4, 0, 0);
        let analysis = analyze(w.finish()).unwrap();

        let path = analysis.path_to_root(0x4, StrengthFilter::empty());
        assert_eq!(path.object_ids(), vec![0x9, 0x4]);
        assert!(matches!(
            path,
            PathResult::Found {
                root_category: RootCategory::MonitorUsed,
                ..
            }
        ));
    }

    #[test]
    fn test_root_is_its_own_path() {
        let mut w = writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0x1, 0);
        let analysis = analyze(w.finish()).unwrap();

        let path = analysis.path_to_root(0x1, StrengthFilter::empty());
        assert_eq!(path.object_ids(), vec![0x1]);
        assert_eq!(path.steps()[0].via, None);
        assert!(path.to_string().contains("com.example.Node@0x1"));
    }

    #[test]
    fn test_array_element_label() {
        let mut w = writer();
        w.define_class(0x20, "com.example.Node[]", 0, &[]);
        w.root_jni_global(0x1);
        w.object_array(0x1, 0x20, &[0, 0, 0x2]);
        node(&mut w, 0x2, 0, 0);
        let analysis = analyze(w.finish()).unwrap();

        let path = analysis.path_to_root(0x2, StrengthFilter::empty());
        assert_eq!(path.object_ids(), vec![0x1, 0x2]);
        assert_eq!(path.steps()[0].class_name, "com.example.Node[]");
        assert_eq!(path.steps()[1].via.as_deref(), Some("[2]"));
    }
}
