// Tue Jan 13 2026 - Alex

use crate::graph::{ReferenceGraph, StrengthFilter};
use crate::model::ObjectIndex;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSet {
    live: Vec<bool>,
    count: usize,
    filter: StrengthFilter,
}

impl LiveSet {
    pub fn compute(graph: &ReferenceGraph, anchors: &[ObjectIndex], filter: StrengthFilter) -> Self {
        let mut live = vec![false; graph.node_count()];
        let mut queue = VecDeque::new();
        let mut count = 0;

        for &anchor in anchors {
            if !live[anchor.as_usize()] {
                live[anchor.as_usize()] = true;
                count += 1;
                queue.push_back(anchor);
            }
        }

        while let Some(node) = queue.pop_front() {
            for target in graph.successors(node, filter) {
                if !live[target.as_usize()] {
                    live[target.as_usize()] = true;
                    count += 1;
                    queue.push_back(target);
                }
            }
        }

        log::debug!(
            "reachability over {:?}: {} live of {}",
            filter.strengths(),
            count,
            graph.node_count()
        );
        Self { live, count, filter }
    }

    pub fn is_live(&self, index: ObjectIndex) -> bool {
        self.live.get(index.as_usize()).copied().unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.count
    }

    pub fn garbage_count(&self) -> usize {
        self.live.len() - self.count
    }

    pub fn node_count(&self) -> usize {
        self.live.len()
    }

    pub fn filter(&self) -> StrengthFilter {
        self.filter
    }

    pub fn iter_live(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(i, _)| ObjectIndex(i as u32))
    }

    pub fn iter_garbage(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| !**live)
            .map(|(i, _)| ObjectIndex(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, EdgeLabel, ReferenceEdge, Strength};

    fn edge(from: u32, to: u32) -> ReferenceEdge {
        ReferenceEdge::new(ObjectIndex(from), ObjectIndex(to), EdgeKind::InstanceField, EdgeLabel::Field("f".into()))
    }

    #[test]
    fn test_chain_and_garbage() {
        // 0 -> 1 -> 2, 3 isolated, 4 -> 1 but unreachable itself
        let graph = ReferenceGraph::from_edges(5, vec![edge(0, 1), edge(1, 2), edge(4, 1)], Vec::new());
        let live = LiveSet::compute(&graph, &[ObjectIndex(0)], StrengthFilter::strong_only());
        assert_eq!(live.live_count(), 3);
        assert_eq!(live.garbage_count(), 2);
        assert!(!live.is_live(ObjectIndex(3)));
        assert!(!live.is_live(ObjectIndex(4)));
        assert_eq!(live.iter_garbage().collect::<Vec<_>>(), vec![ObjectIndex(3), ObjectIndex(4)]);
    }

    #[test]
    fn test_idempotent() {
        let graph = ReferenceGraph::from_edges(4, vec![edge(0, 1), edge(1, 0), edge(2, 3)], Vec::new());
        let anchors = [ObjectIndex(0), ObjectIndex(2)];
        let first = LiveSet::compute(&graph, &anchors, StrengthFilter::strong_only());
        let second = LiveSet::compute(&graph, &anchors, StrengthFilter::strong_only());
        assert_eq!(first, second);
    }

    #[test]
    fn test_weak_edges_respect_filter() {
        let graph = ReferenceGraph::from_edges(
            2,
            vec![edge(0, 1).with_strength(Strength::Weak)],
            Vec::new(),
        );
        let strong = LiveSet::compute(&graph, &[ObjectIndex(0)], StrengthFilter::strong_only());
        assert!(!strong.is_live(ObjectIndex(1)));
        let weak = LiveSet::compute(&graph, &[ObjectIndex(0)], StrengthFilter::STRONG | StrengthFilter::WEAK);
        assert!(weak.is_live(ObjectIndex(1)));
    }

    #[test]
    fn test_no_anchors() {
        let graph = ReferenceGraph::from_edges(2, vec![edge(0, 1)], Vec::new());
        let live = LiveSet::compute(&graph, &[], StrengthFilter::strong_only());
        assert_eq!(live.live_count(), 0);
        assert_eq!(live.iter_live().count(), 0);
    }
}
