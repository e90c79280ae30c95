// Tue Jan 13 2026 - Alex

use crate::graph::{DanglingReference, EdgeKind, GraphStats, ReferenceEdge, Strength, StrengthFilter};
use crate::model::ObjectIndex;

#[derive(Debug, Clone)]
pub struct ReferenceGraph {
    node_count: usize,
    edges: Vec<ReferenceEdge>,
    out_offsets: Vec<usize>,
    in_offsets: Vec<usize>,
    in_edges: Vec<u32>,
    dangling: Vec<DanglingReference>,
}

impl ReferenceGraph {
    pub fn from_edges(node_count: usize, mut edges: Vec<ReferenceEdge>, dangling: Vec<DanglingReference>) -> Self {
        // Stable, so per-source insertion order survives.
        if !edges.windows(2).all(|w| w[0].source <= w[1].source) {
            edges.sort_by_key(|e| e.source);
        }

        let mut out_offsets = vec![0usize; node_count + 1];
        for edge in &edges {
            out_offsets[edge.source.as_usize() + 1] += 1;
        }
        for i in 0..node_count {
            out_offsets[i + 1] += out_offsets[i];
        }

        let mut in_offsets = vec![0usize; node_count + 1];
        for edge in &edges {
            in_offsets[edge.target.as_usize() + 1] += 1;
        }
        for i in 0..node_count {
            in_offsets[i + 1] += in_offsets[i];
        }
        let mut cursor = in_offsets.clone();
        let mut in_edges = vec![0u32; edges.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            let slot = &mut cursor[edge.target.as_usize()];
            in_edges[*slot] = edge_index as u32;
            *slot += 1;
        }

        Self {
            node_count,
            edges,
            out_offsets,
            in_offsets,
            in_edges,
            dangling,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, edge_index: u32) -> &ReferenceEdge {
        &self.edges[edge_index as usize]
    }

    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    pub fn outgoing(&self, node: ObjectIndex) -> &[ReferenceEdge] {
        let n = node.as_usize();
        &self.edges[self.out_offsets[n]..self.out_offsets[n + 1]]
    }

    pub fn incoming_indices(&self, node: ObjectIndex) -> &[u32] {
        let n = node.as_usize();
        &self.in_edges[self.in_offsets[n]..self.in_offsets[n + 1]]
    }

    pub fn incoming(&self, node: ObjectIndex) -> impl Iterator<Item = &ReferenceEdge> + '_ {
        self.incoming_indices(node).iter().map(move |&i| &self.edges[i as usize])
    }

    pub fn successors(&self, node: ObjectIndex, filter: StrengthFilter) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.outgoing(node)
            .iter()
            .filter(move |e| filter.allows(e.strength))
            .map(|e| e.target)
    }

    pub fn predecessors(&self, node: ObjectIndex, filter: StrengthFilter) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.incoming(node)
            .filter(move |e| filter.allows(e.strength))
            .map(|e| e.source)
    }

    pub fn has_incoming(&self, node: ObjectIndex, strength: Strength) -> bool {
        self.incoming(node).any(|e| e.strength == strength)
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.node_count,
            edges: self.edges.len(),
            dangling: self.dangling.len(),
            ..GraphStats::default()
        };
        for kind in EdgeKind::ALL {
            stats.edges_by_kind.insert(kind, 0);
        }
        for edge in &self.edges {
            *stats.edges_by_kind.entry(edge.kind).or_insert(0) += 1;
            *stats.edges_by_strength.entry(edge.strength).or_insert(0) += 1;
        }
        stats.max_out_degree = (0..self.node_count)
            .map(|n| self.out_offsets[n + 1] - self.out_offsets[n])
            .max()
            .unwrap_or(0);
        stats.max_in_degree = (0..self.node_count)
            .map(|n| self.in_offsets[n + 1] - self.in_offsets[n])
            .max()
            .unwrap_or(0);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeLabel;

    fn edge(from: u32, to: u32, field: &str) -> ReferenceEdge {
        ReferenceEdge::new(
            ObjectIndex(from),
            ObjectIndex(to),
            EdgeKind::InstanceField,
            EdgeLabel::Field(field.into()),
        )
    }

    #[test]
    fn test_incoming_is_inverse_of_outgoing() {
        let graph = ReferenceGraph::from_edges(
            4,
            vec![edge(0, 1, "a"), edge(0, 2, "b"), edge(1, 2, "c"), edge(3, 2, "d"), edge(2, 0, "e")],
            Vec::new(),
        );
        assert_eq!(graph.edge_count(), 5);
        let preds: Vec<_> = graph.predecessors(ObjectIndex(2), StrengthFilter::all()).collect();
        assert_eq!(preds, vec![ObjectIndex(0), ObjectIndex(1), ObjectIndex(3)]);

        for n in 0..4u32 {
            for e in graph.outgoing(ObjectIndex(n)) {
                assert!(graph.incoming(e.target).any(|i| i == e));
            }
        }
    }

    #[test]
    fn test_unsorted_input_keeps_source_order() {
        let graph = ReferenceGraph::from_edges(3, vec![edge(2, 0, "x"), edge(0, 1, "y"), edge(2, 1, "z")], Vec::new());
        let labels: Vec<String> = graph.outgoing(ObjectIndex(2)).iter().map(|e| e.label.to_string()).collect();
        assert_eq!(labels, vec![".x", ".z"]);
    }

    #[test]
    fn test_strength_filtering() {
        let graph = ReferenceGraph::from_edges(
            2,
            vec![edge(0, 1, "referent").with_strength(Strength::Weak)],
            Vec::new(),
        );
        assert_eq!(graph.successors(ObjectIndex(0), StrengthFilter::strong_only()).count(), 0);
        assert_eq!(graph.successors(ObjectIndex(0), StrengthFilter::STRONG | StrengthFilter::WEAK).count(), 1);
        assert!(graph.has_incoming(ObjectIndex(1), Strength::Weak));
    }

    #[test]
    fn test_empty_graph() {
        let graph = ReferenceGraph::from_edges(0, Vec::new(), Vec::new());
        assert_eq!(graph.node_count(), 0);
        let stats = graph.stats();
        assert_eq!(stats.max_out_degree, 0);
    }
}
