// Tue Jan 13 2026 - Alex

use crate::graph::{EdgeKind, Strength};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub dangling: usize,
    pub max_out_degree: usize,
    pub max_in_degree: usize,
    pub edges_by_kind: IndexMap<EdgeKind, usize>,
    pub edges_by_strength: IndexMap<Strength, usize>,
}

impl GraphStats {
    pub fn non_strong_edges(&self) -> usize {
        self.edges_by_strength
            .iter()
            .filter(|(s, _)| **s != Strength::Strong)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn average_out_degree(&self) -> f64 {
        crate::utils::ratio(self.edges as u64, self.nodes as u64)
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reference graph:")?;
        writeln!(f, "  Nodes: {}", self.nodes)?;
        writeln!(f, "  Edges: {} ({:.2} per node)", self.edges, self.average_out_degree())?;
        for (kind, count) in &self.edges_by_kind {
            writeln!(f, "    {}: {}", kind.name(), count)?;
        }
        writeln!(f, "  Non-strong edges: {}", self.non_strong_edges())?;
        writeln!(f, "  Dangling references: {}", self.dangling)?;
        write!(f, "  Max degree: out {} / in {}", self.max_out_degree, self.max_in_degree)
    }
}
