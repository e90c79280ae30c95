// Tue Jan 13 2026 - Alex

use crate::dominator::{Dominator, DominatorTree};
use crate::model::ObjectIndex;

#[derive(Debug, Clone)]
pub struct RetainedSizes {
    shallow: Vec<u64>,
    retained: Vec<u64>,
    in_tree: Vec<bool>,
    root_retained: u64,
}

impl RetainedSizes {
    pub fn compute(tree: &DominatorTree, shallow: Vec<u64>) -> Self {
        let mut retained = vec![0u64; shallow.len()];
        let mut in_tree = vec![false; shallow.len()];
        let mut root_retained = 0u64;

        for &node in tree.postorder() {
            let n = node.as_usize();
            in_tree[n] = true;
            retained[n] += shallow[n];
            match tree.immediate_dominator(node) {
                Some(Dominator::Object(parent)) => retained[parent.as_usize()] += retained[n],
                Some(Dominator::SuperRoot) => root_retained += retained[n],
                None => {}
            }
        }

        Self {
            shallow,
            retained,
            in_tree,
            root_retained,
        }
    }

    pub fn shallow(&self, index: ObjectIndex) -> u64 {
        self.shallow.get(index.as_usize()).copied().unwrap_or(0)
    }

    pub fn retained(&self, index: ObjectIndex) -> Option<u64> {
        let n = index.as_usize();
        match self.in_tree.get(n) {
            Some(true) => Some(self.retained[n]),
            _ => None,
        }
    }

    pub fn retained_or_zero(&self, index: ObjectIndex) -> u64 {
        self.retained(index).unwrap_or(0)
    }

    pub fn root_retained(&self) -> u64 {
        self.root_retained
    }

    pub fn shallow_sizes(&self) -> &[u64] {
        &self.shallow
    }

    pub fn live_shallow_total(&self) -> u64 {
        self.shallow
            .iter()
            .zip(&self.in_tree)
            .filter(|(_, in_tree)| **in_tree)
            .map(|(size, _)| *size)
            .sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.root_retained == self.live_shallow_total()
    }
}
