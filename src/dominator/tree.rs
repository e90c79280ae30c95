// Tue Jan 13 2026 - Alex

use crate::graph::{ReferenceGraph, StrengthFilter};
use crate::model::ObjectIndex;
use crate::utils::budget::{Budget, BudgetExceeded};
use serde::Serialize;

const UNDEFINED: u32 = u32::MAX;
const SUPER_ROOT: u32 = u32::MAX - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dominator {
    SuperRoot,
    Object(ObjectIndex),
}

/// Dominator tree over the live subgraph, rooted at a synthetic super-root
/// with an edge to every anchor.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    idom: Vec<u32>,
    postorder: Vec<ObjectIndex>,
    child_offsets: Vec<usize>,
    children: Vec<ObjectIndex>,
    passes: usize,
}

impl DominatorTree {
    /// Iterative fixpoint of Cooper, Harvey and Kennedy. Nodes are numbered
    /// by DFS postorder from the super-root; each pass visits them in
    /// reverse postorder and intersects the already-processed predecessors.
    /// Stops after a pass with no change. The budget is checked per pass.
    pub fn compute(
        graph: &ReferenceGraph,
        anchors: &[ObjectIndex],
        filter: StrengthFilter,
        budget: &Budget,
    ) -> Result<Self, BudgetExceeded> {
        let n = graph.node_count();
        let (order, po_of) = postorder(graph, anchors, filter);
        let m = order.len();
        let root = m as u32;

        let mut anchored = vec![false; n];
        for anchor in anchors {
            anchored[anchor.as_usize()] = true;
        }

        // Predecessors in postorder numbering, restricted to tree nodes.
        let mut pred_offsets = Vec::with_capacity(m + 1);
        let mut preds: Vec<u32> = Vec::new();
        pred_offsets.push(0);
        for &node in &order {
            for source in graph.predecessors(node, filter) {
                let p = po_of[source.as_usize()];
                if p != UNDEFINED {
                    preds.push(p);
                }
            }
            if anchored[node.as_usize()] {
                preds.push(root);
            }
            pred_offsets.push(preds.len());
        }

        let mut doms = vec![UNDEFINED; m + 1];
        doms[m] = root;
        let mut passes = 0;
        loop {
            budget.check_deadline()?;
            passes += 1;
            let mut changed = false;
            for b in (0..m).rev() {
                let mut new_idom = UNDEFINED;
                for &p in &preds[pred_offsets[b]..pred_offsets[b + 1]] {
                    if doms[p as usize] == UNDEFINED {
                        continue;
                    }
                    new_idom = if new_idom == UNDEFINED {
                        p
                    } else {
                        intersect(&doms, p, new_idom)
                    };
                }
                // No processed predecessor yet: revisit next pass.
                if new_idom == UNDEFINED {
                    continue;
                }
                if doms[b] != new_idom {
                    doms[b] = new_idom;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        log::debug!("dominators: {} nodes converged in {} passes", m, passes);

        let mut idom = vec![UNDEFINED; n];
        for (p, node) in order.iter().enumerate() {
            let d = doms[p];
            idom[node.as_usize()] = if d == root { SUPER_ROOT } else { order[d as usize].0 };
        }

        // Children lists; slot `n` holds the super-root's children.
        let mut child_offsets = vec![0usize; n + 2];
        for node in &order {
            child_offsets[slot(idom[node.as_usize()], n) + 1] += 1;
        }
        for i in 0..=n {
            child_offsets[i + 1] += child_offsets[i];
        }
        let mut cursor = child_offsets.clone();
        let mut children = vec![ObjectIndex(0); m];
        for &node in &order {
            let s = slot(idom[node.as_usize()], n);
            children[cursor[s]] = node;
            cursor[s] += 1;
        }

        Ok(Self {
            idom,
            postorder: order,
            child_offsets,
            children,
            passes,
        })
    }

    pub fn immediate_dominator(&self, index: ObjectIndex) -> Option<Dominator> {
        match self.idom.get(index.as_usize()).copied() {
            None | Some(UNDEFINED) => None,
            Some(SUPER_ROOT) => Some(Dominator::SuperRoot),
            Some(parent) => Some(Dominator::Object(ObjectIndex(parent))),
        }
    }

    pub fn contains(&self, index: ObjectIndex) -> bool {
        self.immediate_dominator(index).is_some()
    }

    pub fn children(&self, dominator: Dominator) -> &[ObjectIndex] {
        let n = self.idom.len();
        let s = match dominator {
            Dominator::SuperRoot => n,
            Dominator::Object(index) => index.as_usize(),
        };
        if s > n {
            return &[];
        }
        &self.children[self.child_offsets[s]..self.child_offsets[s + 1]]
    }

    pub fn postorder(&self) -> &[ObjectIndex] {
        &self.postorder
    }

    pub fn dominators_of(&self, index: ObjectIndex) -> Vec<ObjectIndex> {
        let mut chain = Vec::new();
        let mut current = self.immediate_dominator(index);
        while let Some(Dominator::Object(parent)) = current {
            chain.push(parent);
            current = self.immediate_dominator(parent);
        }
        chain
    }

    pub fn node_count(&self) -> usize {
        self.postorder.len()
    }

    pub fn passes(&self) -> usize {
        self.passes
    }
}

fn slot(idom: u32, n: usize) -> usize {
    if idom == SUPER_ROOT {
        n
    } else {
        idom as usize
    }
}

fn intersect(doms: &[u32], mut a: u32, mut b: u32) -> u32 {
    while a != b {
        while a < b {
            a = doms[a as usize];
        }
        while b < a {
            b = doms[b as usize];
        }
    }
    a
}

/// Iterative DFS from the super-root, whose children are the anchors in
/// ascending order. Returns the nodes in postorder and each node's number.
fn postorder(graph: &ReferenceGraph, anchors: &[ObjectIndex], filter: StrengthFilter) -> (Vec<ObjectIndex>, Vec<u32>) {
    let n = graph.node_count();
    let mut po_of = vec![UNDEFINED; n];
    let mut visited = vec![false; n];
    let mut order = Vec::new();
    let mut stack: Vec<(ObjectIndex, usize)> = Vec::new();

    for &anchor in anchors {
        if visited[anchor.as_usize()] {
            continue;
        }
        visited[anchor.as_usize()] = true;
        stack.push((anchor, 0));

        while let Some(top) = stack.len().checked_sub(1) {
            let (node, cursor) = stack[top];
            let edges = graph.outgoing(node);
            let mut next = cursor;
            let mut child = None;
            while next < edges.len() {
                let edge = &edges[next];
                next += 1;
                if filter.allows(edge.strength) && !visited[edge.target.as_usize()] {
                    child = Some(edge.target);
                    break;
                }
            }
            stack[top].1 = next;
            match child {
                Some(target) => {
                    visited[target.as_usize()] = true;
                    stack.push((target, 0));
                }
                None => {
                    stack.pop();
                    po_of[node.as_usize()] = order.len() as u32;
                    order.push(node);
                }
            }
        }
    }
    (order, po_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, EdgeLabel, ReferenceEdge};

    fn edge(from: u32, to: u32) -> ReferenceEdge {
        ReferenceEdge::new(ObjectIndex(from), ObjectIndex(to), EdgeKind::InstanceField, EdgeLabel::Field("f".into()))
    }

    fn tree(n: usize, edges: &[(u32, u32)], anchors: &[u32]) -> DominatorTree {
        let graph = ReferenceGraph::from_edges(n, edges.iter().map(|&(a, b)| edge(a, b)).collect(), Vec::new());
        let anchors: Vec<ObjectIndex> = anchors.iter().map(|&a| ObjectIndex(a)).collect();
        DominatorTree::compute(&graph, &anchors, StrengthFilter::strong_only(), &Budget::unlimited()).unwrap()
    }

    fn obj(i: u32) -> Option<Dominator> {
        Some(Dominator::Object(ObjectIndex(i)))
    }

    #[test]
    fn test_chain() {
        let t = tree(3, &[(0, 1), (1, 2)], &[0]);
        assert_eq!(t.immediate_dominator(ObjectIndex(0)), Some(Dominator::SuperRoot));
        assert_eq!(t.immediate_dominator(ObjectIndex(1)), obj(0));
        assert_eq!(t.immediate_dominator(ObjectIndex(2)), obj(1));
        assert_eq!(t.dominators_of(ObjectIndex(2)), vec![ObjectIndex(1), ObjectIndex(0)]);
    }

    #[test]
    fn test_cycle_terminates() {
        // 0 is the root; 1 <-> 2
        let t = tree(3, &[(0, 1), (1, 2), (2, 1)], &[0]);
        assert_eq!(t.immediate_dominator(ObjectIndex(1)), obj(0));
        assert_eq!(t.immediate_dominator(ObjectIndex(2)), obj(1));
    }

    #[test]
    fn test_diamond_joins_at_fork() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let t = tree(4, &[(0, 1), (0, 2), (1, 3), (2, 3)], &[0]);
        assert_eq!(t.immediate_dominator(ObjectIndex(3)), obj(0));
        assert_eq!(t.children(Dominator::Object(ObjectIndex(0))).len(), 3);
    }

    #[test]
    fn test_shared_by_two_roots_is_dominated_by_super_root() {
        let t = tree(3, &[(0, 2), (1, 2)], &[0, 1]);
        assert_eq!(t.immediate_dominator(ObjectIndex(2)), Some(Dominator::SuperRoot));
        assert_eq!(t.children(Dominator::SuperRoot).len(), 3);
    }

    #[test]
    fn test_irreducible_loop() {
        // Entry into a loop at two points: 0 -> 1, 0 -> 2, 1 <-> 2, 2 -> 3
        let t = tree(4, &[(0, 1), (0, 2), (1, 2), (2, 1), (2, 3)], &[0]);
        assert_eq!(t.immediate_dominator(ObjectIndex(1)), obj(0));
        assert_eq!(t.immediate_dominator(ObjectIndex(2)), obj(0));
        assert_eq!(t.immediate_dominator(ObjectIndex(3)), obj(2));
    }

    #[test]
    fn test_back_edge_to_anchor() {
        // A descendant pointing back at a second anchor must not make it
        // dominated by the first.
        let t = tree(3, &[(0, 2), (2, 1)], &[0, 1]);
        assert_eq!(t.immediate_dominator(ObjectIndex(1)), Some(Dominator::SuperRoot));
        assert_eq!(t.immediate_dominator(ObjectIndex(2)), obj(0));
    }

    #[test]
    fn test_unreached_nodes_are_not_in_tree() {
        let t = tree(3, &[(0, 1)], &[0]);
        assert!(!t.contains(ObjectIndex(2)));
        assert_eq!(t.node_count(), 2);
    }

    #[test]
    fn test_empty_live_set() {
        let t = tree(2, &[(0, 1)], &[]);
        assert_eq!(t.node_count(), 0);
        assert!(t.children(Dominator::SuperRoot).is_empty());
    }

    #[test]
    fn test_postorder_puts_children_first() {
        let t = tree(5, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)], &[0]);
        let position = |i: u32| t.postorder().iter().position(|&n| n == ObjectIndex(i));
        for node in t.postorder() {
            if let Some(Dominator::Object(parent)) = t.immediate_dominator(*node) {
                assert!(position(node.0) < position(parent.0));
            }
        }
    }
}
