// Tue Jan 13 2026 - Alex

pub mod reachability;
pub mod retained;
pub mod tree;

pub use reachability::LiveSet;
pub use retained::RetainedSizes;
pub use tree::{Dominator, DominatorTree};
