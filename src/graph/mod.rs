// Tue Jan 13 2026 - Alex

pub mod builder;
pub mod edge;
pub mod graph;
pub mod roots;
pub mod stats;

pub use builder::{classify_reference_class, static_target, GraphBuilder, REFERENT_FIELD};
pub use edge::{DanglingReference, EdgeKind, EdgeLabel, ReferenceEdge, Strength, StrengthFilter};
pub use graph::ReferenceGraph;
pub use roots::GcRootRegistry;
pub use stats::GraphStats;
