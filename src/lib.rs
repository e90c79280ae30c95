// Tue Jan 15 2026 - Alex

pub mod config;
pub mod dominator;
pub mod engine;
pub mod graph;
pub mod hprof;
pub mod model;
pub mod query;
pub mod utils;

pub use config::AnalysisConfig;
pub use engine::{AnalysisWarning, Engine, EngineError, HeapAnalysis};
pub use graph::{Strength, StrengthFilter};
pub use hprof::{HprofError, HprofParser, HprofSource, Id, RootCategory};
pub use query::{LeakSuspect, PathResult};
