// Tue Jan 13 2026 - Alex

pub mod core;
pub mod error;
pub mod result;
pub mod stage;

pub use self::core::{Engine, EngineState};
pub use error::{AnalysisWarning, EngineError, WarningSummary};
pub use result::{AnalysisSummary, HeapAnalysis};
pub use stage::{Stage, StageState, StageTiming};
