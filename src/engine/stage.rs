// Tue Jan 13 2026 - Alex

use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Parse,
    Model,
    Graph,
    Roots,
    Reachability,
    Dominators,
    RetainedSizes,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Parse,
        Stage::Model,
        Stage::Graph,
        Stage::Roots,
        Stage::Reachability,
        Stage::Dominators,
        Stage::RetainedSizes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Model => "model",
            Stage::Graph => "graph",
            Stage::Roots => "roots",
            Stage::Reachability => "reachability",
            Stage::Dominators => "dominators",
            Stage::RetainedSizes => "retained-sizes",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageState {
    Completed,
    Cancelled,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: Stage,
    pub state: StageState,
    pub millis: f64,
}

impl StageTiming {
    pub fn new(stage: Stage, state: StageState, elapsed: Duration) -> Self {
        Self {
            stage,
            state,
            millis: elapsed.as_secs_f64() * 1000.0,
        }
    }
}
