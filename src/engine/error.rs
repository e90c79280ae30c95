// Tue Jan 13 2026 - Alex

use crate::engine::Stage;
use crate::hprof::HprofError;
use crate::model::ModelError;
use crate::utils::BudgetExceeded;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Hprof(#[from] HprofError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start query thread pool: {0}")]
    ThreadPool(String),
}

#[derive(Error, Debug)]
pub enum AnalysisWarning {
    #[error("parse stopped early: {0}")]
    Parse(HprofError),

    #[error("{0}")]
    Model(ModelError),

    #[error("{0} stage cancelled: {1}")]
    Cancelled(Stage, BudgetExceeded),
}

impl AnalysisWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisWarning::Parse(e) => e.kind(),
            AnalysisWarning::Model(e) => e.kind(),
            AnalysisWarning::Cancelled(..) => "cancelled",
        }
    }
}

impl From<ModelError> for AnalysisWarning {
    fn from(e: ModelError) -> Self {
        AnalysisWarning::Model(e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningSummary {
    pub total: usize,
    pub by_kind: IndexMap<&'static str, usize>,
}

impl WarningSummary {
    pub fn from_warnings(warnings: &[AnalysisWarning]) -> Self {
        let mut by_kind: IndexMap<&'static str, usize> = IndexMap::new();
        for warning in warnings {
            *by_kind.entry(warning.kind()).or_insert(0) += 1;
        }
        Self {
            total: warnings.len(),
            by_kind,
        }
    }

    pub fn count(&self, kind: &str) -> usize {
        self.by_kind.get(kind).copied().unwrap_or(0)
    }
}
