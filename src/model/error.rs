// Tue Jan 13 2026 - Alex

use crate::hprof::Id;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid class hierarchy for class {class_id:#x}: {reason}")]
    InvalidClassHierarchy { class_id: Id, reason: String },
    #[error("Unresolved reference from {source_id:#x} to {target_id:#x}")]
    UnresolvedReference { source_id: Id, target_id: Id },
    #[error("Instance {object_id:#x} has {actual} field bytes but its class layout needs {expected}")]
    FieldLayoutMismatch {
        object_id: Id,
        expected: usize,
        actual: usize,
    },
    #[error("Instance {object_id:#x} refers to unknown class {class_id:#x}")]
    UnknownClass { object_id: Id, class_id: Id },
    #[error("Duplicate object id {0:#x}")]
    DuplicateObject(Id),
}

impl ModelError {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::InvalidClassHierarchy { .. } => "invalid-class-hierarchy",
            ModelError::UnresolvedReference { .. } => "unresolved-reference",
            ModelError::FieldLayoutMismatch { .. } => "field-layout-mismatch",
            ModelError::UnknownClass { .. } => "unknown-class",
            ModelError::DuplicateObject(_) => "duplicate-object",
        }
    }
}
