// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HprofError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format version: {0:?}")]
    UnsupportedVersion(String),
    #[error("Unsupported identifier width: {0} (expected 4 or 8)")]
    UnsupportedIdentifierWidth(u32),
    #[error("Malformed record at offset {offset:#x}: {reason}")]
    MalformedRecord { offset: u64, reason: String },
    #[error("Truncated input at offset {offset:#x}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: u64,
        needed: usize,
        available: usize,
    },
}

impl HprofError {
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        HprofError::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HprofError::Io(_)
                | HprofError::UnsupportedVersion(_)
                | HprofError::UnsupportedIdentifierWidth(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HprofError::Io(_) => "io",
            HprofError::UnsupportedVersion(_) => "unsupported-version",
            HprofError::UnsupportedIdentifierWidth(_) => "unsupported-identifier-width",
            HprofError::MalformedRecord { .. } => "malformed-record",
            HprofError::Truncated { .. } => "truncated",
        }
    }
}
