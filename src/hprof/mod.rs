// Tue Jan 13 2026 - Alex

pub mod error;
pub mod header;
pub mod parser;
pub mod reader;
pub mod record;
pub mod source;
pub mod tag;

pub use error::HprofError;
pub use header::{HprofHeader, KNOWN_VERSIONS};
pub use parser::{HprofParser, ParserStats};
pub use reader::{decode_value, HprofReader};
pub use record::*;
pub use source::HprofSource;
pub use tag::{FieldType, RecordTag, SubRecordTag};
