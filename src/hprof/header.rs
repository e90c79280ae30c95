// Tue Jan 13 2026 - Alex

use crate::hprof::{HprofError, HprofReader};
use serde::Serialize;
use std::fmt;

pub const KNOWN_VERSIONS: [&str; 3] = [
    "JAVA PROFILE 1.0.1",
    "JAVA PROFILE 1.0.2",
    "JAVA PROFILE 1.0.3",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HprofHeader {
    pub version: String,
    pub id_size: usize,
    pub timestamp_ms: u64,
}

impl HprofHeader {
    pub fn read(reader: &mut HprofReader, strict_version: bool) -> Result<Self, HprofError> {
        let version = reader.read_c_string()?;
        if strict_version && !KNOWN_VERSIONS.contains(&version.as_str()) {
            return Err(HprofError::UnsupportedVersion(version));
        }

        let id_size = reader.read_u32()?;
        if id_size != 4 && id_size != 8 {
            return Err(HprofError::UnsupportedIdentifierWidth(id_size));
        }
        reader.set_id_size(id_size as usize);

        let timestamp_ms = reader.read_u64()?;

        Ok(Self {
            version,
            id_size: id_size as usize,
            timestamp_ms,
        })
    }

    pub fn is_android(&self) -> bool {
        self.version == "JAVA PROFILE 1.0.3"
    }
}

impl fmt::Display for HprofHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id size {}, timestamp {})", self.version, self.id_size, self.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn header_bytes(version: &str, id_size: u32) -> Bytes {
        let mut data = version.as_bytes().to_vec();
        data.push(0);
        data.extend_from_slice(&id_size.to_be_bytes());
        data.extend_from_slice(&1_700_000_000_000u64.to_be_bytes());
        Bytes::from(data)
    }

    #[test]
    fn test_read_header() {
        let mut reader = HprofReader::new(header_bytes("JAVA PROFILE 1.0.3", 4));
        let header = HprofHeader::read(&mut reader, true).unwrap();
        assert_eq!(header.id_size, 4);
        assert_eq!(header.timestamp_ms, 1_700_000_000_000);
        assert!(header.is_android());
        assert_eq!(reader.id_size(), 4);
    }

    #[test]
    fn test_unsupported_width() {
        let mut reader = HprofReader::new(header_bytes("JAVA PROFILE 1.0.2", 2));
        let err = HprofHeader::read(&mut reader, true).unwrap_err();
        assert!(matches!(err, HprofError::UnsupportedIdentifierWidth(2)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_version() {
        let mut reader = HprofReader::new(header_bytes("NOT A PROFILE", 8));
        assert!(matches!(
            HprofHeader::read(&mut reader, true),
            Err(HprofError::UnsupportedVersion(_))
        ));

        let mut lenient = HprofReader::new(header_bytes("NOT A PROFILE", 8));
        assert_eq!(HprofHeader::read(&mut lenient, false).unwrap().id_size, 8);
    }
}
