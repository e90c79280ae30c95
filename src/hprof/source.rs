// Tue Jan 13 2026 - Alex

use crate::hprof::HprofError;
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct HprofSource {
    data: Bytes,
    path: Option<PathBuf>,
}

impl HprofSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HprofError> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        let data = if len == 0 {
            Bytes::new()
        } else {
            // The mapping is read-only and owned by the returned `Bytes`.
            let mmap = unsafe { Mmap::map(&file) }?;
            Bytes::from_owner(mmap)
        };
        log::info!("Mapped {} ({})", path.as_ref().display(), crate::utils::format_bytes(data.len() as u64));
        Ok(Self {
            data,
            path: Some(path.as_ref().to_path_buf()),
        })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, HprofError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::from_bytes(buf))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            path: None,
        }
    }

    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
