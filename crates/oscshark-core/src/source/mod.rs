//! Capture file access.
//!
//! All file I/O of the crate lives here: a capture is read into memory once,
//! and every later stage decodes borrowed views of that buffer.

pub mod pcapng;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use pcapng::{ContainerError, PacketExtractor};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAPNG structure error: {0}")]
    Container(#[from] ContainerError),
}

/// A capture file loaded into memory.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use oscshark_core::CaptureFile;
///
/// let capture = CaptureFile::open(Path::new("capture.pcapng"))?;
/// for packet in capture.packets() {
///     let packet = packet?;
///     println!("#{} @ {} ms", packet.index, packet.timestamp_ms);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct CaptureFile {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl CaptureFile {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = fs::read(path)?;
        Ok(Self::from_bytes(path, bytes))
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Self {
        Self {
            path: path.to_path_buf(),
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Packets of this capture, borrowing from the in-memory buffer.
    pub fn packets(&self) -> PacketExtractor<'_> {
        PacketExtractor::new(&self.bytes)
    }
}
