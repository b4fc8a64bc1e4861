use thiserror::Error;

use crate::view::ViewError;

/// File-fatal container structure errors.
///
/// Corruption at block granularity cannot be localized, so any of these aborts
/// the whole capture.
///
/// # Examples
/// ```
/// use oscshark_core::ContainerError;
///
/// let err = ContainerError::LengthMismatch {
///     offset: 0,
///     leading: 32,
///     trailing: 28,
/// };
/// assert!(err.to_string().contains("length mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("truncated block header at offset {offset}: {available} bytes left")]
    TruncatedHeader { offset: usize, available: usize },
    #[error("block length not 32-bit aligned at offset {offset} ({length})")]
    Unaligned { offset: usize, length: u32 },
    #[error("block length too small at offset {offset} ({length})")]
    TooSmall { offset: usize, length: u32 },
    #[error("block at offset {offset} runs past end of capture ({length} > {available})")]
    Truncated {
        offset: usize,
        length: u32,
        available: usize,
    },
    #[error("block length mismatch at offset {offset}: leading {leading}, trailing {trailing}")]
    LengthMismatch {
        offset: usize,
        leading: u32,
        trailing: u32,
    },
    #[error("big-endian section at offset {offset} is not supported")]
    UnsupportedByteOrder { offset: usize },
    #[error("interface description block too small at offset {offset} ({length})")]
    InterfaceDescriptionTooSmall { offset: usize, length: usize },
    #[error("block field out of range: {0}")]
    View(#[from] ViewError),
}

/// Per-block packet record errors. These skip one block only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketRecordError {
    #[error("enhanced packet block too small at offset {offset} ({length})")]
    TooSmall { offset: usize, length: usize },
    #[error("captured length {captured} exceeds block payload at offset {offset}")]
    CapturedLengthOverrun { offset: usize, captured: u32 },
}
