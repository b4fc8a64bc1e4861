//! Bounds-checked views into the root capture buffer.
//!
//! Every record produced by the pipeline (blocks, packets, frames, datagrams,
//! messages) holds a `ByteView` instead of a copy of its bytes. A view is the
//! triple (root buffer, offset, length); its lifetime ties it to the root
//! buffer, so no derived record can outlive the capture it was decoded from.

use thiserror::Error;

/// Errors returned by out-of-range view accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("range {offset}+{len} out of bounds (available {available})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },
}

/// Non-owning range over one backing buffer.
///
/// # Examples
/// ```
/// use oscshark_core::ByteView;
///
/// let buffer = [0u8, 1, 2, 3, 4, 5, 6, 7];
/// let view = ByteView::new(&buffer);
/// let tail = view.tail(4).unwrap();
/// assert_eq!(tail.as_bytes(), &[4, 5, 6, 7]);
/// assert_eq!(tail.root_offset(), 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ByteView<'a> {
    root: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> ByteView<'a> {
    /// View spanning the whole root buffer.
    pub fn new(root: &'a [u8]) -> Self {
        Self {
            root,
            offset: 0,
            len: root.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute offset of this view within the root buffer.
    pub fn root_offset(&self) -> usize {
        self.offset
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        &self.root[self.offset..self.offset + self.len]
    }

    /// Sub-range `[offset, offset + len)` relative to this view.
    pub fn subview(&self, offset: usize, len: usize) -> Result<ByteView<'a>, ViewError> {
        let end = offset.checked_add(len).ok_or(ViewError::OutOfBounds {
            offset,
            len,
            available: self.len,
        })?;
        if end > self.len {
            return Err(ViewError::OutOfBounds {
                offset,
                len,
                available: self.len,
            });
        }
        Ok(ByteView {
            root: self.root,
            offset: self.offset + offset,
            len,
        })
    }

    /// Everything from `offset` to the end of this view.
    pub fn tail(&self, offset: usize) -> Result<ByteView<'a>, ViewError> {
        let len = self.len.checked_sub(offset).ok_or(ViewError::OutOfBounds {
            offset,
            len: 0,
            available: self.len,
        })?;
        self.subview(offset, len)
    }

    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], ViewError> {
        let bytes = self.subview(offset, N)?.as_bytes();
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ViewError> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    pub fn read_u16_le(&self, offset: usize) -> Result<u16, ViewError> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, ViewError> {
        self.read_array(offset).map(u16::from_be_bytes)
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, ViewError> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    pub fn read_u32_be(&self, offset: usize) -> Result<u32, ViewError> {
        self.read_array(offset).map(u32::from_be_bytes)
    }

    pub fn read_i64_le(&self, offset: usize) -> Result<i64, ViewError> {
        self.read_array(offset).map(i64::from_le_bytes)
    }
}

impl std::fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteView")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteView, ViewError};

    #[test]
    fn subview_is_relative_to_parent() {
        let buffer = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let view = ByteView::new(&buffer).subview(2, 6).unwrap();
        let inner = view.subview(1, 3).unwrap();
        assert_eq!(inner.as_bytes(), &[3, 4, 5]);
        assert_eq!(inner.root_offset(), 3);
    }

    #[test]
    fn subview_rejects_overrun() {
        let buffer = [0u8; 4];
        let view = ByteView::new(&buffer);
        let err = view.subview(2, 3).unwrap_err();
        assert_eq!(
            err,
            ViewError::OutOfBounds {
                offset: 2,
                len: 3,
                available: 4
            }
        );
    }

    #[test]
    fn subview_rejects_offset_overflow() {
        let buffer = [0u8; 4];
        let view = ByteView::new(&buffer);
        assert!(view.subview(usize::MAX, 2).is_err());
    }

    #[test]
    fn tail_past_end_is_error() {
        let buffer = [0u8; 4];
        let view = ByteView::new(&buffer);
        assert!(view.tail(4).unwrap().is_empty());
        assert!(view.tail(5).is_err());
    }

    #[test]
    fn mixed_endian_reads() {
        let buffer = [0x12, 0x34, 0x56, 0x78];
        let view = ByteView::new(&buffer);
        assert_eq!(view.read_u16_le(0).unwrap(), 0x3412);
        assert_eq!(view.read_u16_be(0).unwrap(), 0x1234);
        assert_eq!(view.read_u32_le(0).unwrap(), 0x7856_3412);
        assert_eq!(view.read_u32_be(0).unwrap(), 0x1234_5678);
        assert!(view.read_u32_be(1).is_err());
    }
}
