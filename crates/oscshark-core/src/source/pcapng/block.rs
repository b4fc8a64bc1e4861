use tracing::trace;

use super::error::ContainerError;
use super::layout;
use crate::view::ByteView;

/// One self-length-delimited container record.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub block_type: u32,
    /// Bytes between the 8-byte header and the 4-byte trailer.
    pub payload: ByteView<'a>,
    /// Offset of the block header within the capture.
    pub file_offset: usize,
    pub index: usize,
}

impl Block<'_> {
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Total block length as stored in the header.
    pub fn total_len(&self) -> usize {
        self.payload.len() + layout::BLOCK_MIN_LEN
    }
}

/// Sequential splitter over a capture buffer.
///
/// Yields blocks in file order. The first structural error is yielded once
/// and ends the iteration; the sequence can only be restarted by constructing
/// a new reader.
///
/// # Examples
/// ```
/// use oscshark_core::BlockReader;
///
/// let mut capture = Vec::new();
/// capture.extend_from_slice(&1u32.to_le_bytes());
/// capture.extend_from_slice(&16u32.to_le_bytes());
/// capture.extend_from_slice(&[0xaa; 4]);
/// capture.extend_from_slice(&16u32.to_le_bytes());
///
/// let blocks: Vec<_> = BlockReader::new(&capture).collect::<Result<_, _>>()?;
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].payload.as_bytes(), &[0xaa; 4]);
/// # Ok::<(), oscshark_core::ContainerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BlockReader<'a> {
    capture: ByteView<'a>,
    offset: usize,
    index: usize,
    failed: bool,
}

impl<'a> BlockReader<'a> {
    pub fn new(capture: &'a [u8]) -> Self {
        Self::from_view(ByteView::new(capture))
    }

    pub fn from_view(capture: ByteView<'a>) -> Self {
        Self {
            capture,
            offset: 0,
            index: 0,
            failed: false,
        }
    }

    fn read_block(&self) -> Result<(Block<'a>, usize), ContainerError> {
        let offset = self.offset;
        let available = self.capture.len() - offset;
        if available < layout::BLOCK_HEADER_LEN {
            return Err(ContainerError::TruncatedHeader { offset, available });
        }

        let block_type = self
            .capture
            .read_u32_le(offset + layout::BLOCK_TYPE_OFFSET)?;
        let length = self
            .capture
            .read_u32_le(offset + layout::BLOCK_LENGTH_OFFSET)?;

        if block_type == layout::SECTION_HEADER_BLOCK
            && available >= layout::BLOCK_HEADER_LEN + 4
        {
            let magic = self
                .capture
                .read_u32_le(offset + layout::BLOCK_HEADER_LEN + layout::SHB_BYTE_ORDER_OFFSET)?;
            if magic == layout::BYTE_ORDER_MAGIC.swap_bytes() {
                return Err(ContainerError::UnsupportedByteOrder { offset });
            }
        }

        let block_len = length as usize;
        if block_len % layout::BLOCK_ALIGNMENT != 0 {
            return Err(ContainerError::Unaligned { offset, length });
        }
        if block_len < layout::BLOCK_MIN_LEN {
            return Err(ContainerError::TooSmall { offset, length });
        }
        if block_len > available {
            return Err(ContainerError::Truncated {
                offset,
                length,
                available,
            });
        }

        let trailing = self
            .capture
            .read_u32_le(offset + block_len - layout::BLOCK_TRAILER_LEN)?;
        if trailing != length {
            return Err(ContainerError::LengthMismatch {
                offset,
                leading: length,
                trailing,
            });
        }

        let payload = self.capture.subview(
            offset + layout::BLOCK_HEADER_LEN,
            block_len - layout::BLOCK_MIN_LEN,
        )?;
        trace!(offset, block_type, length, "container block");

        let block = Block {
            block_type,
            payload,
            file_offset: offset,
            index: self.index,
        };
        Ok((block, block_len))
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = Result<Block<'a>, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.capture.len() {
            return None;
        }
        match self.read_block() {
            Ok((block, block_len)) => {
                self.offset += block_len;
                self.index += 1;
                Some(Ok(block))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for BlockReader<'_> {}
