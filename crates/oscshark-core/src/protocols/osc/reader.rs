use std::borrow::Cow;

use super::error::OscError;
use super::layout;
use crate::view::ByteView;

/// Cursor over an OSC payload. All reads are big-endian and advance the
/// position; a failed read leaves the message undecodable.
#[derive(Debug, Clone, Copy)]
pub struct OscReader<'a> {
    view: ByteView<'a>,
    position: usize,
}

impl<'a> OscReader<'a> {
    pub fn new(view: ByteView<'a>) -> Self {
        Self { view, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.view.len().saturating_sub(self.position)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], OscError> {
        let bytes = self
            .view
            .read_array::<N>(self.position)
            .map_err(|_| self.too_short(N))?;
        self.position += N;
        Ok(bytes)
    }

    fn too_short(&self, needed: usize) -> OscError {
        OscError::TooShort {
            position: self.position,
            needed,
            available: self.remaining(),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32, OscError> {
        self.take::<4>().map(i32::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, OscError> {
        self.take::<4>().map(u32::from_be_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, OscError> {
        self.take::<8>().map(i64::from_be_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, OscError> {
        self.take::<4>().map(f32::from_be_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64, OscError> {
        self.take::<8>().map(f64::from_be_bytes)
    }

    /// Skip to the next 4-byte boundary. Every skipped byte must be zero.
    pub fn read_padding(&mut self) -> Result<(), OscError> {
        while self.position % layout::ALIGNMENT != 0 {
            let byte = self
                .view
                .read_u8(self.position)
                .map_err(|_| self.too_short(1))?;
            if byte != 0 {
                return Err(OscError::MalformedPadding {
                    position: self.position,
                });
            }
            self.position += 1;
        }
        Ok(())
    }

    /// Raw bytes of a NUL-terminated, padded string (without the NUL).
    pub fn read_string_bytes(&mut self) -> Result<&'a [u8], OscError> {
        let start = self.position;
        let rest = self
            .view
            .tail(start)
            .map_err(|_| self.too_short(1))?
            .as_bytes();
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(OscError::UnterminatedString { position: start })?;
        self.position = start + len + 1;
        self.read_padding()?;
        Ok(&rest[..len])
    }

    /// Read a string, replacing invalid UTF-8 sequences.
    pub fn read_string(&mut self) -> Result<Cow<'a, str>, OscError> {
        self.read_string_bytes().map(String::from_utf8_lossy)
    }

    /// Read an i32 length prefix, that many bytes, then padding.
    pub fn read_blob(&mut self) -> Result<ByteView<'a>, OscError> {
        let position = self.position;
        let length = self.read_i32()?;
        let len = usize::try_from(length)
            .ok()
            .filter(|&len| len <= self.remaining())
            .ok_or(OscError::InvalidBlobLength { position, length })?;
        let blob = self
            .view
            .subview(self.position, len)
            .map_err(|_| self.too_short(len))?;
        self.position += len;
        self.read_padding()?;
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::OscReader;
    use crate::protocols::osc::error::OscError;
    use crate::view::ByteView;

    #[test]
    fn string_consumes_padded_length() {
        for text in ["", "a", "ab", "abc", "abcd", "/test", "/a/b/c/d"] {
            let mut bytes = text.as_bytes().to_vec();
            let consumed = (text.len() + 1 + 3) / 4 * 4;
            bytes.resize(consumed, 0);
            bytes.extend_from_slice(&[0xff; 4]);

            let mut reader = OscReader::new(ByteView::new(&bytes));
            assert_eq!(reader.read_string().unwrap(), text);
            assert_eq!(reader.position(), consumed, "{text:?}");
        }
    }

    #[test]
    fn non_zero_padding_is_rejected() {
        let bytes = *b"/ab\0/x\0\x01";
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(reader.read_string().unwrap(), "/ab");
        assert_eq!(
            reader.read_string().unwrap_err(),
            OscError::MalformedPadding { position: 7 }
        );
    }

    #[test]
    fn padding_past_end_is_error() {
        let bytes = *b"/abcd\0";
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert!(matches!(
            reader.read_string().unwrap_err(),
            OscError::TooShort { position: 6, .. }
        ));
    }

    #[test]
    fn missing_nul_is_error() {
        let bytes = *b"/abc";
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(
            reader.read_string().unwrap_err(),
            OscError::UnterminatedString { position: 0 }
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes = [b'/', 0xff, b'x', 0];
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(reader.read_string().unwrap(), "/\u{fffd}x");
    }

    #[test]
    fn big_endian_numbers() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-2i32).to_be_bytes());
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        bytes.extend_from_slice(&(1i64 << 40).to_be_bytes());
        bytes.extend_from_slice(&0.25f64.to_be_bytes());
        bytes.extend_from_slice(&0xdead_beefu32.to_be_bytes());

        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_i64().unwrap(), 1 << 40);
        assert_eq!(reader.read_f64().unwrap(), 0.25);
        assert_eq!(reader.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(reader.remaining(), 0);
        assert!(matches!(
            reader.read_i32().unwrap_err(),
            OscError::TooShort { needed: 4, .. }
        ));
    }

    #[test]
    fn blob_is_padded() {
        let bytes = [0, 0, 0, 5, 1, 2, 3, 4, 5, 0, 0, 0, 9];
        let mut reader = OscReader::new(ByteView::new(&bytes));
        let blob = reader.read_blob().unwrap();
        assert_eq!(blob.as_bytes(), &[1, 2, 3, 4, 5]);
        assert_eq!(blob.root_offset(), 4);
        assert_eq!(reader.position(), 12);
    }

    #[test]
    fn negative_blob_length_is_rejected() {
        let bytes = (-1i32).to_be_bytes();
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(
            reader.read_blob().unwrap_err(),
            OscError::InvalidBlobLength {
                position: 0,
                length: -1
            }
        );
    }

    #[test]
    fn oversized_blob_length_is_rejected() {
        let bytes = [0, 0, 0, 9, 1, 2, 3, 4];
        let mut reader = OscReader::new(ByteView::new(&bytes));
        assert_eq!(
            reader.read_blob().unwrap_err(),
            OscError::InvalidBlobLength {
                position: 0,
                length: 9
            }
        );
    }
}
