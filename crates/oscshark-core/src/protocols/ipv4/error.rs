use etherparse::err::ipv4::{HeaderError, HeaderSliceError};
use thiserror::Error;

use super::layout;

/// Structural IPv4 errors; each one drops a single packet.
///
/// # Examples
/// ```
/// use oscshark_core::protocols::ipv4::error::Ipv4Error;
///
/// let err = Ipv4Error::InvalidVersion { version: 6 };
/// assert!(err.to_string().contains("invalid IP version"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ipv4Error {
    #[error("packet too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid IP version ({version})")]
    InvalidVersion { version: u8 },
    #[error("invalid IP header length ({header_len})")]
    InvalidHeaderLength { header_len: usize },
    #[error("IP total length {total_len} exceeds captured bytes ({available})")]
    TotalLengthExceedsCapture { total_len: u16, available: usize },
    #[error("IP total length {total_len} is smaller than the header ({header_len})")]
    TotalLengthBelowHeader { total_len: u16, header_len: usize },
}

impl From<HeaderSliceError> for Ipv4Error {
    fn from(err: HeaderSliceError) -> Self {
        match err {
            HeaderSliceError::Len(len) => Ipv4Error::TooShort {
                needed: len.required_len,
                actual: len.len,
            },
            HeaderSliceError::Content(HeaderError::UnexpectedVersion { version_number }) => {
                Ipv4Error::InvalidVersion {
                    version: version_number,
                }
            }
            HeaderSliceError::Content(HeaderError::HeaderLengthSmallerThanHeader { ihl }) => {
                Ipv4Error::InvalidHeaderLength {
                    header_len: usize::from(ihl) * layout::IHL_WORD_LEN,
                }
            }
        }
    }
}
