use etherparse::err::LenError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UdpError {
    #[error("packet too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid UDP length ({length})")]
    InvalidLength { length: u16 },
    #[error("UDP length {length} exceeds IP payload ({available})")]
    LengthExceedsPayload { length: u16, available: usize },
}

impl From<LenError> for UdpError {
    fn from(err: LenError) -> Self {
        UdpError::TooShort {
            needed: err.required_len,
            actual: err.len,
        }
    }
}
