use etherparse::err::LenError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthernetError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

impl From<LenError> for EthernetError {
    fn from(err: LenError) -> Self {
        EthernetError::TooShort {
            needed: err.required_len,
            actual: err.len,
        }
    }
}
