use thiserror::Error;

/// Malformed OSC content; each one drops a single message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OscError {
    #[error("message too short: need {needed} bytes at {position}, got {available}")]
    TooShort {
        position: usize,
        needed: usize,
        available: usize,
    },
    #[error("non-zero padding byte at {position}")]
    MalformedPadding { position: usize },
    #[error("string starting at {position} is not NUL-terminated")]
    UnterminatedString { position: usize },
    #[error("invalid blob length {length} at {position}")]
    InvalidBlobLength { position: usize, length: i32 },
    #[error("type tag string does not start with ','")]
    MissingTypeTagComma,
    #[error("invalid char value {value:#x}")]
    InvalidChar { value: u32 },
}
