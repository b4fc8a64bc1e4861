//! OSC message decoding.
//!
//! An OSC packet is an address string, a type-tag string starting with `,`,
//! then one argument per tag. Strings and blobs are NUL/zero padded to four
//! bytes; numbers are big-endian. Bundles are recognised and skipped.
//!
//! Decoding is cursor based: [`OscReader`] walks the datagram payload and
//! [`OscTypeTag`] maps each tag character to the primitive that reads it.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod value;

pub use error::OscError;
pub use parser::{OscMessage, parse_osc_message};
pub use reader::OscReader;
pub use value::{OscTypeTag, OscValue};
