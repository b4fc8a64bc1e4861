//! UDP transport-layer decoding.

pub mod error;
pub mod layout;
pub mod parser;

pub use parser::{UdpDatagram, parse_udp};
