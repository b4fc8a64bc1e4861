//! IPv4 network-layer decoding.
//!
//! Validates version and header length, bounds the payload by the header's
//! total-length field (trailing link padding is tolerated and dropped) and
//! exposes the protocol id for transport dispatch. IPv6 is recognised only to
//! be reported and skipped.

pub mod error;
pub mod layout;
pub mod parser;

pub use parser::{Ipv4Packet, parse_ipv4};
