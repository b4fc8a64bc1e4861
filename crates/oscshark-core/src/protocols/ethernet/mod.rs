//! Ethernet II link-layer decoding.
//!
//! Only the Ethernet link types are decoded; frames recorded on any other
//! medium are skipped. Packets whose interface was never described are treated
//! as Ethernet.

pub mod error;
pub mod layout;
pub mod parser;

pub use parser::{LinkFrame, format_mac, parse_ethernet};
