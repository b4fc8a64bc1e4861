//! PCAPNG container decoding.
//!
//! The container is walked in three steps: `block` splits the buffer into
//! self-delimited blocks, `interface` turns description blocks into the
//! per-section interface registry, and `packet` resolves enhanced packet
//! blocks against that registry. Only little-endian sections are supported.
//!
//! Errors come in two strengths: `ContainerError` aborts the whole capture,
//! while `PacketRecordError` skips a single packet block.

pub mod block;
pub mod error;
pub mod interface;
pub mod layout;
pub mod packet;

pub use block::{Block, BlockReader};
pub use error::{ContainerError, PacketRecordError};
pub use interface::{InterfaceRegistry, NetworkInterface, TsResolution};
pub use packet::{ExtractionStats, Packet, PacketExtractor, extract_packets};
