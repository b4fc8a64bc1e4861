//! Synthetic capture construction.
//!
//! Builds little-endian pcapng files block by block, Ethernet/IPv4/UDP frames
//! and OSC payloads. Used by the unit and integration tests and by the
//! `pcapng_fixtures` binary that writes the sample captures.

use etherparse::err::packet::BuildWriteError;
use etherparse::{EtherType, Ethernet2Header, PacketBuilder};

use crate::source::pcapng::layout;

pub const SOURCE_MAC: [u8; 6] = [0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f];
pub const DESTINATION_MAC: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

const SHB_MAJOR_VERSION: u16 = 1;
const SHB_MINOR_VERSION: u16 = 0;
const UNKNOWN_SECTION_LENGTH: i64 = -1;
const SNAPLEN: u32 = 65535;
const TTL: u8 = 64;

/// Writes a pcapng capture in memory.
///
/// # Examples
/// ```
/// use oscshark_core::extract_packets;
/// use oscshark_core::synth::CaptureBuilder;
///
/// let capture = CaptureBuilder::new()
///     .section()
///     .interface(1)
///     .packet(1_000_000, &[0u8; 60])
///     .build();
/// let packets = extract_packets(&capture).unwrap();
/// assert_eq!(packets[0].timestamp_ms, 1_000);
/// ```
#[derive(Debug, Default, Clone)]
pub struct CaptureBuilder {
    bytes: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block with the given type; the body is zero padded to 4 bytes.
    pub fn raw_block(mut self, block_type: u32, body: &[u8]) -> Self {
        let padded = padded_len(body.len());
        let total = (layout::BLOCK_MIN_LEN + padded) as u32;
        self.bytes.extend_from_slice(&block_type.to_le_bytes());
        self.bytes.extend_from_slice(&total.to_le_bytes());
        self.bytes.extend_from_slice(body);
        self.bytes.resize(self.bytes.len() + padded - body.len(), 0);
        self.bytes.extend_from_slice(&total.to_le_bytes());
        self
    }

    /// Section header block; starts a new interface numbering.
    pub fn section(self) -> Self {
        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&layout::BYTE_ORDER_MAGIC.to_le_bytes());
        body.extend_from_slice(&SHB_MAJOR_VERSION.to_le_bytes());
        body.extend_from_slice(&SHB_MINOR_VERSION.to_le_bytes());
        body.extend_from_slice(&UNKNOWN_SECTION_LENGTH.to_le_bytes());
        self.raw_block(layout::SECTION_HEADER_BLOCK, &body)
    }

    /// Interface description block without options (microsecond ticks).
    pub fn interface(self, linktype: u16) -> Self {
        let body = interface_body(linktype);
        self.raw_block(layout::INTERFACE_DESCRIPTION_BLOCK, &body)
    }

    /// Interface description block carrying an `if_tsresol` option.
    pub fn interface_with_tsresol(self, linktype: u16, tsresol: u8) -> Self {
        let mut body = interface_body(linktype);
        body.extend_from_slice(&layout::OPT_IF_TSRESOL.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&[tsresol, 0, 0, 0]);
        body.extend_from_slice(&layout::OPT_END_OF_OPT.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        self.raw_block(layout::INTERFACE_DESCRIPTION_BLOCK, &body)
    }

    /// Enhanced packet block on interface 0.
    pub fn packet(self, ticks: u64, data: &[u8]) -> Self {
        self.packet_on(0, ticks, data)
    }

    /// Enhanced packet block on the given interface id.
    pub fn packet_on(self, interface_id: u32, ticks: u64, data: &[u8]) -> Self {
        let mut body = Vec::with_capacity(20 + padded_len(data.len()));
        body.extend_from_slice(&interface_id.to_le_bytes());
        body.extend_from_slice(&((ticks >> 32) as u32).to_le_bytes());
        body.extend_from_slice(&(ticks as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(data);
        self.raw_block(layout::ENHANCED_PACKET_BLOCK, &body)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn interface_body(linktype: u16) -> Vec<u8> {
    let mut body = Vec::with_capacity(8);
    body.extend_from_slice(&linktype.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&SNAPLEN.to_le_bytes());
    body
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Ethernet II frame with the fixed synthetic MAC addresses.
pub fn ethernet_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let header = Ethernet2Header {
        source: SOURCE_MAC,
        destination: DESTINATION_MAC,
        ether_type: EtherType(ethertype),
    };
    let mut frame = header.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

/// IPv4 packet with a plain 20-byte header and no checksum. Lengths are
/// taken from `payload` as is, so malformed transport data can be wrapped.
pub fn ipv4_packet(source: [u8; 4], destination: [u8; 4], protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = (20 + payload.len()) as u16;
    let mut packet = vec![0u8; 20];
    packet[0] = 0x45;
    packet[2..4].copy_from_slice(&total_len.to_be_bytes());
    packet[8] = TTL;
    packet[9] = protocol;
    packet[12..16].copy_from_slice(&source);
    packet[16..20].copy_from_slice(&destination);
    packet.extend_from_slice(payload);
    packet
}

/// Well-formed Ethernet/IPv4/UDP frame.
///
/// # Errors
/// Fails when the payload does not fit in a single datagram.
pub fn udp_ipv4_frame(
    source: [u8; 4],
    destination: [u8; 4],
    source_port: u16,
    destination_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, BuildWriteError> {
    let builder = PacketBuilder::ethernet2(SOURCE_MAC, DESTINATION_MAC)
        .ipv4(source, destination, TTL)
        .udp(source_port, destination_port);
    let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload)?;
    Ok(frame)
}

/// Ethernet/IPv6/UDP frame between two documentation addresses.
///
/// # Errors
/// Fails when the payload does not fit in a single datagram.
pub fn udp_ipv6_frame(
    source_port: u16,
    destination_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, BuildWriteError> {
    let source = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
    let destination = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2];
    let builder = PacketBuilder::ethernet2(SOURCE_MAC, DESTINATION_MAC)
        .ipv6(source, destination, TTL)
        .udp(source_port, destination_port);
    let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload)?;
    Ok(frame)
}

/// Owned OSC argument for encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
    Symbol(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    Char(char),
    Color(u32),
    Midi(u32),
    /// NTP seconds since 1900 and 2^-32 fraction.
    Timetag(u32, u32),
    True,
    False,
    Nil,
    Infinitum,
}

impl OscArg {
    pub fn tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
            OscArg::Symbol(_) => 'S',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::Char(_) => 'c',
            OscArg::Color(_) => 'r',
            OscArg::Midi(_) => 'm',
            OscArg::Timetag(..) => 't',
            OscArg::True => 'T',
            OscArg::False => 'F',
            OscArg::Nil => 'N',
            OscArg::Infinitum => 'I',
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            OscArg::Int(value) => out.extend_from_slice(&value.to_be_bytes()),
            OscArg::Float(value) => out.extend_from_slice(&value.to_be_bytes()),
            OscArg::Str(text) | OscArg::Symbol(text) => out.extend(encode_osc_string(text)),
            OscArg::Blob(bytes) => {
                out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                out.extend_from_slice(bytes);
                out.resize(padded_len(out.len()), 0);
            }
            OscArg::Long(value) => out.extend_from_slice(&value.to_be_bytes()),
            OscArg::Double(value) => out.extend_from_slice(&value.to_be_bytes()),
            OscArg::Char(value) => out.extend_from_slice(&u32::from(*value).to_be_bytes()),
            OscArg::Color(value) | OscArg::Midi(value) => {
                out.extend_from_slice(&value.to_be_bytes())
            }
            OscArg::Timetag(seconds, fraction) => {
                out.extend_from_slice(&seconds.to_be_bytes());
                out.extend_from_slice(&fraction.to_be_bytes());
            }
            OscArg::True | OscArg::False | OscArg::Nil | OscArg::Infinitum => {}
        }
    }
}

/// NUL-terminated string padded to a multiple of 4 bytes.
pub fn encode_osc_string(text: &str) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    out.push(0);
    out.resize(padded_len(out.len()), 0);
    out
}

/// Encode a complete OSC message.
///
/// # Examples
/// ```
/// use oscshark_core::synth::{OscArg, encode_osc_message};
///
/// let bytes = encode_osc_message("/test", &[OscArg::Int(42)]);
/// assert_eq!(bytes, b"/test\0\0\0,i\0\0\0\0\0\x2a");
/// ```
pub fn encode_osc_message(address: &str, args: &[OscArg]) -> Vec<u8> {
    let type_tag: String = std::iter::once(',').chain(args.iter().map(OscArg::tag)).collect();
    let mut out = encode_osc_string(address);
    out.extend(encode_osc_string(&type_tag));
    for arg in args {
        arg.encode_into(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{CaptureBuilder, OscArg, encode_osc_message, encode_osc_string, udp_ipv4_frame};
    use crate::source::pcapng::BlockReader;

    #[test]
    fn blocks_are_aligned_and_framed() {
        let capture = CaptureBuilder::new()
            .section()
            .interface_with_tsresol(1, 0x09)
            .packet(7, &[1, 2, 3])
            .build();
        let blocks: Vec<_> = BlockReader::new(&capture).map(Result::unwrap).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].total_len(), 28);
        assert_eq!(blocks[1].total_len(), 32);
        assert_eq!(blocks[2].total_len(), 36);
        assert_eq!(capture.len(), 96);
    }

    #[test]
    fn string_padding() {
        assert_eq!(encode_osc_string(""), vec![0, 0, 0, 0]);
        assert_eq!(encode_osc_string("abc"), b"abc\0".to_vec());
        assert_eq!(encode_osc_string("abcd"), b"abcd\0\0\0\0".to_vec());
    }

    #[test]
    fn blob_is_length_prefixed_and_padded() {
        let bytes = encode_osc_message("/b", &[OscArg::Blob(vec![9, 9])]);
        assert_eq!(&bytes[8..], &[0, 0, 0, 2, 9, 9, 0, 0]);
    }

    #[test]
    fn udp_frame_layout() {
        let frame = udp_ipv4_frame([1, 1, 1, 1], [2, 2, 2, 2], 10, 20, &[0xee; 3]).unwrap();
        assert_eq!(frame.len(), 14 + 20 + 8 + 3);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);
        assert_eq!(&frame[frame.len() - 3..], &[0xee; 3]);
    }
}
