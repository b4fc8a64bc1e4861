use etherparse::UdpHeaderSlice;
use tracing::trace;

use super::error::UdpError;
use super::layout;
use crate::protocols::ipv4::Ipv4Packet;
use crate::view::{ByteView, ViewError};

/// UDP datagram carried by an IPv4 packet.
#[derive(Debug, Clone, Copy)]
pub struct UdpDatagram<'a> {
    pub network: Ipv4Packet<'a>,
    pub source_port: u16,
    pub destination_port: u16,
    /// Header plus payload, as declared in the header.
    pub length: u16,
    pub checksum: u16,
    pub payload: ByteView<'a>,
}

/// Strip the UDP header of an IPv4 packet.
///
/// Returns `Ok(None)` when the packet carries another transport protocol.
/// The checksum is read but not verified.
pub fn parse_udp<'a>(packet: &Ipv4Packet<'a>) -> Result<Option<UdpDatagram<'a>>, UdpError> {
    if packet.protocol != layout::IP_PROTOCOL_UDP {
        trace!(
            packet = packet.frame.packet.index,
            protocol = packet.protocol,
            "not UDP"
        );
        return Ok(None);
    }

    let data = packet.payload;
    let available = data.len();
    let header = UdpHeaderSlice::from_slice(data.as_bytes())?;
    let length = header.length();
    if usize::from(length) < layout::HEADER_LEN {
        return Err(UdpError::InvalidLength { length });
    }
    if usize::from(length) > available {
        return Err(UdpError::LengthExceedsPayload { length, available });
    }
    let header_len = header.slice().len();
    let payload = data
        .subview(header_len, usize::from(length) - header_len)
        .map_err(|_: ViewError| UdpError::TooShort {
            needed: usize::from(length),
            actual: available,
        })?;

    Ok(Some(UdpDatagram {
        network: *packet,
        source_port: header.source_port(),
        destination_port: header.destination_port(),
        length,
        checksum: header.checksum(),
        payload,
    }))
}
