use etherparse::Ethernet2HeaderSlice;
use pcap_parser::Linktype;
use tracing::debug;

use super::error::EthernetError;
use super::layout;
use crate::source::pcapng::Packet;
use crate::view::{ByteView, ViewError};

/// Ethernet II frame carried by one captured packet.
#[derive(Debug, Clone, Copy)]
pub struct LinkFrame<'a> {
    pub packet: Packet<'a>,
    pub destination: [u8; 6],
    pub source: [u8; 6],
    pub ethertype: u16,
    pub payload: ByteView<'a>,
}

impl LinkFrame<'_> {
    pub fn source_mac(&self) -> String {
        format_mac(&self.source)
    }

    pub fn destination_mac(&self) -> String {
        format_mac(&self.destination)
    }
}

/// Format a hardware address as colon-separated uppercase hex.
///
/// # Examples
/// ```
/// use oscshark_core::protocols::ethernet::format_mac;
///
/// assert_eq!(format_mac(&[0x01, 0x02, 0x0a, 0x0b, 0xfe, 0xff]), "01:02:0A:0B:FE:FF");
/// ```
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Resolve the link type for a packet, defaulting to Ethernet.
pub fn linktype_for_packet(packet: &Packet<'_>) -> Linktype {
    packet
        .interface
        .map(|interface| interface.linktype)
        .unwrap_or(Linktype::ETHERNET)
}

/// Strip the Ethernet header of a captured packet.
///
/// Returns `Ok(None)` when the packet was recorded on a non-Ethernet link.
pub fn parse_ethernet<'a>(packet: &Packet<'a>) -> Result<Option<LinkFrame<'a>>, EthernetError> {
    let linktype = linktype_for_packet(packet);
    if !layout::ETHERNET_LINKTYPES.contains(&linktype) {
        debug!(
            packet = packet.index,
            linktype = linktype.0,
            "unsupported link type, skipping"
        );
        return Ok(None);
    }

    let data = packet.data;
    let header = Ethernet2HeaderSlice::from_slice(data.as_bytes())?;
    let payload = data
        .tail(header.slice().len())
        .map_err(|_: ViewError| EthernetError::TooShort {
            needed: layout::HEADER_LEN,
            actual: data.len(),
        })?;

    Ok(Some(LinkFrame {
        packet: *packet,
        destination: header.destination(),
        source: header.source(),
        ethertype: header.ether_type().0,
        payload,
    }))
}
