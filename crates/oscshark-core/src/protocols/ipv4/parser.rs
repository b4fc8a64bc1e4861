use std::net::Ipv4Addr;

use etherparse::Ipv4HeaderSlice;
use tracing::{trace, warn};

use super::error::Ipv4Error;
use crate::protocols::ethernet::LinkFrame;
use crate::protocols::ethernet::layout::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};
use crate::view::{ByteView, ViewError};

/// IPv4 packet carried by a link frame.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Packet<'a> {
    pub frame: LinkFrame<'a>,
    pub header_len: usize,
    pub total_len: u16,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Bytes after the header and options, bounded by the total length.
    pub payload: ByteView<'a>,
}

/// Strip the IPv4 header of a link frame.
///
/// Returns `Ok(None)` for any ethertype other than IPv4; IPv6 frames are
/// reported as unsupported.
pub fn parse_ipv4<'a>(frame: &LinkFrame<'a>) -> Result<Option<Ipv4Packet<'a>>, Ipv4Error> {
    match frame.ethertype {
        ETHERTYPE_IPV4 => {}
        ETHERTYPE_IPV6 => {
            warn!(
                packet = frame.packet.index,
                "IPv6 packets are not supported, skipping"
            );
            return Ok(None);
        }
        other => {
            trace!(packet = frame.packet.index, ethertype = other, "not IPv4");
            return Ok(None);
        }
    }

    let data = frame.payload;
    let available = data.len();
    let header = Ipv4HeaderSlice::from_slice(data.as_bytes())?;
    let header_len = header.slice().len();
    let total_len = header.total_len();
    if usize::from(total_len) > available {
        return Err(Ipv4Error::TotalLengthExceedsCapture {
            total_len,
            available,
        });
    }
    if usize::from(total_len) < header_len {
        return Err(Ipv4Error::TotalLengthBelowHeader {
            total_len,
            header_len,
        });
    }
    let payload = data
        .subview(header_len, usize::from(total_len) - header_len)
        .map_err(|_: ViewError| Ipv4Error::TooShort {
            needed: usize::from(total_len),
            actual: available,
        })?;

    Ok(Some(Ipv4Packet {
        frame: *frame,
        header_len,
        total_len,
        protocol: header.protocol().0,
        checksum: header.header_checksum(),
        source: header.source_addr(),
        destination: header.destination_addr(),
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::parse_ipv4;
    use crate::protocols::ethernet::parse_ethernet;
    use crate::protocols::ipv4::error::Ipv4Error;
    use crate::source::pcapng::extract_packets;
    use crate::synth::{CaptureBuilder, ethernet_frame, udp_ipv4_frame, udp_ipv6_frame};

    type Parsed<'a> = Result<Option<super::Ipv4Packet<'a>>, Ipv4Error>;

    fn with_frame<T>(frame: &[u8], check: impl FnOnce(Parsed<'_>) -> T) -> T {
        let capture = CaptureBuilder::new()
            .section()
            .interface(1)
            .packet(0, frame)
            .build();
        let packets = extract_packets(&capture).unwrap();
        let link = parse_ethernet(&packets[0]).unwrap().unwrap();
        check(parse_ipv4(&link))
    }

    fn ipv4_header(version_ihl: u8, total_len: u16) -> Vec<u8> {
        let mut header = vec![0u8; 20];
        header[0] = version_ihl;
        header[2..4].copy_from_slice(&total_len.to_be_bytes());
        header[9] = 17;
        header[12..16].copy_from_slice(&[192, 168, 1, 10]);
        header[16..20].copy_from_slice(&[192, 168, 1, 20]);
        header
    }

    #[test]
    fn parse_ipv4_header() {
        let frame =
            udp_ipv4_frame([10, 0, 0, 1], [10, 0, 0, 2], 9000, 8000, &[1, 2, 3, 4]).unwrap();
        with_frame(&frame, |result| {
            let ip = result.unwrap().unwrap();
            assert_eq!(ip.source, Ipv4Addr::new(10, 0, 0, 1));
            assert_eq!(ip.destination, Ipv4Addr::new(10, 0, 0, 2));
            assert_eq!(ip.protocol, 17);
            assert_eq!(ip.header_len, 20);
            assert_eq!(ip.total_len, 32);
            assert_eq!(ip.payload.len(), 12);
        });
    }

    #[test]
    fn options_shift_the_payload() {
        let mut ip = ipv4_header(0x46, 28);
        ip.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]);
        ip.extend_from_slice(&[0xaa; 4]);
        let frame = ethernet_frame(0x0800, &ip);
        with_frame(&frame, |result| {
            let ip = result.unwrap().unwrap();
            assert_eq!(ip.header_len, 24);
            assert_eq!(ip.payload.as_bytes(), &[0xaa; 4]);
        });
    }

    #[test]
    fn trailing_padding_is_dropped() {
        let mut ip = ipv4_header(0x45, 24);
        ip.extend_from_slice(&[0xbb; 4]);
        ip.extend_from_slice(&[0u8; 18]);
        let frame = ethernet_frame(0x0800, &ip);
        with_frame(&frame, |result| {
            let ip = result.unwrap().unwrap();
            assert_eq!(ip.payload.as_bytes(), &[0xbb; 4]);
        });
    }

    #[test]
    fn invalid_version_is_error() {
        let frame = ethernet_frame(0x0800, &ipv4_header(0x55, 20));
        with_frame(&frame, |result| {
            assert_eq!(result.unwrap_err(), Ipv4Error::InvalidVersion { version: 5 });
        });
    }

    #[test]
    fn short_header_length_is_error() {
        let frame = ethernet_frame(0x0800, &ipv4_header(0x44, 20));
        with_frame(&frame, |result| {
            assert_eq!(
                result.unwrap_err(),
                Ipv4Error::InvalidHeaderLength { header_len: 16 }
            );
        });
    }

    #[test]
    fn total_length_past_capture_is_error() {
        let frame = ethernet_frame(0x0800, &ipv4_header(0x45, 1500));
        with_frame(&frame, |result| {
            assert!(matches!(
                result.unwrap_err(),
                Ipv4Error::TotalLengthExceedsCapture { total_len: 1500, .. }
            ));
        });
    }

    #[test]
    fn truncated_header_is_error() {
        let frame = ethernet_frame(0x0800, &ipv4_header(0x45, 20)[..12]);
        with_frame(&frame, |result| {
            assert_eq!(
                result.unwrap_err(),
                Ipv4Error::TooShort {
                    needed: 20,
                    actual: 12
                }
            );
        });
    }

    #[test]
    fn options_past_capture_are_error() {
        let frame = ethernet_frame(0x0800, &ipv4_header(0x46, 24));
        with_frame(&frame, |result| {
            assert_eq!(
                result.unwrap_err(),
                Ipv4Error::TooShort {
                    needed: 24,
                    actual: 20
                }
            );
        });
    }

    #[test]
    fn total_length_below_header_is_error() {
        let mut ip = ipv4_header(0x45, 12);
        ip.extend_from_slice(&[0u8; 8]);
        let frame = ethernet_frame(0x0800, &ip);
        with_frame(&frame, |result| {
            assert_eq!(
                result.unwrap_err(),
                Ipv4Error::TotalLengthBelowHeader {
                    total_len: 12,
                    header_len: 20
                }
            );
        });
    }

    #[test]
    fn ipv6_is_skipped_without_error() {
        let frame = udp_ipv6_frame(9000, 8000, &[0u8; 8]).unwrap();
        with_frame(&frame, |result| {
            assert!(result.unwrap().is_none());
        });
    }

    #[test]
    fn other_ethertypes_are_skipped() {
        let frame = ethernet_frame(0x0806, &[0u8; 28]);
        with_frame(&frame, |result| {
            assert!(result.unwrap().is_none());
        });
    }
}
