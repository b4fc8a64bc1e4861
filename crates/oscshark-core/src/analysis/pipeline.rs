use std::iter::FusedIterator;
use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocols::ethernet::error::EthernetError;
use crate::protocols::ethernet::layout::ETHERTYPE_IPV6;
use crate::protocols::ethernet::parse_ethernet;
use crate::protocols::ipv4::error::Ipv4Error;
use crate::protocols::ipv4::parse_ipv4;
use crate::protocols::osc::{OscError, OscMessage, parse_osc_message};
use crate::protocols::udp::error::UdpError;
use crate::protocols::udp::{UdpDatagram, parse_udp};
use crate::source::pcapng::{ContainerError, ExtractionStats, Packet, PacketExtractor};

/// Header-level failure that drops one packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("Ethernet: {0}")]
    Ethernet(#[from] EthernetError),
    #[error("IPv4: {0}")]
    Ipv4(#[from] Ipv4Error),
    #[error("UDP: {0}")]
    Udp(#[from] UdpError),
}

/// OSC message together with the datagram (and so the packet) it came from.
#[derive(Debug, Clone)]
pub struct CapturedMessage<'a> {
    pub datagram: UdpDatagram<'a>,
    pub message: OscMessage<'a>,
}

impl<'a> CapturedMessage<'a> {
    pub fn packet(&self) -> &Packet<'a> {
        &self.datagram.network.frame.packet
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.packet().timestamp_ms
    }

    pub fn source(&self) -> Ipv4Addr {
        self.datagram.network.source
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.datagram.network.destination
    }
}

/// Where the decoding of a single packet stopped.
#[derive(Debug, Clone)]
pub enum PacketOutcome<'a> {
    NotEthernet,
    Ipv6,
    NotIpv4,
    NotUdp,
    NotOsc,
    MalformedMessage(OscError),
    Message(CapturedMessage<'a>),
}

/// Run one packet through the link, network, transport and message layers.
///
/// # Errors
/// Returns `PacketError` when a header is structurally invalid; the caller
/// drops the packet and continues.
pub fn decode_packet<'a>(packet: &Packet<'a>) -> Result<PacketOutcome<'a>, PacketError> {
    let Some(frame) = parse_ethernet(packet)? else {
        return Ok(PacketOutcome::NotEthernet);
    };
    let Some(network) = parse_ipv4(&frame)? else {
        if frame.ethertype == ETHERTYPE_IPV6 {
            return Ok(PacketOutcome::Ipv6);
        }
        return Ok(PacketOutcome::NotIpv4);
    };
    let Some(datagram) = parse_udp(&network)? else {
        return Ok(PacketOutcome::NotUdp);
    };
    let outcome = match parse_osc_message(datagram.payload) {
        Ok(Some(message)) => PacketOutcome::Message(CapturedMessage { datagram, message }),
        Ok(None) => PacketOutcome::NotOsc,
        Err(err) => PacketOutcome::MalformedMessage(err),
    };
    Ok(outcome)
}

/// Per-layer counters of the message pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub packets: u64,
    pub non_ethernet: u64,
    pub ipv6_skipped: u64,
    pub non_ipv4: u64,
    pub non_udp: u64,
    pub packet_errors: u64,
    pub datagrams: u64,
    pub non_osc: u64,
    pub malformed_messages: u64,
    pub messages: u64,
    pub first_timestamp_ms: Option<i64>,
    pub last_timestamp_ms: Option<i64>,
}

impl PipelineStats {
    fn record(&mut self, outcome: &PacketOutcome<'_>) {
        match outcome {
            PacketOutcome::NotEthernet => self.non_ethernet += 1,
            PacketOutcome::Ipv6 => self.ipv6_skipped += 1,
            PacketOutcome::NotIpv4 => self.non_ipv4 += 1,
            PacketOutcome::NotUdp => self.non_udp += 1,
            PacketOutcome::NotOsc => {
                self.datagrams += 1;
                self.non_osc += 1;
            }
            PacketOutcome::MalformedMessage(_) => {
                self.datagrams += 1;
                self.malformed_messages += 1;
            }
            PacketOutcome::Message(_) => {
                self.datagrams += 1;
                self.messages += 1;
            }
        }
    }

    fn observe_timestamp(&mut self, timestamp_ms: i64) {
        self.first_timestamp_ms = Some(
            self.first_timestamp_ms
                .map_or(timestamp_ms, |first| first.min(timestamp_ms)),
        );
        self.last_timestamp_ms = Some(
            self.last_timestamp_ms
                .map_or(timestamp_ms, |last| last.max(timestamp_ms)),
        );
    }
}

/// Streaming iterator over the OSC messages of a capture.
///
/// Packet-level failures are logged and counted; only container errors are
/// yielded, after which the iterator is exhausted.
///
/// # Examples
/// ```
/// use oscshark_core::MessageExtractor;
/// use oscshark_core::synth::{CaptureBuilder, OscArg, encode_osc_message, udp_ipv4_frame};
///
/// let payload = encode_osc_message("/test", &[OscArg::Int(42)]);
/// let frame = udp_ipv4_frame([10, 0, 0, 1], [10, 0, 0, 2], 9000, 8000, &payload)?;
/// let capture = CaptureBuilder::new().section().interface(1).packet(0, &frame).build();
///
/// let messages: Vec<_> = MessageExtractor::new(&capture).collect::<Result<_, _>>()?;
/// assert_eq!(messages[0].message.address, "/test");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct MessageExtractor<'a> {
    packets: PacketExtractor<'a>,
    stats: PipelineStats,
}

impl<'a> MessageExtractor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_packets(PacketExtractor::new(bytes))
    }

    pub fn from_packets(packets: PacketExtractor<'a>) -> Self {
        Self {
            packets,
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn container_stats(&self) -> ExtractionStats {
        self.packets.stats()
    }
}

impl<'a> Iterator for MessageExtractor<'a> {
    type Item = Result<CapturedMessage<'a>, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let packet = match self.packets.next()? {
                Ok(packet) => packet,
                Err(err) => return Some(Err(err)),
            };
            self.stats.packets += 1;
            self.stats.observe_timestamp(packet.timestamp_ms);

            let outcome = match decode_packet(&packet) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(packet = packet.index, "problem parsing packet: {err}");
                    self.stats.packet_errors += 1;
                    continue;
                }
            };
            self.stats.record(&outcome);
            match outcome {
                PacketOutcome::Message(message) => return Some(Ok(message)),
                PacketOutcome::MalformedMessage(err) if is_reported_malformation(&err) => {
                    warn!(packet = packet.index, "malformed OSC message: {err}");
                }
                PacketOutcome::MalformedMessage(err) => {
                    debug!(packet = packet.index, "malformed OSC message: {err}");
                }
                _ => {}
            }
        }
    }
}

impl FusedIterator for MessageExtractor<'_> {}

/// Malformations logged at `warn`; the rest of the decode failures only at
/// `debug`.
fn is_reported_malformation(err: &OscError) -> bool {
    matches!(err, OscError::MissingTypeTagComma)
}

/// Messages of a whole capture, with the counters gathered on the way.
#[derive(Debug)]
pub struct Extraction<'a> {
    pub messages: Vec<CapturedMessage<'a>>,
    pub stats: PipelineStats,
    pub container: ExtractionStats,
}

/// Decode every OSC message of an in-memory capture.
///
/// # Errors
/// Returns the first `ContainerError`; no messages are returned for a capture
/// whose block structure is broken.
pub fn extract_messages(bytes: &[u8]) -> Result<Extraction<'_>, ContainerError> {
    let mut extractor = MessageExtractor::new(bytes);
    let messages = extractor.by_ref().collect::<Result<Vec<_>, _>>()?;
    Ok(Extraction {
        messages,
        stats: extractor.stats(),
        container: extractor.container_stats(),
    })
}
