use tracing::{debug, trace, warn};

use super::block::{Block, BlockReader};
use super::error::{ContainerError, PacketRecordError};
use super::interface::{InterfaceRegistry, NetworkInterface, TsResolution, clamp_to_i64};
use super::layout;
use crate::view::{ByteView, ViewError};

/// One captured packet from an enhanced packet block.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    pub block: Block<'a>,
    /// `None` when the block cites an interface id the section never described.
    pub interface: Option<NetworkInterface>,
    pub interface_id: u32,
    pub ticks: u64,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub captured_len: u32,
    pub original_len: u32,
    pub data: ByteView<'a>,
    pub index: usize,
}

/// Counters kept while walking the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub blocks: u64,
    pub sections: u64,
    pub interfaces: u64,
    pub packets: u64,
    pub malformed_packet_blocks: u64,
    pub simple_packets_skipped: u64,
    pub unresolved_interfaces: u64,
}

/// Streaming packet extractor over a capture buffer.
///
/// Description blocks populate the interface registry as they are walked, so
/// every packet is resolved against the interfaces declared before it in its
/// section. Container errors are yielded once and end the iteration; malformed
/// packet blocks are logged and skipped.
#[derive(Debug)]
pub struct PacketExtractor<'a> {
    blocks: BlockReader<'a>,
    registry: InterfaceRegistry,
    next_index: usize,
    stats: ExtractionStats,
    failed: bool,
}

impl<'a> PacketExtractor<'a> {
    pub fn new(capture: &'a [u8]) -> Self {
        Self {
            blocks: BlockReader::new(capture),
            registry: InterfaceRegistry::new(),
            next_index: 0,
            stats: ExtractionStats::default(),
            failed: false,
        }
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    fn handle_block(&mut self, block: Block<'a>) -> Result<Option<Packet<'a>>, ContainerError> {
        self.stats.blocks += 1;
        match block.block_type {
            layout::SECTION_HEADER_BLOCK => {
                trace!(offset = block.file_offset, "section header, resetting interfaces");
                self.stats.sections += 1;
                self.registry.reset();
                Ok(None)
            }
            layout::INTERFACE_DESCRIPTION_BLOCK => {
                let interface = self.registry.register(&block)?;
                self.stats.interfaces += 1;
                debug!(
                    id = interface.id,
                    linktype = interface.linktype.0,
                    exponent = interface.resolution.exponent(),
                    "registered interface"
                );
                Ok(None)
            }
            layout::SIMPLE_PACKET_BLOCK => {
                warn!(
                    offset = block.file_offset,
                    "simple packet blocks are not supported, skipping"
                );
                self.stats.simple_packets_skipped += 1;
                Ok(None)
            }
            layout::ENHANCED_PACKET_BLOCK => match self.enhanced_packet(block) {
                Ok(packet) => Ok(Some(packet)),
                Err(err) => {
                    warn!("skipping malformed packet block: {err}");
                    self.stats.malformed_packet_blocks += 1;
                    Ok(None)
                }
            },
            layout::NAME_RESOLUTION_BLOCK | layout::INTERFACE_STATISTICS_BLOCK => Ok(None),
            other => {
                trace!(offset = block.file_offset, block_type = other, "ignoring block");
                Ok(None)
            }
        }
    }

    fn enhanced_packet(&mut self, block: Block<'a>) -> Result<Packet<'a>, PacketRecordError> {
        let payload = block.payload;
        if payload.len() < layout::EPB_MIN_PAYLOAD_LEN {
            return Err(PacketRecordError::TooSmall {
                offset: block.file_offset,
                length: payload.len(),
            });
        }

        let too_small = |_: ViewError| PacketRecordError::TooSmall {
            offset: block.file_offset,
            length: payload.len(),
        };
        let interface_id = payload
            .read_u32_le(layout::EPB_INTERFACE_ID_OFFSET)
            .map_err(too_small)?;
        let ts_high = payload
            .read_u32_le(layout::EPB_TS_HIGH_OFFSET)
            .map_err(too_small)?;
        let ts_low = payload
            .read_u32_le(layout::EPB_TS_LOW_OFFSET)
            .map_err(too_small)?;
        let captured_len = payload
            .read_u32_le(layout::EPB_CAPTURED_LEN_OFFSET)
            .map_err(too_small)?;
        let original_len = payload
            .read_u32_le(layout::EPB_ORIGINAL_LEN_OFFSET)
            .map_err(too_small)?;
        let data = payload
            .subview(layout::EPB_DATA_OFFSET, captured_len as usize)
            .map_err(|_| PacketRecordError::CapturedLengthOverrun {
                offset: block.file_offset,
                captured: captured_len,
            })?;

        let ticks = (u64::from(ts_high) << 32) | u64::from(ts_low);
        let interface = self.registry.resolve(interface_id).copied();
        let timestamp_ms = match &interface {
            Some(interface) => interface.timestamp_millis(ticks),
            None => {
                warn!(
                    interface_id,
                    offset = block.file_offset,
                    "packet cites an undescribed interface, assuming default resolution"
                );
                self.stats.unresolved_interfaces += 1;
                clamp_to_i64(TsResolution::default().ticks_to_millis(ticks))
            }
        };

        let packet = Packet {
            block,
            interface,
            interface_id,
            ticks,
            timestamp_ms,
            captured_len,
            original_len,
            data,
            index: self.next_index,
        };
        self.next_index += 1;
        self.stats.packets += 1;
        Ok(packet)
    }
}

impl<'a> Iterator for PacketExtractor<'a> {
    type Item = Result<Packet<'a>, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let block = match self.blocks.next()? {
                Ok(block) => block,
                Err(err) => return Some(Err(err)),
            };
            match self.handle_block(block) {
                Ok(Some(packet)) => return Some(Ok(packet)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Extract every packet of a capture, or the first container error.
///
/// # Examples
/// ```
/// use oscshark_core::extract_packets;
///
/// let packets = extract_packets(&[])?;
/// assert!(packets.is_empty());
/// # Ok::<(), oscshark_core::ContainerError>(())
/// ```
pub fn extract_packets(capture: &[u8]) -> Result<Vec<Packet<'_>>, ContainerError> {
    PacketExtractor::new(capture).collect()
}
