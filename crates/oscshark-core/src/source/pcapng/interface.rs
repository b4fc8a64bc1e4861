use pcap_parser::Linktype;
use tracing::{trace, warn};

use super::block::Block;
use super::error::ContainerError;
use super::layout;

/// Decimal timestamp resolution: one tick lasts `10^exponent` seconds.
///
/// # Examples
/// ```
/// use oscshark_core::TsResolution;
///
/// let micros = TsResolution::from_raw(0x06);
/// assert_eq!(micros.exponent(), -6);
/// assert_eq!(micros.ticks_to_millis(1_500_000), 1_500);
///
/// let coarse = TsResolution::from_raw(0x89);
/// assert_eq!(coarse.exponent(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsResolution {
    exponent: i32,
}

impl TsResolution {
    /// Decode an `if_tsresol` byte. The high bit selects a positive exponent.
    pub fn from_raw(raw: u8) -> Self {
        let magnitude = i32::from(raw & layout::TSRESOL_EXPONENT_MASK);
        let exponent = if raw & layout::TSRESOL_POSITIVE_FLAG != 0 {
            magnitude
        } else {
            -magnitude
        };
        Self { exponent }
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn seconds_per_tick(&self) -> f64 {
        10f64.powi(self.exponent)
    }

    /// Convert a tick count to whole milliseconds (truncating), saturating on
    /// overflow.
    pub fn ticks_to_millis(&self, ticks: u64) -> i128 {
        let ticks = i128::from(ticks);
        let shift = self.exponent + 3;
        if shift >= 0 {
            match 10i128.checked_pow(shift.unsigned_abs()) {
                Some(factor) => ticks.saturating_mul(factor),
                None if ticks == 0 => 0,
                None => i128::MAX,
            }
        } else {
            match 10i128.checked_pow(shift.unsigned_abs()) {
                Some(divisor) => ticks / divisor,
                None => 0,
            }
        }
    }
}

impl Default for TsResolution {
    fn default() -> Self {
        Self::from_raw(layout::DEFAULT_TSRESOL)
    }
}

/// Recording interface metadata from an interface description block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Arrival-order id within the current section.
    pub id: u32,
    pub linktype: Linktype,
    pub resolution: TsResolution,
    /// `if_tsoffset` seconds added to every timestamp of this interface.
    pub ts_offset_secs: i64,
}

impl NetworkInterface {
    /// Wall-clock milliseconds since the Unix epoch for a raw tick count.
    pub fn timestamp_millis(&self, ticks: u64) -> i64 {
        let millis = self
            .resolution
            .ticks_to_millis(ticks)
            .saturating_add(i128::from(self.ts_offset_secs) * 1000);
        clamp_to_i64(millis)
    }
}

pub(crate) fn clamp_to_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Parse an interface description block into an interface with the given id.
///
/// # Errors
/// Returns `ContainerError::InterfaceDescriptionTooSmall` when the block is
/// shorter than the minimal description block; this is file-fatal.
pub fn parse_interface_description(
    block: &Block<'_>,
    id: u32,
) -> Result<NetworkInterface, ContainerError> {
    if block.total_len() < layout::IDB_MIN_BLOCK_LEN {
        return Err(ContainerError::InterfaceDescriptionTooSmall {
            offset: block.file_offset,
            length: block.total_len(),
        });
    }

    let payload = block.payload;
    let linktype = Linktype(i32::from(
        payload.read_u16_le(layout::IDB_LINKTYPE_OFFSET)?,
    ));
    let mut resolution = TsResolution::default();
    let mut ts_offset_secs = 0i64;

    let mut pos = layout::IDB_OPTIONS_OFFSET;
    while pos + layout::OPTION_HEADER_LEN <= payload.len() {
        let code = payload.read_u16_le(pos)?;
        let len = usize::from(payload.read_u16_le(pos + 2)?);
        if code == layout::OPT_END_OF_OPT {
            break;
        }
        let value = match payload.subview(pos + layout::OPTION_HEADER_LEN, len) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    offset = block.file_offset,
                    code, "interface option overruns block, ignoring the rest: {err}"
                );
                break;
            }
        };
        match code {
            layout::OPT_IF_TSRESOL if len >= 1 => {
                resolution = TsResolution::from_raw(value.read_u8(0)?);
            }
            layout::OPT_IF_TSOFFSET if len >= 8 => {
                ts_offset_secs = value.read_i64_le(0)?;
            }
            _ => trace!(code, len, "skipping interface option"),
        }
        pos += layout::OPTION_HEADER_LEN + padded_len(len);
    }

    Ok(NetworkInterface {
        id,
        linktype,
        resolution,
        ts_offset_secs,
    })
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Interfaces of the current section, indexed by arrival order.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    interfaces: Vec<NetworkInterface>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all interfaces; ids restart at 0 for the next section.
    pub fn reset(&mut self) {
        self.interfaces.clear();
    }

    /// Register the interface described by `block` under the next id.
    pub fn register(&mut self, block: &Block<'_>) -> Result<NetworkInterface, ContainerError> {
        let id = self.interfaces.len() as u32;
        let interface = parse_interface_description(block, id)?;
        self.interfaces.push(interface);
        Ok(interface)
    }

    pub fn resolve(&self, id: u32) -> Option<&NetworkInterface> {
        self.interfaces.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
