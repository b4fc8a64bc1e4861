//! PCAPNG wire layout: block codes, offsets and option codes.
//!
//! Block header and trailer fields are little-endian. Offsets marked
//! `BLOCK_*` are relative to the start of a block; the others are relative to
//! the block payload (which begins after the 8-byte type/length header).

pub const SECTION_HEADER_BLOCK: u32 = 0x0A0D_0D0A;
pub const INTERFACE_DESCRIPTION_BLOCK: u32 = 0x0000_0001;
pub const SIMPLE_PACKET_BLOCK: u32 = 0x0000_0003;
pub const NAME_RESOLUTION_BLOCK: u32 = 0x0000_0004;
pub const INTERFACE_STATISTICS_BLOCK: u32 = 0x0000_0005;
pub const ENHANCED_PACKET_BLOCK: u32 = 0x0000_0006;

pub const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;

pub const BLOCK_TYPE_OFFSET: usize = 0;
pub const BLOCK_LENGTH_OFFSET: usize = 4;
pub const BLOCK_HEADER_LEN: usize = 8;
pub const BLOCK_TRAILER_LEN: usize = 4;
pub const BLOCK_MIN_LEN: usize = BLOCK_HEADER_LEN + BLOCK_TRAILER_LEN;
pub const BLOCK_ALIGNMENT: usize = 4;

pub const SHB_BYTE_ORDER_OFFSET: usize = 0;

pub const IDB_MIN_BLOCK_LEN: usize = 20;
pub const IDB_LINKTYPE_OFFSET: usize = 0;
pub const IDB_OPTIONS_OFFSET: usize = 8;

pub const OPTION_HEADER_LEN: usize = 4;
pub const OPT_END_OF_OPT: u16 = 0;
pub const OPT_IF_TSRESOL: u16 = 9;
pub const OPT_IF_TSOFFSET: u16 = 14;

/// Default timestamp resolution: 10^-6 seconds per tick.
pub const DEFAULT_TSRESOL: u8 = 6;
pub const TSRESOL_POSITIVE_FLAG: u8 = 0x80;
pub const TSRESOL_EXPONENT_MASK: u8 = 0x7F;

pub const EPB_MIN_PAYLOAD_LEN: usize = 32;
pub const EPB_INTERFACE_ID_OFFSET: usize = 0;
pub const EPB_TS_HIGH_OFFSET: usize = 4;
pub const EPB_TS_LOW_OFFSET: usize = 8;
pub const EPB_CAPTURED_LEN_OFFSET: usize = 12;
pub const EPB_ORIGINAL_LEN_OFFSET: usize = 16;
pub const EPB_DATA_OFFSET: usize = 20;
