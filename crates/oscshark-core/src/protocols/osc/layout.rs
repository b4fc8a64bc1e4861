pub const BUNDLE_MARKER: &str = "#bundle";
pub const TYPE_TAG_PREFIX: u8 = b',';

pub const ALIGNMENT: usize = 4;

/// Printable ASCII range accepted in addresses.
pub const ADDRESS_MIN_BYTE: u8 = 32;
pub const ADDRESS_MAX_BYTE: u8 = 127;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
pub const NTP_UNIX_OFFSET_SECS: f64 = 2_208_988_800.0;
pub const NTP_FRACTION_SCALE: f64 = 4_294_967_296.0;
