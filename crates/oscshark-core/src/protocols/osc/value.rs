use std::borrow::Cow;
use std::fmt;

use tracing::warn;

use super::error::OscError;
use super::layout;
use super::reader::OscReader;
use crate::view::ByteView;

/// One decoded OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum OscValue<'a> {
    Int(i32),
    Float(f32),
    String(Cow<'a, str>),
    Symbol(Cow<'a, str>),
    Blob(ByteView<'a>),
    Long(i64),
    Double(f64),
    Char(char),
    /// RGBA color, packed big-endian.
    Color(u32),
    /// Port id, status byte and two data bytes, packed big-endian.
    Midi(u32),
    /// Milliseconds derived from an NTP timetag.
    Timetag(f64),
    Bool(bool),
    Nil,
    Infinitum,
    /// Placeholder for a tag this decoder does not handle. Nothing was read
    /// for it, so later arguments may be misaligned.
    Unsupported(char),
}

impl OscValue<'_> {
    /// True for values that carry no data (`N`, `I` and unsupported tags).
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            OscValue::Nil | OscValue::Infinitum | OscValue::Unsupported(_)
        )
    }
}

impl fmt::Display for OscValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscValue::Int(value) => write!(f, "{value}"),
            OscValue::Float(value) => write!(f, "{value}"),
            OscValue::String(value) | OscValue::Symbol(value) => f.write_str(value),
            OscValue::Blob(blob) => {
                f.write_str("0x")?;
                for byte in blob.as_bytes() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            OscValue::Long(value) => write!(f, "{value}"),
            OscValue::Double(value) => write!(f, "{value}"),
            OscValue::Char(value) => write!(f, "{value}"),
            OscValue::Color(value) | OscValue::Midi(value) => write!(f, "{value}"),
            OscValue::Timetag(millis) => write!(f, "{millis}"),
            OscValue::Bool(value) => write!(f, "{value}"),
            OscValue::Nil | OscValue::Infinitum | OscValue::Unsupported(_) => f.write_str("null"),
        }
    }
}

/// Type tags understood by the decoder.
///
/// # Examples
/// ```
/// use oscshark_core::protocols::osc::OscTypeTag;
///
/// assert_eq!(OscTypeTag::from_char('i'), OscTypeTag::Int32);
/// assert_eq!(OscTypeTag::from_char('['), OscTypeTag::Unsupported('['));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscTypeTag {
    Int32,
    Float32,
    String,
    Symbol,
    Blob,
    Int64,
    Float64,
    Char,
    Color,
    Midi,
    Timetag,
    True,
    False,
    Nil,
    Infinitum,
    Unsupported(char),
}

impl OscTypeTag {
    pub fn from_char(tag: char) -> Self {
        match tag {
            'i' => Self::Int32,
            'f' => Self::Float32,
            's' => Self::String,
            'S' => Self::Symbol,
            'b' => Self::Blob,
            'h' => Self::Int64,
            'd' => Self::Float64,
            'c' => Self::Char,
            'r' => Self::Color,
            'm' => Self::Midi,
            't' => Self::Timetag,
            'T' => Self::True,
            'F' => Self::False,
            'N' => Self::Nil,
            'I' => Self::Infinitum,
            other => Self::Unsupported(other),
        }
    }

    /// Read the argument for this tag from the cursor.
    pub fn decode<'a>(self, reader: &mut OscReader<'a>) -> Result<OscValue<'a>, OscError> {
        let value = match self {
            Self::Int32 => OscValue::Int(reader.read_i32()?),
            Self::Float32 => OscValue::Float(reader.read_f32()?),
            Self::String => OscValue::String(reader.read_string()?),
            Self::Symbol => OscValue::Symbol(reader.read_string()?),
            Self::Blob => OscValue::Blob(reader.read_blob()?),
            Self::Int64 => OscValue::Long(reader.read_i64()?),
            Self::Float64 => OscValue::Double(reader.read_f64()?),
            Self::Char => {
                let value = reader.read_u32()?;
                OscValue::Char(char::from_u32(value).ok_or(OscError::InvalidChar { value })?)
            }
            Self::Color => OscValue::Color(reader.read_u32()?),
            Self::Midi => OscValue::Midi(reader.read_u32()?),
            Self::Timetag => {
                let seconds = reader.read_u32()?;
                let fraction = reader.read_u32()?;
                OscValue::Timetag(timetag_millis(seconds, fraction))
            }
            Self::True => OscValue::Bool(true),
            Self::False => OscValue::Bool(false),
            Self::Nil => OscValue::Nil,
            Self::Infinitum => OscValue::Infinitum,
            Self::Unsupported(tag) => {
                warn!(
                    tag = %tag,
                    "OSC type tag not handled, following arguments may be misaligned"
                );
                OscValue::Unsupported(tag)
            }
        };
        Ok(value)
    }
}

/// Milliseconds for an NTP timetag given as (seconds since 1900, 2^-32 fraction).
pub fn timetag_millis(seconds: u32, fraction: u32) -> f64 {
    let seconds_1900 = f64::from(seconds) + f64::from(fraction) / layout::NTP_FRACTION_SCALE;
    (seconds_1900 + layout::NTP_UNIX_OFFSET_SECS) * 1000.0
}
