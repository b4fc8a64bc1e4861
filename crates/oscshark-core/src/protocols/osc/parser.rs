use std::borrow::Cow;

use tracing::{debug, warn};

use super::error::OscError;
use super::layout;
use super::reader::OscReader;
use super::value::{OscTypeTag, OscValue};
use crate::view::ByteView;

/// Decoded OSC message.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage<'a> {
    pub address: Cow<'a, str>,
    /// Type tag string including the leading comma.
    pub type_tag: Cow<'a, str>,
    pub params: Vec<OscValue<'a>>,
}

/// Decode an OSC message from a datagram payload.
///
/// Returns `Ok(None)` for bundles and for addresses that are empty or not
/// printable ASCII, which rules out most non-OSC traffic.
///
/// # Examples
/// ```
/// use oscshark_core::ByteView;
/// use oscshark_core::protocols::osc::{OscValue, parse_osc_message};
///
/// let bytes = b"/test\0\0\0,i\0\0\0\0\0\x2a";
/// let message = parse_osc_message(ByteView::new(bytes)).unwrap().unwrap();
/// assert_eq!(message.address, "/test");
/// assert_eq!(message.params, vec![OscValue::Int(42)]);
/// ```
pub fn parse_osc_message(payload: ByteView<'_>) -> Result<Option<OscMessage<'_>>, OscError> {
    let mut reader = OscReader::new(payload);

    let address = reader.read_string_bytes()?;
    if address == layout::BUNDLE_MARKER.as_bytes() {
        warn!("OSC bundles are not supported, skipping");
        return Ok(None);
    }
    if !is_plain_address(address) {
        debug!(len = address.len(), "not an OSC address, skipping");
        return Ok(None);
    }
    let address = String::from_utf8_lossy(address);

    let type_tag = reader.read_string()?;
    let Some(tags) = type_tag.strip_prefix(char::from(layout::TYPE_TAG_PREFIX)) else {
        return Err(OscError::MissingTypeTagComma);
    };

    let mut params = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        params.push(OscTypeTag::from_char(tag).decode(&mut reader)?);
    }

    Ok(Some(OscMessage {
        address,
        type_tag,
        params,
    }))
}

fn is_plain_address(address: &[u8]) -> bool {
    !address.is_empty()
        && address
            .iter()
            .all(|&b| (layout::ADDRESS_MIN_BYTE..layout::ADDRESS_MAX_BYTE).contains(&b))
}
