use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use super::pipeline::CapturedMessage;
use crate::MessageRecord;

/// Render a Unix millisecond timestamp as `YYYY-MM-DD HH:MM:SS.mmm` (UTC).
///
/// Timestamps outside the representable calendar range fall back to the raw
/// millisecond count.
///
/// # Examples
/// ```
/// use oscshark_core::format_timestamp_ms;
///
/// assert_eq!(format_timestamp_ms(0), "1970-01-01 00:00:00.000");
/// assert_eq!(format_timestamp_ms(1_700_000_000_123), "2023-11-14 22:13:20.123");
/// ```
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    );
    datetime_from_ms(timestamp_ms)
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub(crate) fn ms_to_rfc3339(timestamp_ms: Option<i64>) -> Option<String> {
    datetime_from_ms(timestamp_ms?).and_then(|dt| dt.format(&Rfc3339).ok())
}

fn datetime_from_ms(timestamp_ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_ms) * 1_000_000).ok()
}

pub(crate) fn message_record(captured: &CapturedMessage<'_>) -> MessageRecord {
    let packet = captured.packet();
    MessageRecord {
        index: packet.index as u64,
        timestamp: format_timestamp_ms(packet.timestamp_ms),
        timestamp_ms: packet.timestamp_ms,
        source_ip: captured.source().to_string(),
        source_port: captured.datagram.source_port,
        destination_ip: captured.destination().to_string(),
        destination_port: captured.datagram.destination_port,
        address: captured.message.address.to_string(),
        type_tag: captured.message.type_tag.to_string(),
        params: captured
            .message
            .params
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}
