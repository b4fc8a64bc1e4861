use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use super::pipeline::CapturedMessage;
use super::records::message_record;
use crate::SourceSummary;

/// Group messages by source address. Sources come out in ascending address
/// order; messages keep capture order within a source.
pub(crate) fn group_by_source<'m, 'a: 'm>(
    messages: impl IntoIterator<Item = &'m CapturedMessage<'a>>,
) -> BTreeMap<Ipv4Addr, Vec<&'m CapturedMessage<'a>>> {
    let mut groups: BTreeMap<Ipv4Addr, Vec<&CapturedMessage<'a>>> = BTreeMap::new();
    for message in messages {
        groups.entry(message.source()).or_default().push(message);
    }
    groups
}

pub(crate) fn build_source_summaries<'m, 'a: 'm>(
    messages: impl IntoIterator<Item = &'m CapturedMessage<'a>>,
) -> Vec<SourceSummary> {
    group_by_source(messages)
        .into_iter()
        .map(|(source, messages)| SourceSummary {
            source_ip: source.to_string(),
            messages: messages.into_iter().map(message_record).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_source_summaries;
    use crate::analysis::pipeline::{CapturedMessage, extract_messages};
    use crate::synth::{CaptureBuilder, OscArg, encode_osc_message, udp_ipv4_frame};

    fn frame(source: [u8; 4], address: &str) -> Vec<u8> {
        let payload = encode_osc_message(address, &[OscArg::Int(1)]);
        udp_ipv4_frame(source, [10, 0, 0, 255], 9000, 8000, &payload).unwrap()
    }

    #[test]
    fn sources_are_sorted_numerically_and_keep_capture_order() {
        let capture = CaptureBuilder::new()
            .section()
            .interface(1)
            .packet(0, &frame([10, 0, 0, 20], "/first"))
            .packet(1, &frame([10, 0, 0, 3], "/second"))
            .packet(2, &frame([10, 0, 0, 20], "/third"))
            .build();
        let extraction = extract_messages(&capture).unwrap();

        let summaries = build_source_summaries(&extraction.messages);
        let sources: Vec<_> = summaries.iter().map(|s| s.source_ip.as_str()).collect();
        assert_eq!(sources, ["10.0.0.3", "10.0.0.20"]);
        let addresses: Vec<_> = summaries[1]
            .messages
            .iter()
            .map(|m| m.address.as_str())
            .collect();
        assert_eq!(addresses, ["/first", "/third"]);
    }

    #[test]
    fn no_messages_no_sources() {
        let messages: Vec<CapturedMessage<'_>> = Vec::new();
        assert!(build_source_summaries(&messages).is_empty());
    }
}
