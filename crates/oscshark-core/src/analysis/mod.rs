use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::filter::AddressFilter;
use crate::source::pcapng::ContainerError;
use crate::source::{CaptureFile, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

pub mod pipeline;
mod records;
mod sources;

pub use pipeline::{
    CapturedMessage, Extraction, MessageExtractor, PacketError, PacketOutcome, PipelineStats,
    decode_packet, extract_messages,
};
pub use records::format_timestamp_ms;

use records::ms_to_rfc3339;
use sources::build_source_summaries;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("PCAPNG structure error: {0}")]
    Container(#[from] ContainerError),
}

pub fn analyze_capture_file(path: &Path, filter: &AddressFilter) -> Result<Report, AnalysisError> {
    let capture = CaptureFile::open(path)?;
    analyze_capture(&capture, filter)
}

/// Decode a loaded capture into a report of the messages `filter` keeps.
pub fn analyze_capture(
    capture: &CaptureFile,
    filter: &AddressFilter,
) -> Result<Report, AnalysisError> {
    let extraction = extract_messages(capture.bytes())?;
    let kept: Vec<&CapturedMessage<'_>> = extraction
        .messages
        .iter()
        .filter(|captured| {
            let permitted = filter.permits(&captured.message.address);
            if !permitted {
                debug!(address = %captured.message.address, "address filtered out");
            }
            permitted
        })
        .collect();
    info!(
        path = %capture.path().display(),
        packets = extraction.stats.packets,
        messages = extraction.stats.messages,
        kept = kept.len(),
        "capture analysed"
    );

    let mut report = make_stub_report(&capture.path().display().to_string(), capture.len());
    report.capture_summary = Some(build_capture_summary(&extraction, kept.len() as u64));
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or_else(|| summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.sources = build_source_summaries(kept);
    Ok(report)
}

fn build_capture_summary(extraction: &Extraction<'_>, messages_kept: u64) -> CaptureSummary {
    let container = extraction.container;
    let stats = extraction.stats;
    CaptureSummary {
        blocks_total: container.blocks,
        sections: container.sections,
        interfaces: container.interfaces,
        packets_total: stats.packets,
        malformed_packet_blocks: container.malformed_packet_blocks,
        simple_packets_skipped: container.simple_packets_skipped,
        unresolved_interfaces: container.unresolved_interfaces,
        non_ethernet: stats.non_ethernet,
        ipv6_skipped: stats.ipv6_skipped,
        non_ipv4: stats.non_ipv4,
        non_udp: stats.non_udp,
        packet_errors: stats.packet_errors,
        datagrams: stats.datagrams,
        non_osc: stats.non_osc,
        malformed_messages: stats.malformed_messages,
        messages_decoded: stats.messages,
        messages_kept,
        time_start: ms_to_rfc3339(stats.first_timestamp_ms),
        time_end: ms_to_rfc3339(stats.last_timestamp_ms),
    }
}
