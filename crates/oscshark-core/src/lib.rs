//! oscshark core library: OSC message extraction from pcapng captures.
//!
//! The pipeline is a stack of byte-oriented decoders, each consuming a
//! bounds-checked [`ByteView`] produced by the layer below:
//! pcapng blocks -> packets (with per-interface timestamps) -> Ethernet ->
//! IPv4 -> UDP -> OSC. Every record borrows from the capture buffer; nothing
//! is copied until the report is built.
//!
//! Failure isolation:
//! - A broken block structure (`ContainerError`) aborts the whole capture.
//! - Any failure above the container drops only the packet or message it
//!   occurred in, and is logged through `tracing`.
//!
//! All file I/O lives in `source`. The `synth` module (behind the `synth`
//! feature) builds synthetic captures for tests and fixtures.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use oscshark_core::{AddressFilter, analyze_capture_file};
//!
//! let report = analyze_capture_file(Path::new("capture.pcapng"), &AddressFilter::allow_all())?;
//! for source in &report.sources {
//!     println!("{}: {} messages", source.source_ip, source.messages.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod filter;
pub mod protocols;
mod source;
#[cfg(any(test, feature = "synth"))]
pub mod synth;
mod view;

pub use analysis::{
    AnalysisError, CapturedMessage, Extraction, MessageExtractor, PacketError, PacketOutcome,
    PipelineStats, analyze_capture, analyze_capture_file, decode_packet, extract_messages,
    format_timestamp_ms,
};
pub use filter::{AddressFilter, FilterConfig, FilterError};
pub use source::pcapng::{
    Block, BlockReader, ContainerError, ExtractionStats, InterfaceRegistry, NetworkInterface,
    Packet, PacketExtractor, PacketRecordError, TsResolution, extract_packets,
};
pub use source::{CaptureFile, SourceError};
pub use view::{ByteView, ViewError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Messages extracted from one capture, grouped by source.
///
/// # Examples
/// ```
/// use oscshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, oscshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last packet, or the epoch when unknown.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Decoding counters (absent until the capture is analysed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Kept messages per source, in ascending source address order.
    pub sources: Vec<SourceSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use oscshark_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.pcapng".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Counters gathered while decoding one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub blocks_total: u64,
    pub sections: u64,
    pub interfaces: u64,
    /// Packets recovered from enhanced packet blocks.
    pub packets_total: u64,
    pub malformed_packet_blocks: u64,
    pub simple_packets_skipped: u64,
    /// Packets whose interface id was never described.
    pub unresolved_interfaces: u64,
    pub non_ethernet: u64,
    pub ipv6_skipped: u64,
    pub non_ipv4: u64,
    pub non_udp: u64,
    /// Packets dropped on a malformed Ethernet, IPv4 or UDP header.
    pub packet_errors: u64,
    pub datagrams: u64,
    pub non_osc: u64,
    pub malformed_messages: u64,
    pub messages_decoded: u64,
    /// Messages that passed the address filter.
    pub messages_kept: u64,
    /// RFC3339 timestamp of the earliest packet (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the latest packet (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Messages sent by one IPv4 source, in capture order.
///
/// # Examples
/// ```
/// use oscshark_core::SourceSummary;
///
/// let source = SourceSummary {
///     source_ip: "192.168.0.2".to_string(),
///     messages: Vec::new(),
/// };
/// assert_eq!(source.source_ip, "192.168.0.2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source_ip: String,
    pub messages: Vec<MessageRecord>,
}

/// One decoded message rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Packet sequence index within the capture.
    pub index: u64,
    /// UTC time as `YYYY-MM-DD HH:MM:SS.mmm`.
    pub timestamp: String,
    pub timestamp_ms: i64,
    pub source_ip: String,
    pub source_port: u16,
    pub destination_ip: String,
    pub destination_port: u16,
    pub address: String,
    /// Type tag string including the leading comma.
    pub type_tag: String,
    /// Arguments rendered as text; absent values are `null`.
    pub params: Vec<String>,
}

impl MessageRecord {
    /// Fields of one CSV row: timestamp, source, destination, address, then
    /// one field per argument.
    ///
    /// # Examples
    /// ```
    /// use oscshark_core::MessageRecord;
    ///
    /// let record = MessageRecord {
    ///     index: 0,
    ///     timestamp: "1970-01-01 00:00:00.000".to_string(),
    ///     timestamp_ms: 0,
    ///     source_ip: "10.0.0.1".to_string(),
    ///     source_port: 9000,
    ///     destination_ip: "10.0.0.2".to_string(),
    ///     destination_port: 8000,
    ///     address: "/test".to_string(),
    ///     type_tag: ",i".to_string(),
    ///     params: vec!["42".to_string()],
    /// };
    /// assert_eq!(
    ///     record.csv_fields(),
    ///     ["1970-01-01 00:00:00.000", "10.0.0.1", "10.0.0.2", "/test", "42"]
    /// );
    /// ```
    pub fn csv_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.timestamp.as_str(),
            self.source_ip.as_str(),
            self.destination_ip.as_str(),
            self.address.as_str(),
        ];
        fields.extend(self.params.iter().map(String::as_str));
        fields
    }
}

/// Build a stub report with base fields filled and no sources.
///
/// # Examples
/// ```
/// use oscshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, oscshark_core::REPORT_VERSION);
/// assert!(report.sources.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "oscshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        sources: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureSummary, make_stub_report};

    #[test]
    fn stub_report_serializes_without_summary() {
        let report = make_stub_report("capture.pcapng", 42);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["report_version"], 1);
        assert_eq!(json["tool"]["name"], "oscshark");
        assert_eq!(json["input"]["bytes"], 42);
        assert!(json.get("capture_summary").is_none());
        assert_eq!(json["sources"], serde_json::json!([]));
    }

    #[test]
    fn summary_omits_unknown_times() {
        let summary = CaptureSummary {
            packets_total: 3,
            ..CaptureSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["packets_total"], 3);
        assert!(json.get("time_start").is_none());
        assert!(json.get("time_end").is_none());
    }
}
