use std::fs;
use std::path::{Path, PathBuf};

use oscshark_core::synth::{
    CaptureBuilder, OscArg, encode_osc_message, encode_osc_string, ethernet_frame,
    udp_ipv4_frame, udp_ipv6_frame,
};

const CONSOLE_IP: [u8; 4] = [192, 168, 1, 10];
const TABLET_IP: [u8; 4] = [192, 168, 1, 42];
const SERVER_IP: [u8; 4] = [192, 168, 1, 100];
const OSC_PORT: u16 = 8000;
const REPLY_PORT: u16 = 9000;
const LINKTYPE_ETHERNET: u16 = 1;
/// 2024-01-01T00:00:00Z in microseconds.
const START_US: u64 = 1_704_067_200_000_000;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests").join("fixtures");
    fs::create_dir_all(&root)
        .map_err(|err| format!("failed to create {}: {}", root.display(), err))?;
    write_capture(&root.join("mixer_session.pcapng"), mixer_session()?)?;
    write_capture(&root.join("noisy_session.pcapng"), noisy_session()?)?;
    Ok(())
}

fn write_capture(path: &Path, bytes: Vec<u8>) -> Result<(), String> {
    fs::write(path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn osc_frame(source: [u8; 4], address: &str, args: &[OscArg]) -> Result<Vec<u8>, String> {
    let payload = encode_osc_message(address, args);
    udp_ipv4_frame(source, SERVER_IP, REPLY_PORT, OSC_PORT, &payload)
        .map_err(|err| format!("failed to build frame for {address}: {err}"))
}

/// Two controllers driving a mixer: faders, mutes and a heartbeat.
fn mixer_session() -> Result<Vec<u8>, String> {
    let mut builder = CaptureBuilder::new().section().interface(LINKTYPE_ETHERNET);
    let messages: [([u8; 4], &str, Vec<OscArg>); 6] = [
        (CONSOLE_IP, "/ping", vec![]),
        (CONSOLE_IP, "/ch/01/mix/fader", vec![OscArg::Float(0.75)]),
        (TABLET_IP, "/ch/02/mix/on", vec![OscArg::Int(0)]),
        (
            TABLET_IP,
            "/scene/name",
            vec![OscArg::Str("Act 1".to_string()), OscArg::True],
        ),
        (CONSOLE_IP, "/ch/01/mix/fader", vec![OscArg::Float(0.5)]),
        (CONSOLE_IP, "/ping", vec![]),
    ];
    for (idx, (source, address, args)) in messages.iter().enumerate() {
        let ts = START_US + idx as u64 * 250_000;
        builder = builder.packet(ts, &osc_frame(*source, address, args)?);
    }
    Ok(builder.build())
}

/// Messages mixed with traffic that must be skipped: IPv6, ARP, bundles,
/// malformed OSC and a truncated packet block.
fn noisy_session() -> Result<Vec<u8>, String> {
    let mut bundle = encode_osc_string("#bundle");
    bundle.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    let bundle = udp_ipv4_frame(CONSOLE_IP, SERVER_IP, REPLY_PORT, OSC_PORT, &bundle)
        .map_err(|err| format!("failed to build bundle frame: {err}"))?;
    let ipv6 = udp_ipv6_frame(REPLY_PORT, OSC_PORT, &encode_osc_message("/v6", &[]))
        .map_err(|err| format!("failed to build IPv6 frame: {err}"))?;

    let builder = CaptureBuilder::new()
        .section()
        .interface_with_tsresol(LINKTYPE_ETHERNET, 0x09)
        .packet(0, &osc_frame(CONSOLE_IP, "/start", &[OscArg::Int(1)])?)
        .packet(1_000_000, &ipv6)
        .packet(2_000_000, &ethernet_frame(0x0806, &[0u8; 28]))
        .packet(3_000_000, &bundle)
        .raw_block(6, &[0u8; 24])
        .packet(
            4_000_000,
            &osc_frame(TABLET_IP, "/blob", &[OscArg::Blob(vec![0xde, 0xad])])?,
        )
        .packet(5_000_000, &osc_frame(CONSOLE_IP, "/stop", &[OscArg::Nil])?);
    Ok(builder.build())
}
