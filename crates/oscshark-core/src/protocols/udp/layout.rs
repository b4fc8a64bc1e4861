use etherparse::{IpNumber, UdpHeader};

pub const IP_PROTOCOL_UDP: u8 = IpNumber::UDP.0;
pub const HEADER_LEN: usize = UdpHeader::LEN;
