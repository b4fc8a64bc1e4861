use etherparse::{Ethernet2Header, EtherType};
use pcap_parser::Linktype;

pub const HEADER_LEN: usize = Ethernet2Header::LEN;

pub const ETHERTYPE_IPV4: u16 = EtherType::IPV4.0;
pub const ETHERTYPE_IPV6: u16 = EtherType::IPV6.0;

/// Historical experimental 3Mb Ethernet link type.
pub const EXP_ETHERNET: Linktype = Linktype(2);
pub const ETHERNET_LINKTYPES: [Linktype; 2] = [Linktype::ETHERNET, EXP_ETHERNET];
