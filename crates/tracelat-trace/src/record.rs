//! Decides which host token is the address and assembles the [`HopRecord`].
//!
//! A token counts as an address only when it is a valid IPv4 or IPv6 literal
//! (IPv6 may carry a `%zone`). Dotted strings that merely look numeric, such
//! as `1.2.3` or `256.1.1.1`, are names.

use crate::matcher::{is_address, RawHopLine};
use tracelat_model::{HopRecord, PROBES_PER_HOP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClass {
    Address,
    Name,
}

pub fn classify_host(token: &str) -> HostClass {
    if is_address(token) {
        HostClass::Address
    } else {
        HostClass::Name
    }
}

pub fn build_hop_record(raw: &RawHopLine<'_>, rtt: [Option<f64>; PROBES_PER_HOP]) -> HopRecord {
    let (hostname, ip) = match (raw.host, raw.bracketed) {
        (name, Some(address)) => (name, Some(address)),
        (Some(token), None) => match classify_host(token) {
            HostClass::Address => (None, Some(token)),
            HostClass::Name => (Some(token), None),
        },
        (None, None) => (None, None),
    };

    // routers without reverse DNS print their address twice
    let hostname = hostname.filter(|name| Some(*name) != ip);

    HopRecord {
        hop: raw.hop,
        ip: ip.map(str::to_string),
        hostname: hostname.map(str::to_string),
        rtt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw<'a>(host: Option<&'a str>, bracketed: Option<&'a str>) -> RawHopLine<'a> {
        RawHopLine {
            hop: 4,
            host,
            bracketed,
            timings: Vec::new(),
        }
    }

    #[test]
    fn classifies_addresses_and_names() {
        assert_eq!(classify_host("10.0.0.1"), HostClass::Address);
        assert_eq!(classify_host("2001:db8::1"), HostClass::Address);
        assert_eq!(classify_host("gw.example.net"), HostClass::Name);
        assert_eq!(classify_host("1.2.3"), HostClass::Name);
        assert_eq!(classify_host("256.1.1.1"), HostClass::Name);
        assert_eq!(classify_host("fe80::1%eth0"), HostClass::Address);
        assert_eq!(classify_host("10.0.0.1%eth0"), HostClass::Name);
    }

    #[test]
    fn bracketed_token_is_the_address() {
        let hop = build_hop_record(&raw(Some("gw.example.net"), Some("10.0.0.1")), [None; 3]);
        assert_eq!(hop.hostname.as_deref(), Some("gw.example.net"));
        assert_eq!(hop.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn identical_name_and_address_collapse() {
        let hop = build_hop_record(&raw(Some("10.0.0.1"), Some("10.0.0.1")), [None; 3]);
        assert_eq!(hop.hostname, None);
        assert_eq!(hop.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn bare_token_is_classified() {
        let address = build_hop_record(&raw(Some("10.0.0.1"), None), [None; 3]);
        assert_eq!(address.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(address.hostname, None);

        let name = build_hop_record(&raw(Some("gw.example.net"), None), [None; 3]);
        assert_eq!(name.ip, None);
        assert_eq!(name.hostname.as_deref(), Some("gw.example.net"));
    }

    #[test]
    fn rtt_is_carried_through() {
        let hop = build_hop_record(&raw(None, None), [Some(1.0), None, Some(2.0)]);
        assert_eq!(hop.hop, 4);
        assert_eq!(hop.rtt, [Some(1.0), None, Some(2.0)]);
    }
}
