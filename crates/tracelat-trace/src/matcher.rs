//! Splits a single hop line into its raw fields.
//!
//! Recognized shapes, with any number of trailing timing fields missing:
//!
//! ```text
//!  1  name (192.0.2.1)  1.234 ms  1.456 ms  1.111 ms
//!  2  192.0.2.7  2.0 ms !H  3.0 ms  *
//!  3  name  4.1 ms  4.0 ms  4.2 ms
//!  4  *  *  *
//!  5  *  192.0.2.9  6.0 ms  6.1 ms
//!  6  fe80::1%eth0 (fe80::1%eth0)  0.5 ms
//! ```
//!
//! Every `*` between the hop number and the host field is skipped and does
//! not fill a probe slot, so `5  * * 10.0.0.1  3.0 ms` reads as one answered
//! probe. The host field must be followed by a timing field or the end of the
//! line. Anything after the third timing field is ignored.

use std::net::{IpAddr, Ipv6Addr};
use tracelat_model::PROBES_PER_HOP;

pub const TIMEOUT_MARKER: &str = "*";
pub const RTT_UNIT: &str = "ms";

/// Raw groups pulled out of one hop line, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHopLine<'a> {
    pub hop: u32,
    /// Unbracketed host token: a name, or an address printed without one.
    pub host: Option<&'a str>,
    /// Address from the `(addr)` form.
    pub bracketed: Option<&'a str>,
    /// At most [`PROBES_PER_HOP`] timing tokens, e.g. `"1.2 ms"`, `"2.0 ms !H"` or `"*"`.
    pub timings: Vec<String>,
}

/// Returns `None` when the line does not have the shape of a hop line.
pub fn match_hop_line(line: &str) -> Option<RawHopLine<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (first, mut rest) = tokens.split_first()?;
    let hop = parse_hop_number(first)?;

    while let Some((token, tail)) = rest.split_first() {
        if !is_leading_marker(token) {
            break;
        }
        rest = tail;
    }

    let mut host = None;
    let mut bracketed = None;
    let mut cursor = 0;

    if !rest.is_empty() && timing_token(rest).is_none() {
        let field = host_field(rest)?;
        host = field.host;
        bracketed = field.bracketed;
        cursor = field.consumed;

        if cursor < rest.len() && timing_token(&rest[cursor..]).is_none() {
            return None;
        }
    }

    let mut timings = Vec::with_capacity(PROBES_PER_HOP);
    while timings.len() < PROBES_PER_HOP {
        let Some((raw, consumed)) = timing_token(&rest[cursor..]) else {
            break;
        };
        timings.push(raw);
        cursor += consumed;
    }

    Some(RawHopLine {
        hop,
        host,
        bracketed,
        timings,
    })
}

struct HostField<'a> {
    host: Option<&'a str>,
    bracketed: Option<&'a str>,
    consumed: usize,
}

fn host_field<'a>(tokens: &[&'a str]) -> Option<HostField<'a>> {
    let token = *tokens.first()?;

    if let Some(address) = bracketed_address(token) {
        return Some(HostField {
            host: None,
            bracketed: Some(address),
            consumed: 1,
        });
    }

    // name(addr) with no space in between
    if let Some(open) = token.find('(') {
        let name = &token[..open];
        let address = bracketed_address(&token[open..])?;
        if !is_host_token(name) {
            return None;
        }
        return Some(HostField {
            host: Some(name),
            bracketed: Some(address),
            consumed: 1,
        });
    }

    if !is_host_token(token) {
        return None;
    }

    match tokens.get(1).and_then(|next| bracketed_address(*next)) {
        Some(address) => Some(HostField {
            host: Some(token),
            bracketed: Some(address),
            consumed: 2,
        }),
        None => Some(HostField {
            host: Some(token),
            bracketed: None,
            consumed: 1,
        }),
    }
}

/// Matches one timing field at the start of `tokens`, returning its
/// canonical text and how many tokens it spans.
fn timing_token(tokens: &[&str]) -> Option<(String, usize)> {
    let token = *tokens.first()?;

    if token == TIMEOUT_MARKER {
        return Some((TIMEOUT_MARKER.to_string(), 1));
    }

    let (value, mut consumed) = match token.strip_suffix(RTT_UNIT) {
        Some(value) if is_decimal(value) => (value, 1),
        _ if is_decimal(token) && tokens.get(1) == Some(&RTT_UNIT) => (token, 2),
        _ => return None,
    };

    let mut raw = format!("{value} {RTT_UNIT}");
    if let Some(flag) = tokens.get(consumed).filter(|next| is_annotation(next)) {
        raw.push(' ');
        raw.push_str(flag);
        consumed += 1;
    }

    Some((raw, consumed))
}

fn parse_hop_number(token: &str) -> Option<u32> {
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().filter(|hop| *hop > 0)
}

fn is_leading_marker(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '*')
}

fn bracketed_address(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('(')?.strip_suffix(')')?;
    is_address(inner).then_some(inner)
}

/// IPv4 or IPv6 literal; IPv6 may carry a `%zone` suffix.
pub(crate) fn is_address(token: &str) -> bool {
    match token.split_once('%') {
        Some((address, zone)) => !zone.is_empty() && address.parse::<Ipv6Addr>().is_ok(),
        None => token.parse::<IpAddr>().is_ok(),
    }
}

fn is_host_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    is_address(token)
        || token
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

fn is_annotation(token: &str) -> bool {
    token.len() > 1 && token.starts_with('!')
}

fn is_decimal(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    match parts.next() {
        Some(fraction) => digits(whole) && digits(fraction),
        None => digits(whole),
    }
}
