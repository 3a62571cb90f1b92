use crate::matcher::match_hop_line;
use crate::record::build_hop_record;
use crate::rtt::normalize_probes;
use tracelat_model::HopRecord;
use tracing::debug;

const HEADER_PHRASES: [&str; 2] = ["traceroute to ", "traceroute6 to "];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrace {
    /// Destination address announced by the header line, if there was one.
    pub target: Option<String>,
    pub hops: Vec<HopRecord>,
}

/// Parses the full output of one traceroute invocation.
///
/// Never fails: blank lines, the header and anything that is not a hop line
/// are skipped, so text that contains no hops yields an empty list.
pub fn parse_traceroute(text: &str) -> Vec<HopRecord> {
    parse_trace(text).hops
}

pub fn parse_trace(text: &str) -> ParsedTrace {
    let mut target: Option<String> = None;
    let mut hops = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_header(line) {
            if target.is_none() {
                target = parse_target(line);
            }
            continue;
        }

        match parse_hop_line(line) {
            Some(hop) => hops.push(hop),
            None => debug!(line, "skipping unrecognized line"),
        }
    }

    ParsedTrace { target, hops }
}

/// Parses one trimmed hop line; `None` when it is not a hop line.
pub fn parse_hop_line(line: &str) -> Option<HopRecord> {
    let raw = match_hop_line(line)?;
    let rtt = normalize_probes(&raw.timings);
    Some(build_hop_record(&raw, rtt))
}

pub fn is_header(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    HEADER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn parse_target(line: &str) -> Option<String> {
    if let Some(start) = line.find('(') {
        if let Some(end) = line[start + 1..].find(')') {
            let inside = line[start + 1..start + 1 + end].trim();
            if !inside.is_empty() {
                return Some(inside.to_string());
            }
        }
    }

    let lower = line.to_ascii_lowercase();
    let (idx, phrase) = HEADER_PHRASES
        .iter()
        .find_map(|phrase| lower.find(phrase).map(|idx| (idx, *phrase)))?;
    let token = line[idx + phrase.len()..]
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_from_header() {
        let line = "traceroute to example.com (93.184.216.34), 30 hops max, 60 byte packets";
        assert_eq!(parse_target(line), Some("93.184.216.34".to_string()));
    }

    #[test]
    fn parse_target_without_address() {
        let line = "traceroute6 to host.example, 64 hops max";
        assert_eq!(parse_target(line), Some("host.example".to_string()));
    }

    #[test]
    fn header_detection_ignores_case() {
        assert!(is_header("Traceroute to 1.1.1.1 (1.1.1.1), 30 hops max"));
        assert!(is_header("traceroute6 to ::1 (::1), 30 hops max"));
        assert!(!is_header(" 1  10.0.0.1  1.0 ms"));
    }

    #[test]
    fn header_is_never_a_hop() {
        let parsed = parse_trace("traceroute to 10.0.0.1 (10.0.0.1), 30 hops max\n\n   \n");
        assert_eq!(parsed.target.as_deref(), Some("10.0.0.1"));
        assert!(parsed.hops.is_empty());
    }

    #[test]
    fn error_text_yields_no_hops() {
        let text = "Traceroute command not found. Ensure it is installed on your system.";
        assert!(parse_traceroute(text).is_empty());
        assert!(parse_traceroute("").is_empty());
    }
}
