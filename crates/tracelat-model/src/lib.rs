//! Shared data structures for tracelat.

use serde::{Deserialize, Serialize};

/// Number of probe slots kept per hop.
pub const PROBES_PER_HOP: usize = 3;

/// One hop line of traceroute output.
///
/// `rtt` always carries exactly [`PROBES_PER_HOP`] slots; a slot is `None`
/// when the probe timed out or the line had fewer timing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HopRecord {
    pub hop: u32,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub rtt: [Option<f64>; PROBES_PER_HOP],
}

impl HopRecord {
    /// Mean of the probes that answered, `None` when every probe timed out.
    pub fn avg_rtt(&self) -> Option<f64> {
        let answered: Vec<f64> = self.rtt.iter().copied().flatten().collect();
        if answered.is_empty() {
            None
        } else {
            Some(answered.iter().sum::<f64>() / answered.len() as f64)
        }
    }

    pub fn lost_probes(&self) -> u32 {
        self.rtt.iter().filter(|probe| probe.is_none()).count() as u32
    }

    pub fn responded(&self) -> bool {
        self.rtt.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceRun {
    pub trace_num: u32,
    pub timestamp_utc: String,
    pub destination: String,
    pub hops: Vec<HopRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceFile {
    pub version: u32,
    pub destination: String,
    pub runs: Vec<TraceRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HopSummary {
    pub hop: u32,
    pub avg_rtt_ms: Option<f64>,
    pub runs_seen: u32,
    pub lost_probes: u32,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryFile {
    pub version: u32,
    pub destination: String,
    pub hops: Vec<HopSummary>,
}
