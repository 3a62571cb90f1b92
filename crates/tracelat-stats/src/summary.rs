use std::collections::{BTreeMap, BTreeSet};
use tracelat_model::{HopSummary, SummaryFile, TraceFile};

pub const SUMMARY_VERSION: u32 = 1;

#[derive(Default)]
struct HopStats {
    runs_seen: u32,
    sum_avg: f64,
    avg_count: u32,
    lost_probes: u32,
    addresses: BTreeSet<String>,
}

/// Groups every run's hops by hop number.
///
/// `avg_rtt_ms` is the mean of the per-run hop averages; runs where the hop
/// never answered do not pull it down.
pub fn summarize(trace_file: &TraceFile) -> SummaryFile {
    let mut hop_stats: BTreeMap<u32, HopStats> = BTreeMap::new();

    for run in &trace_file.runs {
        let mut seen_this_run: BTreeSet<u32> = BTreeSet::new();

        for hop in &run.hops {
            let stats = hop_stats.entry(hop.hop).or_default();
            if seen_this_run.insert(hop.hop) {
                stats.runs_seen += 1;
            }
            if let Some(avg) = hop.avg_rtt() {
                stats.sum_avg += avg;
                stats.avg_count += 1;
            }
            stats.lost_probes += hop.lost_probes();
            if let Some(ip) = &hop.ip {
                stats.addresses.insert(ip.clone());
            }
        }
    }

    let hops = hop_stats
        .into_iter()
        .map(|(hop, stats)| HopSummary {
            hop,
            avg_rtt_ms: if stats.avg_count > 0 {
                Some(stats.sum_avg / stats.avg_count as f64)
            } else {
                None
            },
            runs_seen: stats.runs_seen,
            lost_probes: stats.lost_probes,
            addresses: stats.addresses.into_iter().collect(),
        })
        .collect();

    SummaryFile {
        version: SUMMARY_VERSION,
        destination: trace_file.destination.clone(),
        hops,
    }
}
