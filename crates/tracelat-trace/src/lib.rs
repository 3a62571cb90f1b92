//! Traceroute output parsing and collection.
//!
//! Parsing runs in three steps per line: [`matcher`] splits the line into raw
//! fields, [`rtt`] turns timing tokens into milliseconds and [`record`]
//! decides which host token is the address and assembles the [`HopRecord`].
//!
//! [`HopRecord`]: tracelat_model::HopRecord

pub mod matcher;
pub mod parser;
pub mod record;
pub mod rtt;
pub mod runner;

pub use matcher::{match_hop_line, RawHopLine};
pub use parser::{is_header, parse_hop_line, parse_trace, parse_traceroute, ParsedTrace};
pub use record::{build_hop_record, classify_host, HostClass};
pub use rtt::{normalize_probes, normalize_rtt};
pub use runner::{
    run_traces, ProviderError, RunPlan, SystemTraceroute, TraceOutputProvider, TraceSettings,
};
