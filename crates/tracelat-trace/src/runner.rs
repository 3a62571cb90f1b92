use crate::parser::parse_traceroute;
use chrono::{SecondsFormat, Utc};
use std::io;
use std::process::Command;
use std::thread::sleep;
use std::time::Duration;
use thiserror::Error;
use tracelat_model::TraceRun;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TraceSettings {
    /// Probe with ICMP echo (`-I`) instead of UDP.
    pub icmp: bool,
    /// Skip reverse DNS (`-n`).
    pub numeric: bool,
    pub max_hops: u32,
    pub probes: u32,
    pub wait_secs: Option<u64>,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            icmp: true,
            numeric: false,
            max_hops: 30,
            probes: 3,
            wait_secs: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("traceroute command not found; ensure it is installed on your system")]
    NotFound,

    #[error("failed to spawn traceroute: {0}")]
    Spawn(#[source] io::Error),

    #[error("traceroute exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Produces the raw text output of one trace towards `destination`.
pub trait TraceOutputProvider {
    fn trace_output(&self, destination: &str) -> Result<String, ProviderError>;
}

/// Runs the `traceroute` binary found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemTraceroute {
    pub settings: TraceSettings,
}

impl SystemTraceroute {
    pub fn new(settings: TraceSettings) -> Self {
        Self { settings }
    }

    fn command(&self, destination: &str) -> Command {
        let settings = &self.settings;
        let mut cmd = Command::new("traceroute");
        if settings.icmp {
            cmd.arg("-I");
        }
        if settings.numeric {
            cmd.arg("-n");
        }
        cmd.arg("-q")
            .arg(settings.probes.to_string())
            .arg("-m")
            .arg(settings.max_hops.to_string());
        if let Some(wait) = settings.wait_secs {
            cmd.arg("-w").arg(wait.max(1).to_string());
        }
        cmd.arg(destination);
        cmd
    }
}

impl TraceOutputProvider for SystemTraceroute {
    fn trace_output(&self, destination: &str) -> Result<String, ProviderError> {
        let output = self
            .command(destination)
            .output()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => ProviderError::NotFound,
                _ => ProviderError::Spawn(err),
            })?;

        if !output.status.success() {
            return Err(ProviderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    pub count: u32,
    pub interval: Duration,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            count: 3,
            interval: Duration::from_secs(5),
        }
    }
}

/// Traces `destination` `plan.count` times, one after another.
///
/// A provider failure is logged and recorded as a run without hops.
pub fn run_traces<P>(provider: &P, destination: &str, plan: &RunPlan) -> Vec<TraceRun>
where
    P: TraceOutputProvider + ?Sized,
{
    let mut runs = Vec::new();

    for trace_num in 1..=plan.count {
        if trace_num > 1 && !plan.interval.is_zero() {
            info!(interval = ?plan.interval, "waiting before next trace");
            sleep(plan.interval);
        }

        info!(destination, trace_num, total = plan.count, "running trace");
        let hops = match provider.trace_output(destination) {
            Ok(raw) => parse_traceroute(&raw),
            Err(err) => {
                warn!(destination, trace_num, %err, "trace failed");
                Vec::new()
            }
        };
        if hops.is_empty() {
            warn!(destination, trace_num, "no valid hops found");
        }

        runs.push(TraceRun {
            trace_num,
            timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            destination: destination.to_string(),
            hops,
        });
    }

    runs
}
