use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracelat_model::{HopRecord, SummaryFile, TraceFile};
use tracelat_stats::summarize;
use tracelat_trace::{parse_traceroute, run_traces, RunPlan, SystemTraceroute, TraceSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TRACE_FILE_VERSION: u32 = 1;

#[derive(Parser)]
#[command(name = "tracelat", version, about = "Hop-by-hop latency from traceroute output")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Trace(TraceArgs),
    Parse(ParseArgs),
    Summary(SummaryArgs),
}

#[derive(Args)]
#[command(
    about = "Run traceroute repeatedly and save the hops. Only target networks you own or have permission to test."
)]
struct TraceArgs {
    #[arg(long)]
    destination: String,

    #[arg(long, default_value_t = 3)]
    count: u32,

    #[arg(long, default_value_t = 5000)]
    interval_ms: u64,

    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Do not resolve hop addresses to names.
    #[arg(long)]
    numeric: bool,

    /// Probe with UDP instead of ICMP echo.
    #[arg(long)]
    udp: bool,

    #[arg(long, default_value_t = 30)]
    max_hops: u32,

    #[arg(long, default_value_t = 3)]
    probes: u32,

    #[arg(long)]
    wait_secs: Option<u64>,
}

#[derive(Args)]
#[command(about = "Parse captured traceroute output (stdin when --in is omitted)")]
struct ParseArgs {
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
#[command(about = "Average RTT by hop for a saved trace file")]
struct SummaryArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Trace(args) => run_trace(args),
        Commands::Parse(args) => run_parse(args),
        Commands::Summary(args) => run_summary(args),
    }
}

fn run_trace(args: TraceArgs) -> Result<()> {
    let destination = args.destination.trim().to_string();
    if destination.is_empty() {
        return Err(anyhow!("no destination provided"));
    }

    let provider = SystemTraceroute::new(TraceSettings {
        icmp: !args.udp,
        numeric: args.numeric,
        max_hops: args.max_hops,
        probes: args.probes,
        wait_secs: args.wait_secs,
    });
    let plan = RunPlan {
        count: args.count,
        interval: Duration::from_millis(args.interval_ms),
    };

    info!(destination = %destination, count = plan.count, "starting traces");
    let runs = run_traces(&provider, &destination, &plan);

    let trace_file = TraceFile {
        version: TRACE_FILE_VERSION,
        destination: destination.clone(),
        runs,
    };

    let out = args.out_dir.join(trace_file_name(&destination));
    write_json(&out, &trace_file)?;
    info!(path = %out.display(), "trace file saved");

    print_summary(&summarize(&trace_file));
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let text = match &args.in_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input {:?}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let hops = parse_traceroute(&text);
    if hops.is_empty() {
        eprintln!("No valid hops found.");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hops)?);
    } else {
        print_hops(&hops);
    }
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.in_path)
        .with_context(|| format!("failed to read input {:?}", args.in_path))?;
    let trace_file: TraceFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse traces {:?}", args.in_path))?;

    let summary = summarize(&trace_file);
    print_summary(&summary);

    if let Some(out) = &args.out {
        write_json(out, &summary)?;
    }
    Ok(())
}

fn trace_file_name(destination: &str) -> String {
    let safe_dest: String = destination
        .chars()
        .map(|c| match c {
            '.' => '-',
            c if c.is_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    format!("trace_{safe_dest}_{stamp}.json")
}

fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{ms:.3}"),
        None => "*".to_string(),
    }
}

fn print_hops(hops: &[HopRecord]) {
    println!(
        "{:>3}  {:<39}  {:<40}  {:>9} {:>9} {:>9}",
        "hop", "ip", "hostname", "rtt1", "rtt2", "rtt3"
    );
    for hop in hops {
        println!(
            "{:>3}  {:<39}  {:<40}  {:>9} {:>9} {:>9}",
            hop.hop,
            hop.ip.as_deref().unwrap_or("-"),
            hop.hostname.as_deref().unwrap_or("-"),
            format_ms(hop.rtt[0]),
            format_ms(hop.rtt[1]),
            format_ms(hop.rtt[2]),
        );
    }
}

fn print_summary(summary: &SummaryFile) {
    println!("Average RTT by hop for {}:", summary.destination);
    if summary.hops.is_empty() {
        println!("  no valid hops found");
        return;
    }
    println!("{:>3}  {:>10}  {:>4}  {:>4}  addresses", "hop", "avg_ms", "runs", "lost");
    for hop in &summary.hops {
        println!(
            "{:>3}  {:>10}  {:>4}  {:>4}  {}",
            hop.hop,
            format_ms(hop.avg_rtt_ms),
            hop.runs_seen,
            hop.lost_probes,
            hop.addresses.join(", "),
        );
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {:?}", parent))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create temp file {:?}", tmp_path))?;
    file.write_all(data)
        .with_context(|| format!("failed to write temp file {:?}", tmp_path))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file {:?}", tmp_path))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow!("failed to replace output {:?}: {}", path, err));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    parent.join(format!(".{}.part-{}-{}", file_name, std::process::id(), stamp))
}
