use tracelat_model::{HopRecord, TraceFile, TraceRun};
use tracelat_stats::summarize;

fn hop(number: u32, ip: Option<&str>, rtt: [Option<f64>; 3]) -> HopRecord {
    HopRecord {
        hop: number,
        ip: ip.map(|value| value.to_string()),
        hostname: None,
        rtt,
    }
}

fn run(trace_num: u32, hops: Vec<HopRecord>) -> TraceRun {
    TraceRun {
        trace_num,
        timestamp_utc: "2026-02-01T12:00:00Z".to_string(),
        destination: "example.com".to_string(),
        hops,
    }
}

#[test]
fn summarize_averages_per_hop_across_runs() {
    let trace = TraceFile {
        version: 1,
        destination: "example.com".to_string(),
        runs: vec![
            run(
                1,
                vec![
                    hop(1, Some("10.0.0.1"), [Some(1.0), Some(3.0), None]),
                    hop(2, None, [None, None, None]),
                    hop(3, Some("10.0.0.3"), [Some(9.0), Some(9.0), Some(9.0)]),
                ],
            ),
            run(
                2,
                vec![
                    hop(1, Some("10.0.0.1"), [Some(4.0), Some(4.0), Some(4.0)]),
                    hop(2, Some("10.0.0.2"), [Some(6.0), None, None]),
                    hop(3, Some("10.0.0.4"), [Some(11.0), Some(11.0), Some(11.0)]),
                ],
            ),
            run(3, Vec::new()),
        ],
    };

    let summary = summarize(&trace);
    assert_eq!(summary.version, 1);
    assert_eq!(summary.destination, "example.com");

    let numbers: Vec<u32> = summary.hops.iter().map(|hop| hop.hop).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let first = &summary.hops[0];
    assert!((first.avg_rtt_ms.unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(first.runs_seen, 2);
    assert_eq!(first.lost_probes, 1);
    assert_eq!(first.addresses, vec!["10.0.0.1".to_string()]);

    let second = &summary.hops[1];
    assert!((second.avg_rtt_ms.unwrap() - 6.0).abs() < 1e-9);
    assert_eq!(second.lost_probes, 5);
    assert_eq!(second.addresses, vec!["10.0.0.2".to_string()]);

    let third = &summary.hops[2];
    assert!((third.avg_rtt_ms.unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(
        third.addresses,
        vec!["10.0.0.3".to_string(), "10.0.0.4".to_string()]
    );
}

#[test]
fn silent_hop_has_no_average() {
    let trace = TraceFile {
        version: 1,
        destination: "example.com".to_string(),
        runs: vec![run(1, vec![hop(4, None, [None, None, None])])],
    };

    let summary = summarize(&trace);
    assert_eq!(summary.hops.len(), 1);
    assert_eq!(summary.hops[0].avg_rtt_ms, None);
    assert_eq!(summary.hops[0].lost_probes, 3);
    assert!(summary.hops[0].addresses.is_empty());
}

#[test]
fn duplicate_hop_counts_once_per_run() {
    let trace = TraceFile {
        version: 1,
        destination: "example.com".to_string(),
        runs: vec![run(
            1,
            vec![
                hop(3, Some("10.0.0.5"), [Some(2.0), None, None]),
                hop(3, Some("10.0.0.6"), [Some(4.0), None, None]),
            ],
        )],
    };

    let summary = summarize(&trace);
    let only = &summary.hops[0];
    assert_eq!(only.runs_seen, 1);
    assert_eq!(only.lost_probes, 4);
    assert!((only.avg_rtt_ms.unwrap() - 3.0).abs() < 1e-9);
}

#[test]
fn empty_trace_file_has_no_hops() {
    let trace = TraceFile {
        version: 1,
        destination: "example.com".to_string(),
        runs: Vec::new(),
    };
    assert!(summarize(&trace).hops.is_empty());
}
