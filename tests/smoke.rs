use std::path::PathBuf;
use std::process::Command;

use blockworld_core::SimTick;
use blockworld_testkit::{temp_dir, EventRecord, JsonlSink};

#[test]
fn deterministic_event_stream_can_be_written() {
    let tmp = temp_dir("smoke-eventlog").unwrap();
    let dir = tmp.path();
    let mut sink = JsonlSink::create(dir.join("eventlog.jsonl")).expect("can create temp log");
    let tick = SimTick::ZERO.advance(1);
    let record = EventRecord {
        tick,
        kind: "SmokeTest",
        payload: "ok",
    };
    sink.write(&record).expect("can write event");
}

fn run_headless(dir: &std::path::Path, metrics: &PathBuf) {
    let bin = env!("CARGO_BIN_EXE_blockworld");
    let status = Command::new(bin)
        .arg("--config")
        .arg(dir.join("absent.toml"))
        .args(["--seed", "31337", "--render-distance", "1", "--ticks", "40"])
        .arg("--save-dir")
        .arg(dir.join("saves"))
        .arg("--metrics-out")
        .arg(metrics)
        .arg("--event-log")
        .arg(dir.join("events.jsonl"))
        .status()
        .expect("spawn blockworld");
    assert!(status.success(), "headless run failed: {status}");
}

#[test]
fn headless_run_writes_metrics_and_replays_edits() {
    let tmp = temp_dir("smoke-headless").unwrap();
    let dir = tmp.path();
    let first = dir.join("first.json");
    let second = dir.join("second.json");
    run_headless(&dir, &first);
    // Second run replays the edit log written by the first.
    run_headless(&dir, &second);

    let read = |path: &PathBuf| -> serde_json::Value {
        let text = std::fs::read_to_string(path).expect("metrics written");
        serde_json::from_str(&text).expect("metrics are JSON")
    };
    let metrics = read(&first);
    let chunks = metrics.as_array().expect("array of chunk metrics");
    assert_eq!(chunks.len(), 9);
    assert!(chunks.iter().all(|c| c["triangles"].as_u64().unwrap_or(0) > 0));
    let counts = |value: &serde_json::Value| -> Vec<(serde_json::Value, u64, u64)> {
        value
            .as_array()
            .expect("array of chunk metrics")
            .iter()
            .map(|c| {
                (
                    c["chunk"].clone(),
                    c["triangles"].as_u64().unwrap_or(0),
                    c["translucent_triangles"].as_u64().unwrap_or(0),
                )
            })
            .collect()
    };
    assert_eq!(counts(&read(&second)), counts(&metrics));

    let events = std::fs::read_to_string(dir.join("events.jsonl")).expect("event log written");
    assert!(events.lines().any(|line| line.contains("ChunkAdded")));
    assert!(events.lines().any(|line| line.contains("ChunkRemoved")));

    let seed_dir = dir.join("saves").join("31337");
    assert!(seed_dir.is_dir(), "edit logs under the seed directory");
}
