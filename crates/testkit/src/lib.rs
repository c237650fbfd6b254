#![warn(missing_docs)]
//! Deterministic testing surfaces: event logs, mesh metrics and scratch dirs.

use anyhow::{Context, Result};
use blockworld_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create event log {}", path.display()))?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Mesh metric snapshot for a chunk.
#[derive(Debug, Serialize)]
pub struct ChunkMeshMetric {
    /// Chunk coordinates [x, z].
    pub chunk: [i32; 2],
    /// Triangle count for the opaque mesh.
    pub triangles: usize,
    /// Triangle count for the blended mesh.
    pub translucent_triangles: usize,
    /// Opaque mesh hash (hex string) for deterministic comparisons.
    pub hash: String,
}

/// Writes chunk mesh metrics to JSON for CI artifacts.
pub struct MeshMetricSink {
    file: File,
}

impl MeshMetricSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the provided metrics as pretty JSON.
    pub fn write(&mut self, metrics: &[ChunkMeshMetric]) -> Result<()> {
        let json = serde_json::to_string_pretty(metrics)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Fresh, empty scratch directory labelled for the calling test.
///
/// The directory and its contents are removed when the guard drops.
pub fn temp_dir(label: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("blockworld-{label}-"))
        .tempdir()
        .with_context(|| format!("failed to create temp dir for {label}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_metric_sink_writes_file() {
        let dir = temp_dir("metrics").unwrap();
        let path = dir.path().join("nested").join("mesh-metrics.json");
        let metrics = vec![ChunkMeshMetric {
            chunk: [0, 0],
            triangles: 12,
            translucent_triangles: 2,
            hash: "deadbeef".into(),
        }];
        let mut sink = MeshMetricSink::create(&path).expect("sink create");
        sink.write(&metrics).expect("write succeeds");
        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("deadbeef"));
        assert!(contents.contains("translucent_triangles"));
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let dir = temp_dir("events").unwrap();
        let path = dir.path().join("events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for tick in 0..3 {
            sink.write(&EventRecord {
                tick: SimTick(tick),
                kind: "stream",
                payload: "loaded=1",
            })
            .expect("write");
        }
        drop(sink);
        let contents = fs::read_to_string(&path).expect("readable");
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().all(|l| l.contains("\"kind\":\"stream\"")));
    }

    #[test]
    fn temp_dirs_are_unique_and_cleaned_up() {
        let a = temp_dir("unique").unwrap();
        let b = temp_dir("unique").unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir() && b.path().is_dir());
        let kept = a.path().to_path_buf();
        drop(a);
        assert!(!kept.exists());
    }
}
