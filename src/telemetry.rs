//! Append-only JSONL side log of external-call metrics.
//!
//! One record per event: `{timestamp, pathway, latency_sec, model}`. This is
//! a monitoring concern only — a telemetry write failure is reported to
//! stderr and never fails the turn that produced it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

pub const PATHWAY_SAFETY_VIOLATION: &str = "safety_violation";

/// Writes telemetry records to a JSONL file.
pub struct TelemetryLog {
    path: PathBuf,
    model: String,
}

impl TelemetryLog {
    pub fn new(path: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            model: model.into(),
        }
    }

    /// Record one event. Latency is rounded to centiseconds.
    pub fn record(&self, pathway: &str, latency: Duration) {
        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "pathway": pathway,
            "latency_sec": (latency.as_secs_f64() * 100.0).round() / 100.0,
            "model": self.model,
        });
        if let Err(e) = self.append(&entry) {
            eprintln!("Telemetry write failed: {e}");
        }
    }

    fn append(&self, entry: &serde_json::Value) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{entry}")
    }
}
