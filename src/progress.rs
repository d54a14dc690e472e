//! Enrichment progress reporting.
//!
//! One event is emitted per completed metadata lookup so users can see how
//! far a long enrichment pass has got and how fast it is moving. Progress is
//! written to **stderr** so stdout stays reserved for the run summary.

use std::io::Write;

/// A single progress event for the enrichment pass.
#[derive(Clone, Debug, PartialEq)]
pub enum EnrichProgressEvent {
    /// Lookups are about to start.
    Started { total: u64 },
    /// `n` of `total` lookups finished, at `rate` lookups per second.
    Lookup { n: u64, total: u64, rate: f64 },
}

/// Reports enrichment progress.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: EnrichProgressEvent);
}

/// Human-friendly progress on stderr: "enrich  1,234 / 5,000 movies  (12.5/s)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: EnrichProgressEvent) {
        let line = match &event {
            EnrichProgressEvent::Started { total } => {
                format!("enrich  starting  {} movies\n", format_number(*total))
            }
            EnrichProgressEvent::Lookup { n, total, rate } => format!(
                "enrich  {} / {} movies  ({:.1}/s)\n",
                format_number(*n),
                format_number(*total),
                rate
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: EnrichProgressEvent) {
        let obj = match &event {
            EnrichProgressEvent::Started { total } => serde_json::json!({
                "event": "progress",
                "phase": "enrich_start",
                "total": total
            }),
            EnrichProgressEvent::Lookup { n, total, rate } => serde_json::json!({
                "event": "progress",
                "phase": "enrich",
                "n": n,
                "total": total,
                "rate": rate
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: EnrichProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
