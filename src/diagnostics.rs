//! Best-effort timing and diagnostic reporting.
//!
//! Engines report named entries (stage timings, face counts, round counts) to a
//! [`DiagnosticSink`]. The sink is write-only from the engine's point of view and
//! nothing it does can change an extraction result. Every entry is also emitted as a
//! `tracing` debug event.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Value of a diagnostic entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticValue {
    /// Elapsed wall time in seconds.
    Seconds(f64),
    /// A count.
    Count(u64),
    /// Free-form text.
    Text(String),
}

/// Receiver of diagnostic entries.
pub trait DiagnosticSink {
    /// Records one entry. Must not panic.
    fn record(&mut self, key: &str, value: DiagnosticValue);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _key: &str, _value: DiagnosticValue) {}
}

/// Sink that keeps every entry in insertion order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DiagnosticLog {
    entries: Vec<(String, DiagnosticValue)>,
}

impl DiagnosticLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[(String, DiagnosticValue)] {
        &self.entries
    }

    /// The most recent value recorded under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DiagnosticValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The most recent count recorded under `key`.
    #[must_use]
    pub fn count(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(DiagnosticValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    /// Sum of every timing entry.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|(_, v)| match v {
                DiagnosticValue::Seconds(s) => Some(*s),
                _ => None,
            })
            .sum()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn record(&mut self, key: &str, value: DiagnosticValue) {
        self.entries.push((key.to_owned(), value));
    }
}

/// Engine-side handle that times stages and forwards entries to a sink.
pub(crate) struct StageReporter<'a> {
    engine: &'static str,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> StageReporter<'a> {
    pub(crate) fn new(engine: &'static str, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { engine, sink }
    }

    /// Runs `f`, recording its wall time under `key`.
    pub(crate) fn time<R>(&mut self, key: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        let seconds = start.elapsed().as_secs_f64();
        tracing::debug!(engine = self.engine, key, seconds, "stage finished");
        self.sink.record(key, DiagnosticValue::Seconds(seconds));
        result
    }

    /// Records a count under `key`.
    pub(crate) fn count(&mut self, key: &str, value: usize) {
        tracing::debug!(engine = self.engine, key, value, "count");
        self.sink
            .record(key, DiagnosticValue::Count(u64::try_from(value).unwrap_or(u64::MAX)));
    }
}
