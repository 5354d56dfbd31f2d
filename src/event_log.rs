//! Time-windowed event log with best-effort persistence
//!
//! Confirmed detection events are appended here, pruned by age on every
//! write, and mirrored to a durable store after each successful append.
//! The in-memory log is authoritative for the session; persistence failures
//! are logged and swallowed.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::error::DetectorError;
use crate::types::DetectionEvent;

/// Default retention horizon: 60 minutes
pub const DEFAULT_RETENTION_MS: i64 = 60 * 60 * 1000;

/// Durable storage boundary for the event log.
///
/// Implementations persist the full pruned log as a single serializable
/// array under one named key (a file path, a browser storage key, ...).
pub trait EventStore {
    fn load(&self) -> Result<Vec<DetectionEvent>, DetectorError>;
    fn save(&self, events: &[DetectionEvent]) -> Result<(), DetectorError>;
}

/// JSON-file-backed store: the whole log is one JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventStore for JsonFileStore {
    fn load(&self) -> Result<Vec<DetectionEvent>, DetectorError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, events: &[DetectionEvent]) -> Result<(), DetectorError> {
        let json = serde_json::to_string(events)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Append-only, age-pruned log of confirmed detection events
pub struct EventLog {
    events: Vec<DetectionEvent>,
    retention_ms: i64,
    store: Option<Box<dyn EventStore>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::in_memory(DEFAULT_RETENTION_MS)
    }
}

impl EventLog {
    /// A log with no persistence (tests, ephemeral sessions)
    pub fn in_memory(retention_ms: i64) -> Self {
        Self {
            events: Vec::new(),
            retention_ms,
            store: None,
        }
    }

    /// A persisted log, seeded from the store's prior state.
    ///
    /// Missing or undecodable prior state falls back to an empty log; the
    /// session proceeds either way.
    pub fn load_or_default(store: Box<dyn EventStore>, retention_ms: i64) -> Self {
        let events = match store.load() {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "event log load failed, starting empty");
                Vec::new()
            }
        };

        Self {
            events,
            retention_ms,
            store: Some(store),
        }
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_ms
    }

    /// Append one event, pruning entries older than the retention horizon
    /// first, then mirror the pruned log to the store (best effort).
    ///
    /// Insertion-order timestamps stay monotonically non-decreasing: an
    /// out-of-order timestamp is clamped up to the current tail's.
    pub fn append(&mut self, mut event: DetectionEvent, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        self.events.retain(|stored| stored.timestamp >= cutoff);

        if let Some(tail) = self.events.last() {
            if event.timestamp < tail.timestamp {
                event.timestamp = tail.timestamp;
            }
        }
        self.events.push(event);

        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.events) {
                warn!(error = %err, "event log persistence failed, keeping in-memory log");
            }
        }
    }

    /// Events with `timestamp >= since_ms`, in insertion order.
    ///
    /// Does not mutate stored state; entries already pruned by an append are
    /// never returned.
    pub fn query(&self, since_ms: i64) -> Vec<DetectionEvent> {
        self.events
            .iter()
            .filter(|event| event.timestamp >= since_ms)
            .copied()
            .collect()
    }

    /// The full pruned log, for the presentation layer
    pub fn events(&self) -> &[DetectionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
