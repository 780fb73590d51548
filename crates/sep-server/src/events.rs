//! Append-only JSONL event log for offline analysis.
//!
//! One JSON object per line: conflicts detected, commands issued, aircraft
//! removed. Nothing in the core reads this back.

use chrono::{DateTime, Utc};
use sep_core::models::{Command, ConflictRecord};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ConflictDetected {
        t: DateTime<Utc>,
        #[serde(flatten)]
        conflict: ConflictRecord,
    },
    CommandIssued {
        t: DateTime<Utc>,
        command: Command,
    },
    AircraftRemoved {
        t: DateTime<Utc>,
        callsign: String,
    },
}

pub struct EventLog {
    writer: Mutex<BufWriter<File>>,
}

impl EventLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Write one event. Log failures are reported but never stall the
    /// decision loop.
    pub fn record(&self, event: &Event) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("failed to serialize event: {e}");
                return;
            }
        };
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            tracing::error!("failed to write event log: {e}");
        }
    }
}
