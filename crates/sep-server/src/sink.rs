//! Fire-and-forget command output.
//!
//! The decision loop hands commands to a bounded channel and moves on;
//! delivery latency and retry policy belong to the transport behind the
//! receiver, never to the engine. A full or closed channel drops the
//! command with a warning.

use sep_core::models::Command;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct CommandSink {
    tx: mpsc::Sender<Command>,
}

impl CommandSink {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Non-blocking dispatch; the caller never observes acknowledgement.
    pub fn dispatch(&self, command: Command) {
        if let Err(e) = self.tx.try_send(command) {
            tracing::warn!("command sink unavailable, dropping command: {e}");
        }
    }
}

/// Drain commands to stdout as JSONL, one instruction per line.
pub async fn run_stdout_writer(mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match serde_json::to_string(&command) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!("failed to serialize command: {e}"),
        }
    }
}
