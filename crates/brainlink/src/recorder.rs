// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-producer / single-consumer transcript writer. The transport loop
//! enqueues a `SEND`/`RECV` token paired with either a one-line textual
//! rendering of the message or `None`; a sentinel flushes the file and
//! ends the writer task. Decoupled from the session loop by a bounded
//! channel so a slow disk never stalls the wire protocol for more than one
//! channel-full pause (spec.md §5's "bounded queue").

use std::io::Write;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::wire::message::{ServerToSimulator, SimulatorToServer};

/// Capacity chosen to comfortably exceed one in-flight SEND/RECV exchange
/// pair; spec.md doesn't mandate a numeric bound.
const QUEUE_CAPACITY: usize = 256;

/// Which side originated a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Recv,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::Recv => "RECV",
        }
    }
}

/// One entry handed to the recorder: a direction plus an optional rendered
/// message (`None` records the literal `None` line).
#[derive(Debug)]
enum Entry {
    Pair { direction: Direction, line: Option<String> },
    Sentinel,
}

/// Producer handle. Cheap to clone; every send is fire-and-forget from the
/// transport loop's perspective — a full queue applies backpressure rather
/// than dropping entries.
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<Entry>,
}

impl RecorderHandle {
    /// Record a message received from the server.
    pub async fn record_recv(&self, msg: Option<&ServerToSimulator>) {
        let line = msg.map(render_server_to_simulator);
        let _ = self.tx.send(Entry::Pair { direction: Direction::Recv, line }).await;
    }

    /// Record a message sent to the server.
    pub async fn record_send(&self, msg: Option<&SimulatorToServer>) {
        let line = msg.map(render_simulator_to_server);
        let _ = self.tx.send(Entry::Pair { direction: Direction::Send, line }).await;
    }

    /// Enqueue the sentinel: the writer task flushes and exits after
    /// draining everything queued ahead of it.
    pub async fn close(&self) {
        let _ = self.tx.send(Entry::Sentinel).await;
    }
}

fn render_server_to_simulator(msg: &ServerToSimulator) -> String {
    format!("{msg:?}")
}

fn render_simulator_to_server(msg: &SimulatorToServer) -> String {
    format!("{msg:?}")
}

/// Spawn the recorder task, returning the producer handle and its join
/// handle. `path` is the recording file to (re)create.
pub fn spawn(path: PathBuf) -> (RecorderHandle, JoinHandle<std::io::Result<()>>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let handle = tokio::task::spawn_blocking(move || run(path, rx));
    (RecorderHandle { tx }, handle)
}

/// The writer loop: single consumer, plain blocking file I/O since this
/// runs on a `spawn_blocking` thread rather than the async reactor.
fn run(path: PathBuf, mut rx: mpsc::Receiver<Entry>) -> std::io::Result<()> {
    let mut file = std::fs::File::create(&path)?;
    while let Some(entry) = rx.blocking_recv() {
        match entry {
            Entry::Pair { direction, line } => {
                writeln!(file, "{}", direction.as_str())?;
                match line {
                    Some(text) => writeln!(file, "{text}")?,
                    None => writeln!(file, "None")?,
                }
            }
            Entry::Sentinel => break,
        }
    }
    file.flush()
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
