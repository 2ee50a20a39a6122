// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires a resolved [`crate::config::ResolvedConfig`] and a caller-supplied
//! [`Simulator`] into a running [`Driver`] pumped by [`crate::transport`],
//! optionally recording the session. This is the seam a binary (or an
//! embedding application) calls into — the simulator itself stays external
//! per spec.md's scope.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::adapter::SimulatorAdapter;
use crate::config::ResolvedConfig;
use crate::driver::Driver;
use crate::recorder;
use crate::schema::binder::Binder;
use crate::simulator::Simulator;
use crate::transport;

/// Runs one session end to end: connect, register, and pump the wire
/// protocol until the driver finishes or the connection ends.
///
/// `binder` is shared across sessions so identically-shaped descriptors
/// memoize to the same [`crate::schema::binder::SchemaHandle`] regardless
/// of which session first bound them (spec.md §5's shared schema cache).
///
/// Returns `anyhow::Result` at this outer boundary the way `coop::run::run`
/// does; every collaborator underneath returns the crate's own
/// [`crate::error::Error`].
pub async fn run(
    resolved: ResolvedConfig,
    simulator_name: impl Into<String>,
    simulator: Box<dyn Simulator>,
    binder: Arc<Binder>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let adapter = SimulatorAdapter::new(simulator_name, simulator, binder);
    let driver = Driver::new(resolved.mode, adapter);

    let (recorder_handle, writer_join) = match &resolved.recording_file {
        Some(path) => {
            let (handle, join) = recorder::spawn(path.clone());
            (Some(handle), Some(join))
        }
        None => (None, None),
    };

    let result = transport::run(driver, &resolved.url, &resolved.access_key, recorder_handle, cancel)
        .await
        .map_err(anyhow::Error::from);

    // The sentinel is already enqueued by `transport::run` on every exit
    // path; joining here guarantees the file is flushed before this
    // function returns, regardless of whether the session succeeded.
    if let Some(join) = writer_join {
        match join.await {
            Ok(Err(io_err)) => warn!(err = %io_err, "recorder writer failed"),
            Err(join_err) => warn!(err = %join_err, "recorder writer task panicked"),
            Ok(Ok(())) => {}
        }
    }

    result
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
