// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ACTIVE-state table for a prediction session: only `PREDICTION -> STATE`,
//! and the registration-ack produces an initial STATE rather than READY.

use crate::adapter::SimulatorAdapter;
use crate::error::{Error, Result};
use crate::wire::message::{ServerPayload, ServerToSimulator, SimulatorToServer};

pub(super) fn handle_registered(adapter: &mut SimulatorAdapter) -> Result<Option<SimulatorToServer>> {
    let entry = adapter.build_state_entry()?;
    Ok(Some(adapter.generate_state_message(vec![entry])?))
}

pub(super) fn handle_active(
    adapter: &mut SimulatorAdapter,
    incoming: &ServerToSimulator,
) -> Result<Option<SimulatorToServer>> {
    match &incoming.payload {
        ServerPayload::Prediction(entries) => {
            let mut state_entries = Vec::with_capacity(entries.len());
            for entry in entries {
                adapter.handle_prediction_message(entry)?;
                adapter.advance();
                state_entries.push(adapter.build_state_entry()?);
            }
            Ok(Some(adapter.generate_state_message(state_entries)?))
        }
        other => Err(Error::UnexpectedMessage { expected: "PREDICTION".to_string(), got: other.kind().to_string() }),
    }
}

#[cfg(test)]
#[path = "prediction_tests.rs"]
mod tests;
