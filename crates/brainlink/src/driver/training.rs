// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ACTIVE-state table for a training session (spec's training state table).

use crate::adapter::SimulatorAdapter;
use crate::error::{Error, Result};
use crate::wire::message::{ServerPayload, ServerToSimulator, SimulatorToServer};

pub(super) fn handle_registered(adapter: &mut SimulatorAdapter) -> Result<Option<SimulatorToServer>> {
    Ok(Some(adapter.generate_ready_message()?))
}

pub(super) fn handle_active(
    adapter: &mut SimulatorAdapter,
    incoming: &ServerToSimulator,
) -> Result<Option<SimulatorToServer>> {
    match &incoming.payload {
        ServerPayload::SetProperties(data) => {
            adapter.handle_set_properties_message(data)?;
            Ok(Some(adapter.generate_ready_message()?))
        }
        ServerPayload::Start => {
            adapter.handle_start();
            let entry = adapter.build_state_entry()?;
            Ok(Some(adapter.generate_state_message(vec![entry])?))
        }
        ServerPayload::Stop => {
            adapter.handle_stop();
            Ok(Some(adapter.generate_ready_message()?))
        }
        ServerPayload::Prediction(entries) => {
            let mut state_entries = Vec::with_capacity(entries.len());
            for entry in entries {
                adapter.handle_prediction_message(entry)?;
                adapter.advance();
                state_entries.push(adapter.build_state_entry()?);
            }
            Ok(Some(adapter.generate_state_message(state_entries)?))
        }
        ServerPayload::Reset => {
            adapter.handle_reset();
            Ok(Some(adapter.generate_ready_message()?))
        }
        ServerPayload::Finished => {
            adapter.handle_finish();
            Ok(None)
        }
        other => Err(Error::UnexpectedMessage {
            expected: "a valid ACTIVE-state training message".to_string(),
            got: other.kind().to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "training_tests.rs"]
mod tests;
