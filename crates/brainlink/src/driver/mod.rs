// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session state machine. `Driver::next` is the single entry point:
//! pure with respect to `(state, incoming)` aside from the mutations it
//! delegates to the [`SimulatorAdapter`] it owns, matching the component's
//! "state machine as data" design — training and prediction share this
//! shell and differ only in [`training`]/[`prediction`]'s table.

pub mod prediction;
pub mod training;

use crate::adapter::SimulatorAdapter;
use crate::error::{Error, Result};
use crate::wire::message::{ServerPayload, ServerToSimulator, SimulatorToServer};

/// Session driver state. Monotonic forward; `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Unregistered,
    Registering,
    Active,
    Finished,
}

impl DriverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Which of the two wire-compatible but behaviorally distinct session
/// kinds this driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Training,
    Prediction,
}

/// Drives one session's wire-protocol state machine.
pub struct Driver {
    state: DriverState,
    mode: Mode,
    adapter: SimulatorAdapter,
}

impl Driver {
    pub fn new(mode: Mode, adapter: SimulatorAdapter) -> Self {
        Self { state: DriverState::Unregistered, mode, adapter }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn adapter(&self) -> &SimulatorAdapter {
        &self.adapter
    }

    /// Advances the state machine by one tick. `incoming` is `None` only on
    /// the very first call, which always produces the initial REGISTER.
    pub fn next(&mut self, incoming: Option<&ServerToSimulator>) -> Result<Option<SimulatorToServer>> {
        match self.state {
            DriverState::Finished => Ok(None),

            DriverState::Unregistered => {
                self.state = DriverState::Registering;
                Ok(Some(self.adapter.generate_register_message()))
            }

            DriverState::Registering => {
                let incoming = incoming.ok_or(Error::EmptyMessage { expected: "ACKNOWLEDGE_REGISTER" })?;
                let ack = match &incoming.payload {
                    ServerPayload::AcknowledgeRegister(data) => data,
                    other => {
                        return Err(Error::UnexpectedMessage {
                            expected: "ACKNOWLEDGE_REGISTER".to_string(),
                            got: other.kind().to_string(),
                        })
                    }
                };
                self.adapter.handle_register_acknowledgement(ack)?;
                self.state = DriverState::Active;
                match self.mode {
                    Mode::Training => training::handle_registered(&mut self.adapter),
                    Mode::Prediction => prediction::handle_registered(&mut self.adapter),
                }
            }

            DriverState::Active => {
                let incoming = incoming.ok_or(Error::EmptyMessage { expected: "a server message" })?;
                let outgoing = match self.mode {
                    Mode::Training => training::handle_active(&mut self.adapter, incoming)?,
                    Mode::Prediction => prediction::handle_active(&mut self.adapter, incoming)?,
                };
                if matches!(incoming.payload, ServerPayload::Finished) {
                    self.state = DriverState::Finished;
                }
                Ok(outgoing)
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
