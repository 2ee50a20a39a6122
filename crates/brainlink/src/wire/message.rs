// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two top-level discriminated unions exchanged over the wire.

use super::descriptor::Descriptor;

/// A message sent from the server to the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerToSimulator {
    pub payload: ServerPayload,
}

/// The variant-specific payload of a [`ServerToSimulator`] message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPayload {
    AcknowledgeRegister(AcknowledgeRegisterData),
    SetProperties(SetPropertiesData),
    Start,
    Stop,
    Prediction(Vec<PredictionEntry>),
    Reset,
    Finished,
}

impl ServerPayload {
    /// Wire-level name, used in error messages and the recorder's textual
    /// trace.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AcknowledgeRegister(_) => "ACKNOWLEDGE_REGISTER",
            Self::SetProperties(_) => "SET_PROPERTIES",
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Prediction(_) => "PREDICTION",
            Self::Reset => "RESET",
            Self::Finished => "FINISHED",
        }
    }
}

/// Data attached to an `ACKNOWLEDGE_REGISTER` message: the three schemas the
/// simulator must bind before it can serialize properties, state, or
/// predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct AcknowledgeRegisterData {
    pub sim_id: u64,
    pub properties_schema: Descriptor,
    pub output_schema: Descriptor,
    pub prediction_schema: Descriptor,
}

/// Data attached to a `SET_PROPERTIES` message.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPropertiesData {
    /// Serialized properties payload, conforming to the bound properties
    /// schema.
    pub dynamic_properties: Vec<u8>,
    pub reward_name: Option<String>,
    /// The prediction schema is re-bound at every `SET_PROPERTIES` — a
    /// concept switch may change the prediction shape (see spec Open
    /// Question, resolved in favor of always re-binding).
    pub prediction_schema: Descriptor,
}

/// One entry of a (possibly batched) `PREDICTION` message.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionEntry {
    pub dynamic_prediction: Vec<u8>,
}

/// A message sent from the simulator to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorToServer {
    /// Absent until registration completes; present (echoed) on every
    /// message after that.
    pub session_id: Option<u64>,
    pub payload: SimulatorPayload,
}

/// The variant-specific payload of a [`SimulatorToServer`] message.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorPayload {
    Register(RegisterData),
    Ready,
    State(Vec<StateEntry>),
}

impl SimulatorPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register(_) => "REGISTER",
            Self::Ready => "READY",
            Self::State(_) => "STATE",
        }
    }
}

/// Data attached to a `REGISTER` message.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterData {
    pub simulator_name: String,
}

/// One entry of a (possibly batched) `STATE` message.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry {
    /// Serialized state payload, conforming to the bound state schema.
    pub state: Vec<u8>,
    pub reward: f64,
    pub terminal: bool,
    /// Serialized last-action payload, conforming to the bound prediction
    /// schema. Absent until the first prediction has been handled.
    pub action_taken: Option<Vec<u8>>,
}

impl SimulatorToServer {
    pub fn register(simulator_name: impl Into<String>) -> Self {
        Self {
            session_id: None,
            payload: SimulatorPayload::Register(RegisterData { simulator_name: simulator_name.into() }),
        }
    }

    pub fn ready(session_id: u64) -> Self {
        Self { session_id: Some(session_id), payload: SimulatorPayload::Ready }
    }

    pub fn state(session_id: u64, entries: Vec<StateEntry>) -> Self {
        Self { session_id: Some(session_id), payload: SimulatorPayload::State(entries) }
    }
}
