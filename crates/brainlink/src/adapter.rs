// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the wire protocol's descriptor-driven messages to a
//! [`Simulator`] implementation: binds schemas, decodes dynamic payloads
//! into mappings, and projects simulator state back onto the wire.

use crate::error::{Error, Result};
use crate::schema::binder::{Binder, SchemaHandle};
use crate::state::{project, read};
use crate::wire::message::{
    AcknowledgeRegisterData, PredictionEntry, SetPropertiesData, SimulatorToServer, StateEntry,
};

use crate::simulator::Simulator;

/// Adapts a [`Simulator`] implementation to the wire protocol: owns the
/// session id and every bound schema for its connection.
pub struct SimulatorAdapter {
    simulator_name: String,
    simulator: Box<dyn Simulator>,
    binder: std::sync::Arc<Binder>,
    session_id: Option<u64>,
    properties_schema: Option<SchemaHandle>,
    state_schema: Option<SchemaHandle>,
    prediction_schema: Option<SchemaHandle>,
    current_reward_name: Option<String>,
    last_state_terminal: bool,
}

impl SimulatorAdapter {
    pub fn new(simulator_name: impl Into<String>, simulator: Box<dyn Simulator>, binder: std::sync::Arc<Binder>) -> Self {
        Self {
            simulator_name: simulator_name.into(),
            simulator,
            binder,
            session_id: None,
            properties_schema: None,
            state_schema: None,
            prediction_schema: None,
            current_reward_name: None,
            last_state_terminal: false,
        }
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session_id
    }

    pub fn generate_register_message(&self) -> SimulatorToServer {
        SimulatorToServer::register(self.simulator_name.clone())
    }

    pub fn generate_ready_message(&self) -> Result<SimulatorToServer> {
        let session_id = self.require_session_id()?;
        Ok(SimulatorToServer::ready(session_id))
    }

    pub fn handle_register_acknowledgement(&mut self, ack: &AcknowledgeRegisterData) -> Result<()> {
        self.properties_schema = Some(self.binder.bind(&ack.properties_schema)?);
        self.state_schema = Some(self.binder.bind(&ack.output_schema)?);
        self.prediction_schema = Some(self.binder.bind(&ack.prediction_schema)?);
        self.session_id = Some(ack.sim_id);
        Ok(())
    }

    pub fn handle_set_properties_message(&mut self, data: &SetPropertiesData) -> Result<()> {
        let properties_schema = self.schema_or_err(&self.properties_schema, "properties_schema")?;
        let properties = read(&properties_schema, &data.dynamic_properties)?;
        self.simulator.set_properties(&properties);
        self.current_reward_name = data.reward_name.clone();
        self.prediction_schema = Some(self.binder.bind(&data.prediction_schema)?);
        Ok(())
    }

    pub fn handle_start(&mut self) {
        self.simulator.start();
    }

    pub fn handle_stop(&mut self) {
        self.simulator.stop();
    }

    pub fn handle_reset(&mut self) {
        self.simulator.reset();
        self.last_state_terminal = false;
    }

    pub fn handle_finish(&mut self) {
        self.simulator.stop();
    }

    pub fn handle_prediction_message(&mut self, entry: &PredictionEntry) -> Result<()> {
        let prediction_schema = self.schema_or_err(&self.prediction_schema, "prediction_schema")?;
        let prediction = read(&prediction_schema, &entry.dynamic_prediction)?;
        self.simulator.notify_prediction(prediction);
        Ok(())
    }

    /// Applies the terminal-handling redesign: a terminal state observed on
    /// the previous `STATE` forces a `reset` before the next `advance`.
    pub fn advance(&mut self) {
        if self.last_state_terminal {
            self.simulator.reset();
        }
        if let Some(action) = self.simulator.get_last_action().cloned() {
            self.simulator.advance(&action);
        }
    }

    /// Builds one `state_data` entry from the simulator's current state,
    /// recording whether it's terminal for the next `advance` call.
    pub fn build_state_entry(&mut self) -> Result<StateEntry> {
        let state_schema = self.schema_or_err(&self.state_schema, "state_schema")?;
        let sim_state = self.simulator.get_state();

        let reward = match &self.current_reward_name {
            Some(name) => self.simulator.reward(name).unwrap_or(0.0),
            None => 0.0,
        };

        let state = project(&state_schema, &sim_state.state)?;
        let action_taken = match self.simulator.get_last_action() {
            Some(action) => {
                let prediction_schema = self.schema_or_err(&self.prediction_schema, "prediction_schema")?;
                Some(project(&prediction_schema, action)?)
            }
            None => None,
        };

        self.last_state_terminal = sim_state.is_terminal;

        Ok(StateEntry { state, reward, terminal: sim_state.is_terminal, action_taken })
    }

    /// Wraps one or more `state_data` entries (accumulated across a
    /// PREDICTION batch) into a single outgoing STATE message.
    pub fn generate_state_message(&self, entries: Vec<StateEntry>) -> Result<SimulatorToServer> {
        if entries.is_empty() {
            return Err(Error::MalformedMessage { field: "state_data", message: "STATE" });
        }
        let session_id = self.require_session_id()?;
        Ok(SimulatorToServer::state(session_id, entries))
    }

    fn require_session_id(&self) -> Result<u64> {
        self.session_id.ok_or(Error::MalformedMessage { field: "session_id", message: "SimulatorToServer" })
    }

    fn schema_or_err(&self, handle: &Option<SchemaHandle>, field: &'static str) -> Result<SchemaHandle> {
        handle
            .clone()
            .ok_or(Error::MalformedMessage { field, message: "schema not bound before use" })
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
