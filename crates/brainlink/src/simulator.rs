// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The callback surface a client implements to drive a simulation, and the
//! `Generator` placeholder left for a future non-simulator driver.

use std::collections::HashMap;

use crate::state::value::SimMapping;

/// A single reported simulation state: the field mapping plus whether this
/// is a terminal state of the episode.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub state: SimMapping,
    pub is_terminal: bool,
}

impl SimState {
    pub fn new(state: SimMapping, is_terminal: bool) -> Self {
        Self { state, is_terminal }
    }
}

/// Interface a client implements to drive a training or prediction session.
///
/// Implementations must provide `advance` and `get_state`; the rest carry
/// no-op defaults matching the reference simulator base class. Named
/// rewards are looked up through [`Simulator::reward`] rather than
/// reflection — see [`RewardTable`] for a registration-based helper.
pub trait Simulator: Send {
    /// Assigns per-episode parameters decoded from a `SET_PROPERTIES`
    /// message.
    fn set_properties(&mut self, _properties: &SimMapping) {}

    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn reset(&mut self) {}

    /// The most recently delivered action, re-read when composing a state
    /// message so the backend can see which action produced it.
    fn get_last_action(&self) -> Option<&SimMapping>;

    /// Records the decoded prediction before it's passed to `advance`.
    fn notify_prediction(&mut self, prediction: SimMapping);

    /// Advances the simulation using the last-notified action.
    fn advance(&mut self, action: &SimMapping);

    /// Builds the state message for the simulation's current state.
    fn get_state(&self) -> SimState;

    /// Looks up a named reward, if one is bound for the current episode.
    /// Returns `None` when no reward with that name is registered.
    fn reward(&self, name: &str) -> Option<f64>;
}

/// Registration-based reward accessor for simulators that don't want to
/// hand-write a `match` in [`Simulator::reward`]: register named reward
/// closures once, then delegate `reward` to [`RewardTable::get`].
#[derive(Default)]
pub struct RewardTable {
    rewards: HashMap<String, Box<dyn Fn() -> f64 + Send>>,
}

impl RewardTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, reward: impl Fn() -> f64 + Send + 'static) {
        self.rewards.insert(name.into(), Box::new(reward));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.rewards.get(name).map(|f| f())
    }
}

/// Placeholder for a non-simulator driver surface. The upstream reference
/// implementation ships this as an unimplemented stub; this trait exists
/// so the module map is complete, but no driver wiring is provided for it.
pub trait Generator: Send {
    fn generate(&mut self, inputs: &SimMapping) -> SimMapping;
}

#[cfg(test)]
#[path = "simulator_tests.rs"]
mod tests;
