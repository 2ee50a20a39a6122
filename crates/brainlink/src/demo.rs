// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal reference [`Simulator`] — the classic cart-pole balancing
//! task — so the `[[bin]]` target has something concrete to drive. Real
//! consumers supply their own `Simulator`; this one exists only to exercise
//! the crate end to end.

use crate::simulator::{RewardTable, SimState, Simulator};
use crate::state::value::{SimMapping, SimValue};

const GRAVITY: f64 = 9.8;
const CART_MASS: f64 = 1.0;
const POLE_MASS: f64 = 0.1;
const TOTAL_MASS: f64 = CART_MASS + POLE_MASS;
const POLE_HALF_LENGTH: f64 = 0.5;
const FORCE_MAGNITUDE: f64 = 10.0;
const TIME_STEP: f64 = 0.02;
const ANGLE_LIMIT_RADIANS: f64 = 12.0 * std::f64::consts::PI / 180.0;
const POSITION_LIMIT: f64 = 2.4;

/// The upright cart-pole balancing task: push the cart left or right to
/// keep the pole from tipping past `ANGLE_LIMIT_RADIANS` or running the
/// cart off the track.
pub struct CartPole {
    position: f64,
    velocity: f64,
    angle: f64,
    angular_velocity: f64,
    last_action: Option<SimMapping>,
    steps: u32,
    rewards: RewardTable,
}

impl Default for CartPole {
    fn default() -> Self {
        let mut rewards = RewardTable::new();
        rewards.register("upright", || 1.0);
        Self {
            position: 0.0,
            velocity: 0.0,
            angle: 0.02,
            angular_velocity: 0.0,
            last_action: None,
            steps: 0,
            rewards,
        }
    }
}

impl CartPole {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_terminal(&self) -> bool {
        self.position.abs() > POSITION_LIMIT || self.angle.abs() > ANGLE_LIMIT_RADIANS
    }
}

impl Simulator for CartPole {
    fn set_properties(&mut self, properties: &SimMapping) {
        if let Some(angle) = properties.get("initial_angle").and_then(SimValue::as_f64) {
            self.angle = angle;
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn get_last_action(&self) -> Option<&SimMapping> {
        self.last_action.as_ref()
    }

    fn notify_prediction(&mut self, prediction: SimMapping) {
        self.last_action = Some(prediction);
    }

    fn advance(&mut self, action: &SimMapping) {
        let command = action.get("command").and_then(SimValue::as_i64).unwrap_or(0);
        let force = if command > 0 { FORCE_MAGNITUDE } else { -FORCE_MAGNITUDE };

        let cos_angle = self.angle.cos();
        let sin_angle = self.angle.sin();
        let pole_mass_length = POLE_MASS * POLE_HALF_LENGTH;

        let temp = (force + pole_mass_length * self.angular_velocity.powi(2) * sin_angle) / TOTAL_MASS;
        let angular_acceleration = (GRAVITY * sin_angle - cos_angle * temp)
            / (POLE_HALF_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_angle.powi(2) / TOTAL_MASS));
        let acceleration = temp - pole_mass_length * angular_acceleration * cos_angle / TOTAL_MASS;

        self.position += TIME_STEP * self.velocity;
        self.velocity += TIME_STEP * acceleration;
        self.angle += TIME_STEP * self.angular_velocity;
        self.angular_velocity += TIME_STEP * angular_acceleration;
        self.steps += 1;
    }

    fn get_state(&self) -> SimState {
        let mut state = SimMapping::new();
        state.insert("position".to_string(), SimValue::Float(self.position));
        state.insert("velocity".to_string(), SimValue::Float(self.velocity));
        state.insert("angle".to_string(), SimValue::Float(self.angle));
        state.insert("angular_velocity".to_string(), SimValue::Float(self.angular_velocity));
        state.insert("steps".to_string(), SimValue::Int(self.steps.into()));
        SimState::new(state, self.is_terminal())
    }

    fn reward(&self, name: &str) -> Option<f64> {
        self.rewards.get(name)
    }
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;
