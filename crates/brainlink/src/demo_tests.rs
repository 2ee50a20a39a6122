// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn action(command: i64) -> SimMapping {
    let mut action = SimMapping::new();
    action.insert("command".to_string(), SimValue::Int(command));
    action
}

#[test]
fn starts_upright_and_not_terminal() {
    let sim = CartPole::new();
    let state = sim.get_state();
    assert!(!state.is_terminal);
    assert_eq!(state.state.get("steps"), Some(&SimValue::Int(0)));
}

#[test]
fn advance_increments_step_count_and_moves_the_cart() {
    let mut sim = CartPole::new();
    sim.advance(&action(1));
    let state = sim.get_state();
    assert_eq!(state.state.get("steps"), Some(&SimValue::Int(1)));
    assert_ne!(state.state.get("velocity"), Some(&SimValue::Float(0.0)));
}

#[test]
fn falling_past_the_angle_limit_is_terminal() {
    let mut sim = CartPole::new();
    for _ in 0..500 {
        sim.advance(&action(1));
        if sim.get_state().is_terminal {
            break;
        }
    }
    assert!(sim.get_state().is_terminal);
}

#[test]
fn reset_restores_the_initial_state() {
    let mut sim = CartPole::new();
    sim.advance(&action(1));
    sim.reset();
    let state = sim.get_state();
    assert_eq!(state.state.get("steps"), Some(&SimValue::Int(0)));
}

#[test]
fn set_properties_overrides_the_initial_angle() {
    let mut sim = CartPole::new();
    let mut properties = SimMapping::new();
    properties.insert("initial_angle".to_string(), SimValue::Float(0.1));
    sim.set_properties(&properties);
    assert_eq!(sim.get_state().state.get("angle"), Some(&SimValue::Float(0.1)));
}

#[test]
fn upright_reward_is_registered() {
    let sim = CartPole::new();
    assert_eq!(sim.reward("upright"), Some(1.0));
    assert_eq!(sim.reward("unknown"), None);
}
