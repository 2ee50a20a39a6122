// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use super::super::*;
use crate::adapter::SimulatorAdapter;
use crate::error::Error;
use crate::schema::binder::Binder;
use crate::simulator::{SimState, Simulator};
use crate::state::value::{SimMapping, SimValue};
use crate::wire::descriptor::{Descriptor, FieldDescriptor, FieldType};
use crate::wire::message::{
    AcknowledgeRegisterData, PredictionEntry, ServerPayload, ServerToSimulator, SetPropertiesData, SimulatorPayload,
};

struct CountingSimulator {
    last_action: Option<SimMapping>,
    terminal: Arc<AtomicBool>,
    reset_calls: Arc<AtomicU32>,
}

impl Simulator for CountingSimulator {
    fn get_last_action(&self) -> Option<&SimMapping> {
        self.last_action.as_ref()
    }

    fn notify_prediction(&mut self, prediction: SimMapping) {
        self.last_action = Some(prediction);
    }

    fn advance(&mut self, _action: &SimMapping) {}

    fn reset(&mut self) {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn get_state(&self) -> SimState {
        let mut state = SimMapping::new();
        state.insert("a".to_string(), SimValue::Int(1));
        SimState::new(state, self.terminal.load(Ordering::SeqCst))
    }

    fn reward(&self, name: &str) -> Option<f64> {
        (name == "r").then_some(9.0)
    }
}

fn field(name: &str, number: u32, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor::new(name, number, ty)
}

fn prediction_descriptor() -> Descriptor {
    Descriptor::new("Prediction", vec![field("b", 1, FieldType::Float32)])
}

fn ack(sim_id: u64) -> ServerToSimulator {
    ServerToSimulator {
        payload: ServerPayload::AcknowledgeRegister(AcknowledgeRegisterData {
            sim_id,
            properties_schema: Descriptor::new("Properties", vec![]),
            output_schema: Descriptor::new("State", vec![field("a", 1, FieldType::Int32)]),
            prediction_schema: prediction_descriptor(),
        }),
    }
}

fn new_active_driver() -> (Driver, Arc<AtomicBool>, Arc<AtomicU32>) {
    let terminal = Arc::new(AtomicBool::new(false));
    let reset_calls = Arc::new(AtomicU32::new(0));
    let simulator =
        CountingSimulator { last_action: None, terminal: Arc::clone(&terminal), reset_calls: Arc::clone(&reset_calls) };
    let adapter = SimulatorAdapter::new("cartpole", Box::new(simulator), Arc::new(Binder::new()));
    let mut driver = Driver::new(Mode::Training, adapter);
    driver.next(None).unwrap();
    driver.next(Some(&ack(1))).unwrap();
    (driver, terminal, reset_calls)
}

#[test]
fn set_properties_binds_reward_name_and_returns_ready() {
    let (mut driver, ..) = new_active_driver();
    let msg = ServerToSimulator {
        payload: ServerPayload::SetProperties(SetPropertiesData {
            dynamic_properties: vec![],
            reward_name: Some("r".to_string()),
            prediction_schema: prediction_descriptor(),
        }),
    };
    let out = driver.next(Some(&msg)).unwrap().unwrap();
    assert!(matches!(out.payload, SimulatorPayload::Ready));
}

#[test]
fn start_emits_one_state_entry() {
    let (mut driver, ..) = new_active_driver();
    let out = driver.next(Some(&ServerToSimulator { payload: ServerPayload::Start })).unwrap().unwrap();
    match out.payload {
        SimulatorPayload::State(entries) => assert_eq!(entries.len(), 1),
        other => panic!("expected State, got {other:?}"),
    }
}

#[test]
fn prediction_batch_aggregates_into_a_single_state_message() {
    let (mut driver, ..) = new_active_driver();
    let entries = vec![
        PredictionEntry { dynamic_prediction: 0.1f32.to_le_bytes().to_vec() },
        PredictionEntry { dynamic_prediction: 0.2f32.to_le_bytes().to_vec() },
        PredictionEntry { dynamic_prediction: 0.3f32.to_le_bytes().to_vec() },
    ];
    let msg = ServerToSimulator { payload: ServerPayload::Prediction(entries) };
    let out = driver.next(Some(&msg)).unwrap().unwrap();
    match out.payload {
        SimulatorPayload::State(state_entries) => assert_eq!(state_entries.len(), 3),
        other => panic!("expected State, got {other:?}"),
    }
}

#[test]
fn terminal_state_triggers_reset_on_next_prediction() {
    let (mut driver, terminal, reset_calls) = new_active_driver();
    driver.next(Some(&ServerToSimulator { payload: ServerPayload::Start })).unwrap();
    terminal.store(true, Ordering::SeqCst);

    let msg = ServerToSimulator {
        payload: ServerPayload::Prediction(vec![PredictionEntry { dynamic_prediction: 0.5f32.to_le_bytes().to_vec() }]),
    };
    driver.next(Some(&msg)).unwrap();
    assert_eq!(reset_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn reset_message_returns_ready() {
    let (mut driver, ..) = new_active_driver();
    let out = driver.next(Some(&ServerToSimulator { payload: ServerPayload::Reset })).unwrap().unwrap();
    assert!(matches!(out.payload, SimulatorPayload::Ready));
}

#[test]
fn finished_message_ends_the_session_with_no_outgoing() {
    let (mut driver, ..) = new_active_driver();
    let out = driver.next(Some(&ServerToSimulator { payload: ServerPayload::Finished })).unwrap();
    assert!(out.is_none());
    assert_eq!(driver.state(), DriverState::Finished);
}

#[test]
fn unexpected_active_message_does_not_transition() {
    let (mut driver, ..) = new_active_driver();
    let err = driver.next(Some(&ack(2))).unwrap_err();
    assert!(matches!(err, Error::UnexpectedMessage { .. }));
    assert_eq!(driver.state(), DriverState::Active);
}
