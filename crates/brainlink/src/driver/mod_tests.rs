// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::adapter::SimulatorAdapter;
use crate::schema::binder::Binder;
use crate::simulator::{SimState, Simulator};
use crate::state::value::{SimMapping, SimValue};
use crate::wire::descriptor::{Descriptor, FieldDescriptor, FieldType};
use crate::wire::message::{AcknowledgeRegisterData, ServerPayload, ServerToSimulator, SimulatorPayload};

struct StubSimulator;

impl Simulator for StubSimulator {
    fn get_last_action(&self) -> Option<&SimMapping> {
        None
    }

    fn notify_prediction(&mut self, _prediction: SimMapping) {}

    fn advance(&mut self, _action: &SimMapping) {}

    fn get_state(&self) -> SimState {
        let mut state = SimMapping::new();
        state.insert("a".to_string(), SimValue::Int(1));
        SimState::new(state, false)
    }

    fn reward(&self, _name: &str) -> Option<f64> {
        None
    }
}

fn field(name: &str, number: u32, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor::new(name, number, ty)
}

fn ack(sim_id: u64) -> ServerToSimulator {
    ServerToSimulator {
        payload: ServerPayload::AcknowledgeRegister(AcknowledgeRegisterData {
            sim_id,
            properties_schema: Descriptor::new("Properties", vec![]),
            output_schema: Descriptor::new("State", vec![field("a", 1, FieldType::Int32)]),
            prediction_schema: Descriptor::new("Prediction", vec![field("b", 1, FieldType::Float32)]),
        }),
    }
}

fn new_driver(mode: Mode) -> Driver {
    let adapter = SimulatorAdapter::new("cartpole", Box::new(StubSimulator), Arc::new(Binder::new()));
    Driver::new(mode, adapter)
}

#[test]
fn first_tick_always_emits_register() {
    let mut driver = new_driver(Mode::Training);
    let out = driver.next(None).unwrap().unwrap();
    assert_eq!(out.payload.kind(), "REGISTER");
    assert_eq!(driver.state(), DriverState::Registering);
}

#[test]
fn registration_ack_in_training_yields_ready_and_active() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    let out = driver.next(Some(&ack(3))).unwrap().unwrap();
    assert_eq!(out.payload.kind(), "READY");
    assert_eq!(driver.state(), DriverState::Active);
}

#[test]
fn unexpected_message_while_registering_is_rejected_without_transition() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    let bad = ServerToSimulator { payload: ServerPayload::Start };
    let err = driver.next(Some(&bad)).unwrap_err();
    assert!(matches!(err, Error::UnexpectedMessage { .. }));
    assert_eq!(driver.state(), DriverState::Registering);
}

#[test]
fn empty_incoming_while_registering_is_an_empty_message_error() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    let err = driver.next(None).unwrap_err();
    assert!(matches!(err, Error::EmptyMessage { .. }));
}

#[test]
fn finished_transitions_to_terminal_state_with_no_outgoing() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    driver.next(Some(&ack(1))).unwrap();
    let finish = ServerToSimulator { payload: ServerPayload::Finished };
    let out = driver.next(Some(&finish)).unwrap();
    assert!(out.is_none());
    assert_eq!(driver.state(), DriverState::Finished);
}

#[test]
fn once_finished_next_always_returns_none() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    driver.next(Some(&ack(1))).unwrap();
    driver.next(Some(&ServerToSimulator { payload: ServerPayload::Finished })).unwrap();

    assert!(driver.next(None).unwrap().is_none());
    assert!(driver.next(Some(&ack(1))).unwrap().is_none());
    assert_eq!(driver.state(), DriverState::Finished);
}

#[test]
fn ready_outgoing_carries_no_sub_payload() {
    let mut driver = new_driver(Mode::Training);
    driver.next(None).unwrap();
    let out = driver.next(Some(&ack(1))).unwrap().unwrap();
    assert!(matches!(out.payload, SimulatorPayload::Ready));
}
