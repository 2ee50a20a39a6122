// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire protocol: dynamic descriptors, the two message unions they
//! describe, and the binary codec between them and raw WebSocket frames.

pub mod codec;
pub mod descriptor;
pub mod message;

pub use descriptor::{Descriptor, FieldDescriptor, FieldLabel, FieldType};
pub use message::{
    AcknowledgeRegisterData, PredictionEntry, RegisterData, ServerPayload, ServerToSimulator,
    SetPropertiesData, SimulatorPayload, SimulatorToServer, StateEntry,
};
