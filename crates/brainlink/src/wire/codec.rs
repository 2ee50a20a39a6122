// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-delimited binary encode/decode for [`ServerToSimulator`] and
//! [`SimulatorToServer`]. One WebSocket binary frame carries exactly one
//! top-level message; this module owns the byte layout of that frame.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::Error;

use super::descriptor::{Descriptor, FieldDescriptor, FieldLabel, FieldType};
use super::message::{
    AcknowledgeRegisterData, PredictionEntry, RegisterData, ServerPayload, ServerToSimulator,
    SetPropertiesData, SimulatorPayload, SimulatorToServer, StateEntry,
};

// -- Server -> Simulator message tags ---------------------------------------

const S2S_ACKNOWLEDGE_REGISTER: u8 = 1;
const S2S_SET_PROPERTIES: u8 = 2;
const S2S_START: u8 = 3;
const S2S_STOP: u8 = 4;
const S2S_PREDICTION: u8 = 5;
const S2S_RESET: u8 = 6;
const S2S_FINISHED: u8 = 7;

// -- Simulator -> Server message tags ---------------------------------------

const SIM2S_REGISTER: u8 = 1;
const SIM2S_READY: u8 = 2;
const SIM2S_STATE: u8 = 3;

// -- Field type tags (used inside encoded descriptors) ----------------------

const FT_INT32: u8 = 0;
const FT_INT64: u8 = 1;
const FT_UINT32: u8 = 2;
const FT_UINT64: u8 = 3;
const FT_FLOAT32: u8 = 4;
const FT_FLOAT64: u8 = 5;
const FT_BOOL: u8 = 6;
const FT_STRING: u8 = 7;
const FT_MESSAGE: u8 = 8;

pub(crate) fn eof(what: &'static str) -> Error {
    Error::Codec(format!("unexpected end of buffer reading {what}"))
}

pub(crate) fn require(buf: &Bytes, n: usize, what: &'static str) -> crate::error::Result<()> {
    if buf.remaining() < n {
        Err(eof(what))
    } else {
        Ok(())
    }
}

// -- Primitive helpers -------------------------------------------------------
//
// Shared by the top-level codec (sim_id, lengths, tags) and the dynamic
// state projector (bound-schema field values), so both speak the same
// little-endian, length-prefixed wire shapes.

pub fn put_string(out: &mut BytesMut, s: &str) {
    put_bytes(out, s.as_bytes());
}

pub fn get_string(buf: &mut Bytes) -> crate::error::Result<String> {
    let raw = get_bytes(buf)?;
    String::from_utf8(raw).map_err(|e| Error::Codec(format!("invalid utf8 string: {e}")))
}

pub fn put_bytes(out: &mut BytesMut, data: &[u8]) {
    out.put_u32_le(data.len() as u32);
    out.put_slice(data);
}

pub fn get_bytes(buf: &mut Bytes) -> crate::error::Result<Vec<u8>> {
    require(buf, 4, "length prefix")?;
    let len = buf.get_u32_le() as usize;
    require(buf, len, "length-prefixed payload")?;
    Ok(buf.split_to(len).to_vec())
}

pub fn put_bool(out: &mut BytesMut, v: bool) {
    out.put_u8(v as u8);
}

pub fn get_bool(buf: &mut Bytes) -> crate::error::Result<bool> {
    require(buf, 1, "bool")?;
    Ok(buf.get_u8() != 0)
}

fn put_optional_string(out: &mut BytesMut, s: &Option<String>) {
    match s {
        Some(s) => {
            put_bool(out, true);
            put_string(out, s);
        }
        None => put_bool(out, false),
    }
}

fn get_optional_string(buf: &mut Bytes) -> crate::error::Result<Option<String>> {
    if get_bool(buf)? {
        Ok(Some(get_string(buf)?))
    } else {
        Ok(None)
    }
}

fn put_optional_bytes(out: &mut BytesMut, b: &Option<Vec<u8>>) {
    match b {
        Some(b) => {
            put_bool(out, true);
            put_bytes(out, b);
        }
        None => put_bool(out, false),
    }
}

fn get_optional_bytes(buf: &mut Bytes) -> crate::error::Result<Option<Vec<u8>>> {
    if get_bool(buf)? {
        Ok(Some(get_bytes(buf)?))
    } else {
        Ok(None)
    }
}

// -- Descriptor encode/decode -------------------------------------------------

fn field_type_tag(ft: &FieldType) -> u8 {
    match ft {
        FieldType::Int32 => FT_INT32,
        FieldType::Int64 => FT_INT64,
        FieldType::UInt32 => FT_UINT32,
        FieldType::UInt64 => FT_UINT64,
        FieldType::Float32 => FT_FLOAT32,
        FieldType::Float64 => FT_FLOAT64,
        FieldType::Bool => FT_BOOL,
        FieldType::String => FT_STRING,
        FieldType::Message(_) => FT_MESSAGE,
    }
}

fn put_descriptor(out: &mut BytesMut, d: &Descriptor) {
    put_string(out, &d.name);
    out.put_u32_le(d.fields.len() as u32);
    for field in &d.fields {
        put_string(out, &field.name);
        out.put_u32_le(field.number);
        out.put_u8(match field.label {
            FieldLabel::Optional => 0,
        });
        out.put_u8(field_type_tag(&field.field_type));
        if let FieldType::Message(type_name) = &field.field_type {
            put_string(out, type_name);
        }
    }
}

fn get_descriptor(buf: &mut Bytes) -> crate::error::Result<Descriptor> {
    let name = get_string(buf)?;
    require(buf, 4, "descriptor field count")?;
    let count = buf.get_u32_le() as usize;
    let mut fields = Vec::with_capacity(count);
    for _ in 0..count {
        let field_name = get_string(buf)?;
        require(buf, 4, "field number")?;
        let number = buf.get_u32_le();
        require(buf, 1, "field label")?;
        let label = match buf.get_u8() {
            0 => FieldLabel::Optional,
            other => return Err(Error::Codec(format!("unknown field label tag {other}"))),
        };
        require(buf, 1, "field type tag")?;
        let type_tag = buf.get_u8();
        let field_type = match type_tag {
            FT_INT32 => FieldType::Int32,
            FT_INT64 => FieldType::Int64,
            FT_UINT32 => FieldType::UInt32,
            FT_UINT64 => FieldType::UInt64,
            FT_FLOAT32 => FieldType::Float32,
            FT_FLOAT64 => FieldType::Float64,
            FT_BOOL => FieldType::Bool,
            FT_STRING => FieldType::String,
            FT_MESSAGE => FieldType::Message(get_string(buf)?),
            other => return Err(Error::Codec(format!("unknown field type tag {other}"))),
        };
        fields.push(FieldDescriptor { name: field_name, number, label, field_type });
    }
    Ok(Descriptor { name, fields })
}

// -- ServerToSimulator --------------------------------------------------------

pub fn encode_server_to_simulator(msg: &ServerToSimulator) -> Bytes {
    let mut out = BytesMut::new();
    match &msg.payload {
        ServerPayload::AcknowledgeRegister(data) => {
            out.put_u8(S2S_ACKNOWLEDGE_REGISTER);
            out.put_u64_le(data.sim_id);
            put_descriptor(&mut out, &data.properties_schema);
            put_descriptor(&mut out, &data.output_schema);
            put_descriptor(&mut out, &data.prediction_schema);
        }
        ServerPayload::SetProperties(data) => {
            out.put_u8(S2S_SET_PROPERTIES);
            put_bytes(&mut out, &data.dynamic_properties);
            put_optional_string(&mut out, &data.reward_name);
            put_descriptor(&mut out, &data.prediction_schema);
        }
        ServerPayload::Start => out.put_u8(S2S_START),
        ServerPayload::Stop => out.put_u8(S2S_STOP),
        ServerPayload::Prediction(entries) => {
            out.put_u8(S2S_PREDICTION);
            out.put_u32_le(entries.len() as u32);
            for entry in entries {
                put_bytes(&mut out, &entry.dynamic_prediction);
            }
        }
        ServerPayload::Reset => out.put_u8(S2S_RESET),
        ServerPayload::Finished => out.put_u8(S2S_FINISHED),
    }
    out.freeze()
}

pub fn decode_server_to_simulator(bytes: &[u8]) -> crate::error::Result<ServerToSimulator> {
    let mut buf = Bytes::copy_from_slice(bytes);
    require(&buf, 1, "message tag")?;
    let tag = buf.get_u8();
    let payload = match tag {
        S2S_ACKNOWLEDGE_REGISTER => {
            require(&buf, 8, "sim_id")?;
            let sim_id = buf.get_u64_le();
            let properties_schema = get_descriptor(&mut buf)?;
            let output_schema = get_descriptor(&mut buf)?;
            let prediction_schema = get_descriptor(&mut buf)?;
            ServerPayload::AcknowledgeRegister(AcknowledgeRegisterData {
                sim_id,
                properties_schema,
                output_schema,
                prediction_schema,
            })
        }
        S2S_SET_PROPERTIES => {
            let dynamic_properties = get_bytes(&mut buf)?;
            let reward_name = get_optional_string(&mut buf)?;
            let prediction_schema = get_descriptor(&mut buf)?;
            ServerPayload::SetProperties(SetPropertiesData { dynamic_properties, reward_name, prediction_schema })
        }
        S2S_START => ServerPayload::Start,
        S2S_STOP => ServerPayload::Stop,
        S2S_PREDICTION => {
            require(&buf, 4, "prediction count")?;
            let count = buf.get_u32_le() as usize;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                entries.push(PredictionEntry { dynamic_prediction: get_bytes(&mut buf)? });
            }
            ServerPayload::Prediction(entries)
        }
        S2S_RESET => ServerPayload::Reset,
        S2S_FINISHED => ServerPayload::Finished,
        other => return Err(Error::Codec(format!("unknown ServerToSimulator tag {other}"))),
    };
    Ok(ServerToSimulator { payload })
}

// -- SimulatorToServer --------------------------------------------------------

pub fn encode_simulator_to_server(msg: &SimulatorToServer) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(match msg.session_id {
        Some(_) => 1,
        None => 0,
    });
    if let Some(id) = msg.session_id {
        out.put_u64_le(id);
    }
    match &msg.payload {
        SimulatorPayload::Register(data) => {
            out.put_u8(SIM2S_REGISTER);
            put_string(&mut out, &data.simulator_name);
        }
        SimulatorPayload::Ready => out.put_u8(SIM2S_READY),
        SimulatorPayload::State(entries) => {
            out.put_u8(SIM2S_STATE);
            out.put_u32_le(entries.len() as u32);
            for entry in entries {
                put_bytes(&mut out, &entry.state);
                out.put_f64_le(entry.reward);
                put_bool(&mut out, entry.terminal);
                put_optional_bytes(&mut out, &entry.action_taken);
            }
        }
    }
    out.freeze()
}

pub fn decode_simulator_to_server(bytes: &[u8]) -> crate::error::Result<SimulatorToServer> {
    let mut buf = Bytes::copy_from_slice(bytes);
    require(&buf, 1, "session id presence")?;
    let has_session_id = buf.get_u8() != 0;
    let session_id = if has_session_id {
        require(&buf, 8, "session id")?;
        Some(buf.get_u64_le())
    } else {
        None
    };
    require(&buf, 1, "message tag")?;
    let tag = buf.get_u8();
    let payload = match tag {
        SIM2S_REGISTER => SimulatorPayload::Register(RegisterData { simulator_name: get_string(&mut buf)? }),
        SIM2S_READY => SimulatorPayload::Ready,
        SIM2S_STATE => {
            require(&buf, 4, "state entry count")?;
            let count = buf.get_u32_le() as usize;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let state = get_bytes(&mut buf)?;
                require(&buf, 8, "reward")?;
                let reward = buf.get_f64_le();
                let terminal = get_bool(&mut buf)?;
                let action_taken = get_optional_bytes(&mut buf)?;
                entries.push(StateEntry { state, reward, terminal, action_taken });
            }
            SimulatorPayload::State(entries)
        }
        other => return Err(Error::Codec(format!("unknown SimulatorToServer tag {other}"))),
    };
    Ok(SimulatorToServer { session_id, payload })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
