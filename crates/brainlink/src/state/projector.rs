// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects a `{field-name -> value}` mapping onto a [`BoundSchema`],
//! producing the dynamic payload bytes carried inside a `STATE` entry.
//!
//! Coercion follows the same rules the original state-to-proto layer used:
//! any numeric [`SimValue`] widens or narrows into any numeric field,
//! `Bool` fields take the value's truthiness, `String` fields take its
//! `Display` rendering, and `Luminance`-typed fields accept only
//! [`SimValue::Luminance`].

use bytes::{BufMut, BytesMut};

use crate::error::StateError;
use crate::schema::binder::{BoundField, BoundFieldKind, BoundSchema};
use crate::schema::registry::EmbeddedType;
use crate::wire::codec::{put_bool, put_bytes, put_string};

use super::value::{SimMapping, SimValue};

/// Serialize `mapping` against `schema`'s field declarations, in
/// declaration order, producing the dynamic payload bytes for a
/// `STATE`/`ACTION` entry.
pub fn project(schema: &BoundSchema, mapping: &SimMapping) -> Result<Vec<u8>, StateError> {
    let mut out = BytesMut::new();
    for field in &schema.fields {
        let value = mapping
            .get(&field.name)
            .ok_or_else(|| StateError::FieldMissing(field.name.clone()))?;
        project_field(&mut out, field, value)?;
    }
    Ok(out.to_vec())
}

fn project_field(out: &mut BytesMut, field: &BoundField, value: &SimValue) -> Result<(), StateError> {
    match field.kind {
        BoundFieldKind::Float32 => out.put_f32_le(numeric(field, value)? as f32),
        BoundFieldKind::Float64 => out.put_f64_le(numeric(field, value)?),
        BoundFieldKind::Int32 => {
            let v = value.as_i64().ok_or_else(|| type_mismatch(field, "int"))?;
            out.put_i32_le(v as i32);
        }
        BoundFieldKind::Int64 => {
            let v = value.as_i64().ok_or_else(|| type_mismatch(field, "int"))?;
            out.put_i64_le(v);
        }
        BoundFieldKind::UInt32 => {
            let v = value.as_u64().ok_or_else(|| type_mismatch(field, "uint"))?;
            out.put_u32_le(v as u32);
        }
        BoundFieldKind::UInt64 => {
            let v = value.as_u64().ok_or_else(|| type_mismatch(field, "uint"))?;
            out.put_u64_le(v);
        }
        BoundFieldKind::Bool => put_bool(out, value.is_truthy()),
        BoundFieldKind::String => put_string(out, &value.to_string()),
        BoundFieldKind::Embedded(EmbeddedType::Luminance) => match value {
            SimValue::Luminance(img) => {
                out.put_u32_le(img.width);
                out.put_u32_le(img.height);
                put_bytes(out, &img.pixels);
            }
            _ => {
                return Err(StateError::UnknownEmbeddedType {
                    field: field.name.clone(),
                    type_name: EmbeddedType::Luminance.type_name().to_string(),
                })
            }
        },
    }
    Ok(())
}

fn numeric(field: &BoundField, value: &SimValue) -> Result<f64, StateError> {
    value.as_f64().ok_or_else(|| type_mismatch(field, "float"))
}

fn type_mismatch(field: &BoundField, expected: &'static str) -> StateError {
    StateError::TypeMismatch { field: field.name.clone(), expected }
}

#[cfg(test)]
#[path = "projector_tests.rs"]
mod tests;
