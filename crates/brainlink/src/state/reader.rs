// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decodes a dynamic payload (the bytes of `dynamic_properties` or
//! `dynamic_prediction`) against a [`BoundSchema`], the inverse of
//! [`super::projector::project`].

use bytes::{Buf, Bytes};

use crate::error::Result;
use crate::schema::binder::{BoundField, BoundFieldKind, BoundSchema};
use crate::schema::registry::EmbeddedType;
use crate::wire::codec::{get_bool, get_bytes, get_string, require};

use super::value::{LuminanceValue, SimMapping, SimValue};

/// Decode `bytes` into a `{field-name -> value}` mapping, reading fields in
/// the schema's declaration order — the same order [`super::projector::project`]
/// wrote them in.
pub fn read(schema: &BoundSchema, bytes: &[u8]) -> Result<SimMapping> {
    let mut buf = Bytes::copy_from_slice(bytes);
    let mut mapping = SimMapping::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let value = read_field(&mut buf, field)?;
        mapping.insert(field.name.clone(), value);
    }
    Ok(mapping)
}

fn read_field(buf: &mut Bytes, field: &BoundField) -> Result<SimValue> {
    let value = match field.kind {
        BoundFieldKind::Float32 => {
            require(buf, 4, "float32 field")?;
            SimValue::Float(buf.get_f32_le() as f64)
        }
        BoundFieldKind::Float64 => {
            require(buf, 8, "float64 field")?;
            SimValue::Float(buf.get_f64_le())
        }
        BoundFieldKind::Int32 => {
            require(buf, 4, "int32 field")?;
            SimValue::Int(buf.get_i32_le() as i64)
        }
        BoundFieldKind::Int64 => {
            require(buf, 8, "int64 field")?;
            SimValue::Int(buf.get_i64_le())
        }
        BoundFieldKind::UInt32 => {
            require(buf, 4, "uint32 field")?;
            SimValue::UInt(buf.get_u32_le() as u64)
        }
        BoundFieldKind::UInt64 => {
            require(buf, 8, "uint64 field")?;
            SimValue::UInt(buf.get_u64_le())
        }
        BoundFieldKind::Bool => SimValue::Bool(get_bool(buf)?),
        BoundFieldKind::String => SimValue::Str(get_string(buf)?),
        BoundFieldKind::Embedded(EmbeddedType::Luminance) => {
            require(buf, 4, "luminance width")?;
            let width = buf.get_u32_le();
            require(buf, 4, "luminance height")?;
            let height = buf.get_u32_le();
            let pixels = get_bytes(buf)?;
            SimValue::Luminance(LuminanceValue { width, height, pixels })
        }
    };
    Ok(value)
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
