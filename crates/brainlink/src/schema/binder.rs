// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconstitutes runtime message layouts from descriptors sent by the
//! server, memoizing by structural fingerprint so identical descriptors
//! always yield the same [`SchemaHandle`] — including across sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::wire::descriptor::{Descriptor, FieldDescriptor, FieldType};

use super::registry::EmbeddedType;

/// A resolved field type: primitives pass through unchanged, `Message`
/// references are resolved against the built-in registry at bind time so
/// later components never need to re-resolve a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundFieldKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    String,
    Embedded(EmbeddedType),
}

/// One field of a [`BoundSchema`], in declaration order.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: String,
    pub number: u32,
    pub kind: BoundFieldKind,
}

/// A runtime-constructed message layout, reconstituted from a [`Descriptor`].
#[derive(Debug)]
pub struct BoundSchema {
    pub name: String,
    pub fields: Vec<BoundField>,
}

/// Shared handle to a bound schema. Cheap to clone; identical descriptors
/// always resolve to the same handle via the binder's memoization table.
pub type SchemaHandle = Arc<BoundSchema>;

/// Structural fingerprint of a descriptor: its (sentinel-substituted) name
/// together with the ordered sequence of `(name, number, label, type)`
/// field tuples, held as a value rather than reduced to a hash — two
/// fingerprints are equal iff the underlying `Eq` impls say so, so a hash
/// collision can never alias two structurally-distinct descriptors to the
/// same [`SchemaHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    name: String,
    fields: Vec<FieldDescriptor>,
}

pub fn fingerprint(descriptor: &Descriptor) -> Fingerprint {
    Fingerprint { name: descriptor.fingerprint_name().to_string(), fields: descriptor.fields.clone() }
}

/// Memoizing binder. One instance is shared across all sessions in a
/// process — the cache is an idempotent memo (fingerprint -> handle), safe
/// under concurrent binders because inserts are guarded by a single mutex.
#[derive(Default)]
pub struct Binder {
    cache: Mutex<HashMap<Fingerprint, SchemaHandle>>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a descriptor to a runtime schema, reusing a memoized handle if
    /// an identical descriptor has already been bound.
    pub fn bind(&self, descriptor: &Descriptor) -> Result<SchemaHandle, Error> {
        let key = fingerprint(descriptor);

        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = cache.get(&key) {
            return Ok(Arc::clone(handle));
        }

        let fields = descriptor
            .fields
            .iter()
            .map(|field| resolve_field(descriptor, field))
            .collect::<Result<Vec<_>, Error>>()?;
        let handle: SchemaHandle =
            Arc::new(BoundSchema { name: descriptor.fingerprint_name().to_string(), fields });
        cache.insert(key, Arc::clone(&handle));
        Ok(handle)
    }
}

fn resolve_field(
    descriptor: &Descriptor,
    field: &crate::wire::descriptor::FieldDescriptor,
) -> Result<BoundField, Error> {
    let kind = match &field.field_type {
        FieldType::Int32 => BoundFieldKind::Int32,
        FieldType::Int64 => BoundFieldKind::Int64,
        FieldType::UInt32 => BoundFieldKind::UInt32,
        FieldType::UInt64 => BoundFieldKind::UInt64,
        FieldType::Float32 => BoundFieldKind::Float32,
        FieldType::Float64 => BoundFieldKind::Float64,
        FieldType::Bool => BoundFieldKind::Bool,
        FieldType::String => BoundFieldKind::String,
        FieldType::Message(type_name) => match EmbeddedType::resolve(type_name) {
            Some(embedded) => BoundFieldKind::Embedded(embedded),
            None => {
                return Err(Error::Bind {
                    descriptor_name: descriptor.fingerprint_name().to_string(),
                    type_name: type_name.clone(),
                })
            }
        },
    };
    Ok(BoundField { name: field.name.clone(), number: field.number, kind })
}

#[cfg(test)]
#[path = "binder_tests.rs"]
mod tests;
