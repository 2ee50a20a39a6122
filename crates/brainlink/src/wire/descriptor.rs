// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Self-describing message-type declarations exchanged at registration and
//! at set-properties. A [`Descriptor`] is opaque to everything except the
//! schema binder: the wire codec only needs to move its bytes around.

use serde::{Deserialize, Serialize};

/// Sentinel name assigned to an anonymous descriptor before fingerprinting,
/// so two anonymous descriptors with different field sets still produce
/// distinct structural fingerprints.
pub const ANONYMOUS_NAME: &str = "__anonymous__";

/// A field's wire type: either a primitive, or a reference to a named
/// composite type resolved against the binder's built-in registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    String,
    /// `referenced_type_name`, e.g. `"bonsai.inkling_types.proto.Luminance"`.
    Message(String),
}

/// Field presence. The wire format only ever declares `optional` fields —
/// kept as an enum rather than a bare bool so a future label can be added
/// without changing every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldLabel {
    Optional,
}

/// One field declaration within a [`Descriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub label: FieldLabel,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        Self { name: name.into(), number, label: FieldLabel::Optional, field_type }
    }
}

/// A self-describing message-type declaration received from the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Descriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self { name: name.into(), fields }
    }

    /// The name used for fingerprinting: the declared name, or
    /// [`ANONYMOUS_NAME`] if the descriptor didn't provide one.
    pub fn fingerprint_name(&self) -> &str {
        if self.name.is_empty() {
            ANONYMOUS_NAME
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
