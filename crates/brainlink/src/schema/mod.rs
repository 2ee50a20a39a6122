// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic schema binding: turning descriptors sent over the wire into
//! reusable, structurally-memoized runtime layouts.

pub mod binder;
pub mod registry;

pub use binder::{fingerprint, Binder, BoundField, BoundFieldKind, BoundSchema, Fingerprint, SchemaHandle};
pub use registry::EmbeddedType;
