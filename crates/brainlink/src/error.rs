// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crate-wide error type, covering every fatal condition in the wire
//! protocol, schema binder, projector, driver, and transport layer.

use thiserror::Error;

/// Unified error type for the session driver and its collaborators.
///
/// Every variant here is fatal to the session (see the driver's
/// propagation rules): the transport loop logs it and closes the
/// connection without retrying locally.
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor referenced a type name the binder doesn't recognize.
    #[error("unknown referenced type {type_name:?} in descriptor {descriptor_name:?}")]
    Bind { descriptor_name: String, type_name: String },

    /// A field required by a bound schema was missing from a simulator's
    /// state/action mapping, or a value couldn't be coerced to the field's
    /// wire type.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// The driver expected an incoming message but received none.
    #[error("expected a {expected} message but received nothing")]
    EmptyMessage { expected: &'static str },

    /// A message was missing a required sub-payload.
    #[error("missing required field {field} in {message}")]
    MalformedMessage { field: &'static str, message: &'static str },

    /// The driver received a message type it doesn't accept in its current
    /// state.
    #[error("expected {expected} but got {got}")]
    UnexpectedMessage { expected: String, got: String },

    /// Connection failure, abrupt close, or non-1000 close code.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Missing credential, mutually exclusive selectors, or a missing
    /// required flag.
    #[error("configuration error: {0}")]
    Config(String),

    /// The wire bytes themselves were truncated or otherwise not decodable
    /// (distinct from a semantically-malformed-but-well-formed message).
    #[error("malformed wire frame: {0}")]
    Codec(String),
}

/// Failures coercing a simulator-produced value into a bound schema field.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("field {0:?} not provided")]
    FieldMissing(String),

    #[error("field {field:?} expected {expected}, value did not coerce")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("field {field:?} references unregistered embedded type {type_name:?}")]
    UnknownEmbeddedType { field: String, type_name: String },
}

/// Transport-layer failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {url} failed: {source}")]
    Connect { url: String, #[source] source: std::io::Error },

    #[error("connect to {url} timed out")]
    ConnectTimeout { url: String },

    #[error("websocket handshake with {url} failed: {source}")]
    Handshake { url: String, #[source] source: Box<tokio_tungstenite::tungstenite::Error> },

    #[error("connection closed abnormally: code={code:?} reason={reason}")]
    AbnormalClose { code: Option<u16>, reason: String },

    #[error("websocket error: {0}")]
    Websocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("proxy tunnel to {proxy} failed: {detail}")]
    ProxyTunnel { proxy: String, detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;
