// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `atomberg_lib` library.
//!
//! Errors fall into five groups: command validation ([`ValueError`]), command
//! encoding, command transmission ([`SendError`]), listener socket acquisition
//! ([`BindError`]) and registry lookups. Telemetry problems are described by [`ParseError`], which
//! never leaves the listener: malformed broadcasts are counted and logged, not
//! returned to callers.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A command carried an out-of-range value and was not sent.
    #[error("invalid command: {0}")]
    Value(#[from] ValueError),

    /// A validated command could not be serialized. No datagram was sent.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    /// The command datagram could not be handed to the network stack.
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// The telemetry listener could not acquire its socket.
    #[error("bind error: {0}")]
    Bind(#[from] BindError),

    /// No device is registered under the given name.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The operation needs a known device state but none has been observed yet.
    #[error("no state has been received yet for device {0}")]
    StateUnknown(String),

    /// The device registry could not be built.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors raised while validating command values.
///
/// These are always reported before any bytes are produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric field is outside its allowed range.
    #[error("{field} value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: i16,
        /// Maximum allowed value.
        max: i16,
        /// The value that was provided.
        actual: i16,
    },

    /// A speed delta of zero, or outside [-1, 5], was provided.
    #[error("speed delta {0} is invalid (expected -1 or 1..=5)")]
    InvalidSpeedDelta(i8),
}

/// Errors related to transmitting a command datagram.
#[derive(Debug, Error)]
pub enum SendError {
    /// The local transmit call failed (no route, interface down, ...).
    #[error("device {address} is unreachable: {source}")]
    Unreachable {
        /// Destination of the failed datagram.
        address: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}

/// The telemetry socket could not be bound.
#[derive(Debug, Error)]
#[error("failed to bind telemetry socket on {address}: {source}")]
pub struct BindError {
    /// The address the listener tried to bind.
    pub address: SocketAddr,
    /// Underlying socket error.
    #[source]
    pub source: io::Error,
}

/// Errors raised while building a [`DeviceRegistry`](crate::registry::DeviceRegistry).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two devices were registered under the same name.
    #[error("duplicate device name: {0}")]
    DuplicateName(String),

    /// Two devices were registered with the same IP address.
    #[error("duplicate device address: {0}")]
    DuplicateAddress(String),

    /// A host string could not be parsed as an IP address.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    /// A device name was empty.
    #[error("device name must not be empty")]
    EmptyName,
}

/// Errors raised while parsing a telemetry datagram.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The packed state field is absent.
    #[error("missing field in telemetry: {0}")]
    MissingField(String),

    /// The packed state field holds something other than a 32-bit number.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
