// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal telemetry diagnostics.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::DecodeAnomaly;

/// An anomaly observed while ingesting telemetry.
///
/// Diagnostics are published on the event bus and counted, but never
/// returned as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A datagram was dropped because it could not be parsed.
    MalformedDatagram {
        /// Sender of the datagram.
        source: SocketAddr,
        /// Why it was rejected.
        reason: String,
    },

    /// A broadcast decoded with a clamped field.
    UnexpectedValue {
        /// Sender of the datagram.
        source: SocketAddr,
        /// The clamped field.
        anomaly: DecodeAnomaly,
    },
}

impl Diagnostic {
    /// Returns the sender of the offending datagram.
    #[must_use]
    pub fn source(&self) -> SocketAddr {
        match self {
            Self::MalformedDatagram { source, .. } | Self::UnexpectedValue { source, .. } => {
                *source
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDatagram { source, reason } => {
                write!(f, "dropped datagram from {source}: {reason}")
            }
            Self::UnexpectedValue { source, anomaly } => {
                write!(f, "anomalous state from {source}: {anomaly}")
            }
        }
    }
}

/// Counters for telemetry traffic, shared between the listener task and readers.
#[derive(Debug, Default)]
pub struct DiagnosticCounters {
    received: AtomicU64,
    accepted: AtomicU64,
    malformed: AtomicU64,
    unexpected_values: AtomicU64,
}

impl DiagnosticCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unexpected_value(&self) {
        self.unexpected_values.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unexpected_values: self.unexpected_values.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the telemetry counters at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticSnapshot {
    /// Datagrams read from the socket.
    pub received: u64,
    /// Datagrams decoded and published to the cache.
    pub accepted: u64,
    /// Datagrams dropped as unparseable.
    pub malformed: u64,
    /// Clamped fields seen in accepted datagrams.
    pub unexpected_values: u64,
}
