// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry broadcast listener.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::cache::StateCache;
use crate::error::{BindError, Error};
use crate::event::DeviceEvent;
use crate::registry::DeviceRegistry;
use crate::telemetry::{
    DEFAULT_STATE_FIELD, Diagnostic, DiagnosticCounters, DiagnosticSnapshot, TelemetryMessage,
};

use super::{DEFAULT_MAX_DATAGRAM_SIZE, DEFAULT_TELEMETRY_PORT};

/// Pause after a socket receive error before reading again.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Listener settings.
///
/// # Examples
///
/// ```
/// use atomberg_lib::protocol::ListenerConfig;
///
/// let config = ListenerConfig::default()
///     .with_bind_addr("127.0.0.1:0".parse().unwrap())
///     .with_max_datagram_size(512);
/// assert_eq!(config.max_datagram_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Local address to receive broadcasts on.
    pub bind_addr: SocketAddr,
    /// Receive buffer size per datagram.
    pub max_datagram_size: usize,
    /// JSON field holding the packed state.
    pub state_field: String,
}

impl ListenerConfig {
    /// Sets the bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the receive buffer size.
    #[must_use]
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size.max(1);
        self
    }

    /// Sets the JSON field holding the packed state.
    #[must_use]
    pub fn with_state_field(mut self, field: impl Into<String>) -> Self {
        self.state_field = field.into();
        self
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: (Ipv4Addr::UNSPECIFIED, DEFAULT_TELEMETRY_PORT).into(),
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            state_field: DEFAULT_STATE_FIELD.to_string(),
        }
    }
}

/// Lifecycle state of a [`BroadcastListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No socket is held.
    Stopped,
    /// The socket is bound and the receive loop is running.
    Listening {
        /// The bound local address.
        local_addr: SocketAddr,
    },
}

impl ListenerState {
    /// Returns true if the listener is running.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listening { .. })
    }
}

/// Receives telemetry broadcasts and feeds the state cache.
///
/// [`start`](Self::start) binds the telemetry socket and spawns one
/// background task that owns it. The task parses every datagram, decodes
/// the packed state, resolves the sender through the registry and writes
/// the result to the cache. Malformed datagrams and decode anomalies are
/// counted, logged and published as [`DeviceEvent::Diagnostic`]; they never
/// stop the loop.
///
/// [`stop`](Self::stop) signals the task and waits for it to exit, so the
/// socket is released when `stop` returns, even if a receive was pending.
/// Dropping the listener also signals the task to exit.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use atomberg_lib::cache::StateCache;
/// use atomberg_lib::protocol::{BroadcastListener, ListenerConfig};
/// use atomberg_lib::registry::DeviceRegistry;
///
/// # async fn example() -> atomberg_lib::Result<()> {
/// let registry = Arc::new(DeviceRegistry::builder().build()?);
/// let cache = StateCache::default();
/// let listener = BroadcastListener::new(ListenerConfig::default(), registry, cache.clone());
///
/// let mut updates = cache.subscribe();
/// listener.start().await?;
///
/// while let Some(update) = updates.next_state().await {
///     println!("{}: {}", update.display_name(), update.state);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BroadcastListener {
    config: ListenerConfig,
    registry: Arc<DeviceRegistry>,
    cache: StateCache,
    counters: Arc<DiagnosticCounters>,
    running: Mutex<Option<RunningTask>>,
    state_tx: watch::Sender<ListenerState>,
}

#[derive(Debug)]
struct RunningTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// Everything the receive loop needs, moved into the task.
struct IngestContext {
    registry: Arc<DeviceRegistry>,
    cache: StateCache,
    counters: Arc<DiagnosticCounters>,
    state_field: String,
}

impl BroadcastListener {
    /// Creates a stopped listener.
    #[must_use]
    pub fn new(config: ListenerConfig, registry: Arc<DeviceRegistry>, cache: StateCache) -> Self {
        let (state_tx, _) = watch::channel(ListenerState::Stopped);
        Self {
            config,
            registry,
            cache,
            counters: Arc::new(DiagnosticCounters::new()),
            running: Mutex::new(None),
            state_tx,
        }
    }

    /// Binds the telemetry socket and starts the receive loop.
    ///
    /// Calling `start` on a running listener returns its current address.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bind` if the socket cannot be bound or configured.
    /// The listener stays stopped and `start` can be retried.
    pub async fn start(&self) -> Result<SocketAddr, Error> {
        let mut running = self.running.lock().await;
        if let Some(task) = running.as_ref() {
            return Ok(task.local_addr);
        }

        let bind_addr = self.config.bind_addr;
        let bind_error = |source| BindError {
            address: bind_addr,
            source,
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(bind_error)?;
        socket.set_broadcast(true).map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let context = IngestContext {
            registry: Arc::clone(&self.registry),
            cache: self.cache.clone(),
            counters: Arc::clone(&self.counters),
            state_field: self.config.state_field.clone(),
        };
        let buffer_size = self.config.max_datagram_size;
        let handle = tokio::spawn(receive_loop(socket, shutdown_rx, context, buffer_size));

        *running = Some(RunningTask {
            shutdown_tx,
            handle,
            local_addr,
        });
        self.state_tx
            .send_replace(ListenerState::Listening { local_addr });

        tracing::info!(%local_addr, "Telemetry listener started");
        self.cache
            .events()
            .publish(DeviceEvent::ListenerStarted { local_addr });

        Ok(local_addr)
    }

    /// Stops the receive loop and releases the socket.
    ///
    /// Returns once the background task has exited. Stopping a stopped
    /// listener does nothing.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(task) = running.take() else {
            return;
        };

        // The task is detached from here on, so report it stopped before
        // waiting in case this future is dropped mid-join
        let _ = task.shutdown_tx.send(true);
        self.state_tx.send_replace(ListenerState::Stopped);
        if let Err(e) = task.handle.await {
            tracing::error!(error = %e, "Telemetry listener task failed");
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver that observes lifecycle changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.state_tx.subscribe()
    }

    /// Returns the current telemetry counters.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.counters.snapshot()
    }

    /// Returns the listener configuration.
    #[must_use]
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }
}

async fn receive_loop(
    socket: UdpSocket,
    mut shutdown_rx: watch::Receiver<bool>,
    context: IngestContext,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];

    loop {
        tokio::select! {
            biased;

            // Fires on an explicit stop and when the listener is dropped
            _ = shutdown_rx.changed() => break,

            received = socket.recv_from(&mut buf) => match received {
                Ok((len, source)) => context.ingest(&buf[..len], source),
                Err(e) => {
                    tracing::error!(error = %e, "Telemetry socket receive failed");
                    tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                }
            },
        }
    }

    drop(socket);
    tracing::info!("Telemetry listener stopped");
    context.cache.events().publish(DeviceEvent::ListenerStopped);
}

impl IngestContext {
    fn ingest(&self, payload: &[u8], source: SocketAddr) {
        self.counters.record_received();

        let message = match TelemetryMessage::parse(payload, &self.state_field) {
            Ok(message) => message,
            Err(e) => {
                self.counters.record_malformed();
                tracing::warn!(%source, error = %e, "Dropping malformed telemetry datagram");
                self.cache
                    .events()
                    .publish(DeviceEvent::Diagnostic(Diagnostic::MalformedDatagram {
                        source,
                        reason: e.to_string(),
                    }));
                return;
            }
        };
        tracing::debug!(
            %source,
            len = payload.len(),
            device_id = ?message.device_id(),
            packed = message.packed(),
            "Received telemetry datagram"
        );

        let decoded = message.decode();
        for anomaly in decoded.anomalies {
            self.counters.record_unexpected_value();
            tracing::warn!(%source, %anomaly, packed = message.packed(), "Unexpected value in telemetry");
            self.cache
                .events()
                .publish(DeviceEvent::Diagnostic(Diagnostic::UnexpectedValue {
                    source,
                    anomaly,
                }));
        }

        let ip = source.ip().to_canonical();
        let name = self.registry.resolve_name(ip);
        if name.is_none() {
            tracing::trace!(%ip, "Telemetry from unregistered address");
        }

        self.counters.record_accepted();
        self.cache
            .update(ip, name, message.device_id(), decoded.state, Utc::now());
    }
}
