// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot command datagrams.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::command::{CommandDelta, encode_command};
use crate::error::{Error, SendError};
use crate::types::DeviceAddress;

/// Sends command datagrams to fans.
///
/// Every call encodes the command, opens an ephemeral socket, and sends one
/// datagram. There is no acknowledgment and no retry: success means the
/// datagram reached the local network stack. Sending the same delta twice
/// produces two identical datagrams, which a fan applies twice.
///
/// # Examples
///
/// ```no_run
/// use atomberg_lib::command::CommandDelta;
/// use atomberg_lib::protocol::CommandSender;
///
/// # async fn example() -> atomberg_lib::Result<()> {
/// let sender = CommandSender::new();
/// let fan = "192.168.29.14".parse().unwrap();
/// sender.send(fan, &CommandDelta::power_on()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSender;

impl CommandSender {
    /// Creates a sender.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validates, encodes and transmits a command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the delta is out of range (nothing is sent),
    /// or `Error::Send` with [`SendError::Unreachable`] if the local socket
    /// could not be opened or the transmit call failed.
    pub async fn send(&self, address: DeviceAddress, delta: &CommandDelta) -> Result<(), Error> {
        let payload = encode_command(delta)?;
        let target = address.command_socket();

        tracing::debug!(
            target_addr = %target,
            payload = %String::from_utf8_lossy(&payload),
            "Sending fan command"
        );

        transmit(target, &payload)
            .await
            .map_err(|source| SendError::Unreachable {
                address: target,
                source,
            })?;
        Ok(())
    }
}

async fn transmit(target: SocketAddr, payload: &[u8]) -> io::Result<()> {
    let local: SocketAddr = match target.ip() {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local).await?;
    if let IpAddr::V4(ip) = target.ip()
        && ip.is_broadcast()
    {
        socket.set_broadcast(true)?;
    }
    socket.send_to(payload, target).await?;
    Ok(())
}
