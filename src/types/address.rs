// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network address of a fan.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::RegistryError;

/// UDP port fans listen on for commands.
pub const DEFAULT_COMMAND_PORT: u16 = 5600;

/// Where to send a fan's commands.
///
/// Broadcasts from the fan arrive from the same IP but an arbitrary source
/// port, so [`ip`](Self::ip) is what correlates telemetry to a device.
///
/// # Examples
///
/// ```
/// use atomberg_lib::types::DeviceAddress;
///
/// let addr: DeviceAddress = "192.168.29.14".parse().unwrap();
/// assert_eq!(addr.port(), 5600);
/// assert_eq!(addr.to_string(), "192.168.29.14:5600");
///
/// let custom: DeviceAddress = "192.168.29.15:6000".parse().unwrap();
/// assert_eq!(custom.port(), 6000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceAddress {
    ip: IpAddr,
    port: u16,
}

impl DeviceAddress {
    /// Creates an address on the default command port.
    ///
    /// IPv4-mapped IPv6 addresses are stored as plain IPv4, the form the
    /// listener sees broadcasts arrive from.
    #[must_use]
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_canonical(),
            port: DEFAULT_COMMAND_PORT,
        }
    }

    /// Returns a copy using a different command port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Returns the device IP.
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Returns the command port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the socket address commands are sent to.
    #[must_use]
    pub const fn command_socket(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_socket())
    }
}

impl From<IpAddr> for DeviceAddress {
    fn from(ip: IpAddr) -> Self {
        Self::new(ip)
    }
}

impl From<SocketAddr> for DeviceAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip()).with_port(addr.port())
    }
}

impl FromStr for DeviceAddress {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::new(ip));
        }
        s.parse::<SocketAddr>()
            .map(Self::from)
            .map_err(|_| RegistryError::InvalidAddress(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn default_port() {
        let addr = DeviceAddress::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(addr.port(), DEFAULT_COMMAND_PORT);
        assert_eq!(addr.command_socket(), "10.0.0.2:5600".parse().unwrap());
    }

    #[test]
    fn ipv4_mapped_ipv6_is_stored_as_ipv4() {
        let mapped: DeviceAddress = "::ffff:192.168.29.14".parse().unwrap();
        assert_eq!(mapped.ip(), "192.168.29.14".parse::<IpAddr>().unwrap());
        assert_eq!(mapped.to_string(), "192.168.29.14:5600");

        let with_port: DeviceAddress = "[::ffff:192.168.29.14]:6000".parse().unwrap();
        assert_eq!(with_port.command_socket(), "192.168.29.14:6000".parse().unwrap());

        // Plain IPv6 is untouched
        let v6: DeviceAddress = "fe80::1".parse().unwrap();
        assert!(v6.ip().is_ipv6());
    }

    #[test]
    fn parse_forms() {
        assert_eq!(
            " 10.0.0.2 ".parse::<DeviceAddress>().unwrap().to_string(),
            "10.0.0.2:5600"
        );
        assert_eq!("[::1]:7000".parse::<DeviceAddress>().unwrap().port(), 7000);
        assert_eq!(
            "fan.local".parse::<DeviceAddress>(),
            Err(RegistryError::InvalidAddress("fan.local".to_string()))
        );
    }
}
