// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Name to address mapping for known fans.
//!
//! A [`DeviceRegistry`] is built once, from a builder or from a
//! [`RegistryConfig`], and is immutable afterwards. It resolves friendly names
//! to [`DeviceAddress`]es for outgoing commands and resolves the source IP of
//! incoming broadcasts back to a name.
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::registry::DeviceRegistry;
//!
//! let registry = DeviceRegistry::builder()
//!     .device("Sofa Fan", "192.168.29.14".parse().unwrap())
//!     .device("Table Fan", "192.168.29.15".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.names(), vec!["Sofa Fan", "Table Fan"]);
//! let addr = registry.resolve_address("Table Fan").unwrap();
//! assert_eq!(registry.resolve_name(addr.ip()), Some("Table Fan"));
//! ```

use std::collections::HashMap;
use std::net::IpAddr;

use serde::Deserialize;

use crate::error::{Error, RegistryError};
use crate::types::DeviceAddress;

/// A fan known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDevice {
    name: String,
    address: DeviceAddress,
}

impl RegisteredDevice {
    /// Returns the friendly name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the command address.
    #[must_use]
    pub fn address(&self) -> DeviceAddress {
        self.address
    }
}

/// Immutable mapping between device names and addresses.
///
/// Devices keep their registration order, which is the order
/// [`names`](Self::names) reports.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<RegisteredDevice>,
    by_name: HashMap<String, usize>,
    by_ip: HashMap<IpAddr, usize>,
}

impl DeviceRegistry {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> DeviceRegistryBuilder {
        DeviceRegistryBuilder::new()
    }

    /// Builds a registry from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if an address is invalid or a name or IP
    /// appears twice.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for entry in &config.devices {
            let mut address: DeviceAddress = entry.host.parse()?;
            if let Some(port) = entry.port {
                address = address.with_port(port);
            }
            builder = builder.device(entry.name.clone(), address);
        }
        builder.build()
    }

    /// Resolves a device name to its address.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device has this name.
    pub fn resolve_address(&self, name: &str) -> Result<DeviceAddress, Error> {
        self.get(name)
            .map(RegisteredDevice::address)
            .ok_or_else(|| Error::DeviceNotFound(name.to_string()))
    }

    /// Resolves a broadcast source IP to a device name.
    #[must_use]
    pub fn resolve_name(&self, ip: IpAddr) -> Option<&str> {
        self.by_ip
            .get(&ip.to_canonical())
            .map(|&i| self.devices[i].name())
    }

    /// Looks up a device by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredDevice> {
        self.by_name.get(name).map(|&i| &self.devices[i])
    }

    /// Returns `true` if a device with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns all device names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.devices.iter().map(RegisteredDevice::name).collect()
    }

    /// Returns all devices in registration order.
    #[must_use]
    pub fn devices(&self) -> &[RegisteredDevice] {
        &self.devices
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Builder for [`DeviceRegistry`].
#[derive(Debug, Default)]
pub struct DeviceRegistryBuilder {
    devices: Vec<RegisteredDevice>,
}

impl DeviceRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device.
    #[must_use]
    pub fn device(mut self, name: impl Into<String>, address: DeviceAddress) -> Self {
        self.devices.push(RegisteredDevice {
            name: name.into(),
            address,
        });
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if a name is empty, or a name or IP is used
    /// by more than one device.
    pub fn build(self) -> Result<DeviceRegistry, RegistryError> {
        let mut by_name = HashMap::with_capacity(self.devices.len());
        let mut by_ip = HashMap::with_capacity(self.devices.len());

        for (index, device) in self.devices.iter().enumerate() {
            if device.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if by_name.insert(device.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(device.name.clone()));
            }
            if by_ip.insert(device.address.ip().to_canonical(), index).is_some() {
                return Err(RegistryError::DuplicateAddress(
                    device.address.ip().to_string(),
                ));
            }
        }

        tracing::debug!(count = self.devices.len(), "Built device registry");

        Ok(DeviceRegistry {
            devices: self.devices,
            by_name,
            by_ip,
        })
    }
}

/// Deserializable registry description.
///
/// The format is left to the caller; any `serde` data format works.
///
/// # Examples
///
/// ```
/// use atomberg_lib::registry::{DeviceRegistry, RegistryConfig};
///
/// let config: RegistryConfig = serde_json::from_str(r#"{
///     "devices": [
///         { "name": "Sofa Fan", "host": "192.168.29.14" },
///         { "name": "Table Fan", "host": "192.168.29.15", "port": 5600 }
///     ]
/// }"#).unwrap();
///
/// let registry = DeviceRegistry::from_config(&config).unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Devices in display order.
    pub devices: Vec<DeviceEntry>,
}

/// One device in a [`RegistryConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    /// Friendly name.
    pub name: String,
    /// IP address, optionally with a port.
    pub host: String,
    /// Command port override.
    #[serde(default)]
    pub port: Option<u16>,
}
