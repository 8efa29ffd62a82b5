// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only view of a registered fan.

use chrono::{DateTime, Utc};

use crate::state::DeviceState;
use crate::types::DeviceAddress;

/// A registered fan together with what has been observed from it.
///
/// This is a snapshot. The cache keeps moving after it is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Registered name.
    pub name: String,
    /// Command address.
    pub address: DeviceAddress,
    /// Last broadcast state, if one has arrived.
    pub last_known_state: Option<DeviceState>,
    /// When that broadcast arrived.
    pub last_updated: Option<DateTime<Utc>>,
}

impl DeviceRecord {
    /// Returns `true` once a broadcast from this fan has been observed.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        self.last_known_state.is_some()
    }

    /// Returns the time elapsed since the last broadcast.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.last_updated.map(|at| now - at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(updated: Option<DateTime<Utc>>) -> DeviceRecord {
        DeviceRecord {
            name: "Sofa Fan".to_string(),
            address: "192.168.29.14".parse().unwrap(),
            last_known_state: updated.map(|_| DeviceState::new()),
            last_updated: updated,
        }
    }

    #[test]
    fn unobserved_record() {
        let r = record(None);
        assert!(!r.is_observed());
        assert_eq!(r.age(Utc::now()), None);
    }

    #[test]
    fn age_since_last_update() {
        let now = Utc::now();
        let r = record(Some(now - chrono::Duration::seconds(30)));
        assert!(r.is_observed());
        assert_eq!(r.age(now), Some(chrono::Duration::seconds(30)));
    }
}
