//! Point-in-time copy of device states.
//!
//! [`Snapshot`] is an **owned**, read-only view of every connected device's
//! [`DeviceState`] at the moment it was taken, produced by
//! [`Registry::snapshot`](crate::registry::Registry::snapshot). It is cheap to
//! clone for fan-out to multiple consumers.
//!
//! # Semantics
//! - Keys are [`DeviceId`]s.
//! - A snapshot is **immutable** and never updated; take a new one after
//!   more reports have been processed.
//!
//! # Example
//! ```
//! use shuttle_jog::{DeviceInfo, Registry};
//!
//! let mut registry = Registry::builtin();
//! let info = DeviceInfo::new("usb:1-4", 0x0B33, 0x0020);
//! registry.on_device_appeared(&info);
//! registry.on_data_received(&info.device_id(), &[0x05, 0x00, 0x00, 0x00, 0x00]);
//!
//! let snap = registry.snapshot();
//! assert_eq!(snap.get(&info.device_id()).map(|s| s.shuttle), Some(5));
//! ```

use crate::device::{DeviceId, DeviceState};
use std::collections::HashMap;

/// Owned snapshot of current device states (`DeviceId → DeviceState`).
#[derive(Clone, Debug, Default)]
pub struct Snapshot(pub HashMap<DeviceId, DeviceState>);

impl Snapshot {
    /// Get the state for a specific device.
    #[inline]
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceState> {
        self.0.get(id)
    }

    /// Iterate `(id, state)` pairs.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceState)> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the snapshot and return the inner map.
    #[inline]
    pub fn into_inner(self) -> HashMap<DeviceId, DeviceState> {
        self.0
    }
}
