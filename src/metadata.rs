//! Device summary records.
//!
//! [`DeviceSummary`] is a lightweight, cloneable description of a connected
//! device suitable for UI display, logging, and listing. It does not borrow
//! from the registry and does not include live state.
//!
//! # Example
//! ```
//! use shuttle_jog::{DeviceInfo, Registry};
//!
//! let mut registry = Registry::builtin();
//! registry.on_device_appeared(&DeviceInfo::new("usb:1-4", 0x0B33, 0x0020));
//! for info in registry.list() {
//!     println!("{info}: {} buttons", info.num_buttons);
//! }
//! ```

use crate::device::{ConnectedDevice, DeviceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only snapshot describing one connected device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub id: DeviceId,
    /// Transport path; diagnostic first, identity second.
    pub path: String,
    pub serial: Option<String>,
    /// Model name from the matched definition.
    pub name: String,
    pub vendor: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub has_shuttle: bool,
    pub has_jog: bool,
    pub num_buttons: usize,
}

impl From<&ConnectedDevice> for DeviceSummary {
    fn from(dev: &ConnectedDevice) -> Self {
        let def = &dev.definition;
        Self {
            id: dev.id.clone(),
            path: dev.path.clone(),
            serial: dev.serial.clone(),
            name: def.name.clone(),
            vendor: def.vendor.clone(),
            vendor_id: def.vendor_id,
            product_id: def.product_id,
            has_shuttle: def.has_shuttle(),
            has_jog: def.has_jog(),
            num_buttons: def.num_buttons(),
        }
    }
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:04x}:{:04x}] at {}",
            self.name, self.vendor_id, self.product_id, self.path
        )
    }
}
