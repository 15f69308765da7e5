//! Device identity and per-device state.
//!
//! ## Identity
//! A [`DeviceId`] is derived from the device's serial number when it has one,
//! and from its transport path otherwise. The same unit reconnecting with the
//! same serial (or at the same path) gets the same id.
//!
//! The id is a SHA-256 digest rendered as lowercase hex. The hash is only used
//! to get a uniform, opaque token; it carries no security meaning.
//!
//! ## State
//! [`DeviceState`] is created fresh for every connection and dropped with it.
//! Nothing carries over a disconnect/reconnect cycle, even if the id is the same.

use crate::definition::DeviceDefinition;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Stable identity token for one physical unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Hash an arbitrary identity string.
    pub fn from_key(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        DeviceId(hex::encode(digest))
    }

    /// Serial number if present and non-empty, transport path otherwise.
    pub fn derive(serial: Option<&str>, path: &str) -> Self {
        match serial.filter(|s| !s.is_empty()) {
            Some(serial) => Self::from_key(serial),
            None => Self::from_key(path),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the enumeration layer knows about a device that just appeared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Transport path (opaque, platform-specific).
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
}

impl DeviceInfo {
    pub fn new(path: impl Into<String>, vendor_id: u16, product_id: u16) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            serial: None,
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn device_id(&self) -> DeviceId {
        DeviceId::derive(self.serial.as_deref(), &self.path)
    }
}

/// Last-seen values for one connected device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub shuttle: i64,
    pub jog: u8,
    buttons: Vec<bool>,
}

impl DeviceState {
    /// Zeroed state with `num_buttons` released buttons.
    pub fn new(num_buttons: usize) -> Self {
        Self {
            shuttle: 0,
            jog: 0,
            buttons: vec![false; num_buttons],
        }
    }

    pub fn for_definition(definition: &DeviceDefinition) -> Self {
        Self::new(definition.num_buttons())
    }

    /// Pressed flags, index `i` is button number `i + 1`.
    ///
    /// The length is fixed at construction.
    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut [bool] {
        &mut self.buttons
    }

    /// Whether 1-based `button` is currently held.
    pub fn is_pressed(&self, button: usize) -> bool {
        button
            .checked_sub(1)
            .and_then(|i| self.buttons.get(i))
            .copied()
            .unwrap_or(false)
    }
}

/// A registered device: identity, matched model and live state.
#[derive(Clone, Debug)]
pub struct ConnectedDevice {
    pub id: DeviceId,
    pub path: String,
    pub serial: Option<String>,
    pub definition: Arc<DeviceDefinition>,
    pub state: DeviceState,
}

impl ConnectedDevice {
    pub(crate) fn new(info: &DeviceInfo, definition: Arc<DeviceDefinition>) -> Self {
        Self {
            id: info.device_id(),
            path: info.path.clone(),
            serial: info.serial.clone(),
            state: DeviceState::for_definition(&definition),
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_prefers_serial_over_path() {
        let a = DeviceInfo::new("/dev/hidraw0", 1, 2).with_serial("SN-1");
        let b = DeviceInfo::new("/dev/hidraw7", 1, 2).with_serial("SN-1");
        assert_eq!(a.device_id(), b.device_id());

        let c = DeviceInfo::new("/dev/hidraw0", 1, 2);
        assert_ne!(a.device_id(), c.device_id());
        assert_eq!(c.device_id(), DeviceId::from_key("/dev/hidraw0"));
    }

    #[test]
    fn empty_serial_falls_back_to_path() {
        assert_eq!(
            DeviceId::derive(Some(""), "usb:1-2"),
            DeviceId::derive(None, "usb:1-2")
        );
    }

    #[test]
    fn id_is_hex_sha256() {
        let id = DeviceId::from_key("abc");
        assert_eq!(
            id.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn fresh_state_is_zeroed() {
        let state = DeviceState::new(3);
        assert_eq!(state.shuttle, 0);
        assert_eq!(state.jog, 0);
        assert_eq!(state.buttons(), &[false, false, false]);
        assert!(!state.is_pressed(0));
        assert!(!state.is_pressed(4));
    }
}
