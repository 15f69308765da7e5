//! Device registry.
//!
//! The [`Registry`] is the entry point for the transport layer. It reacts to
//! three notifications:
//!
//! - [`on_device_appeared`](Registry::on_device_appeared): match the device
//!   against the [`DefinitionTable`] and register it with fresh state.
//! - [`on_device_removed`](Registry::on_device_removed): forget it.
//! - [`on_data_received`](Registry::on_data_received): run a report through
//!   the [packet processor](crate::processor) for that device.
//!
//! The registry never blocks or performs I/O. It assumes notifications are
//! delivered one at a time; a host that delivers them from several threads
//! should wrap the whole registry in one `Mutex`.
//!
//! # Example
//! ```
//! use shuttle_jog::{DeviceInfo, EventKind, Registry};
//!
//! let mut registry = Registry::builtin();
//! let info = DeviceInfo::new("usb:1-4", 0x0B33, 0x0020).with_serial("A1");
//! let connected = registry.on_device_appeared(&info).event();
//! assert!(matches!(connected.map(|e| e.kind), Some(EventKind::Connected { .. })));
//!
//! let events = registry.on_data_received(&info.device_id(), &[0x00, 0x01, 0x00, 0x00, 0x00]);
//! assert_eq!(events[0].kind, EventKind::JogPosition { value: 1 });
//! ```

use crate::definition::DefinitionTable;
use crate::device::{ConnectedDevice, DeviceId, DeviceInfo};
use crate::event::{DeviceEvent, EventKind};
use crate::metadata::DeviceSummary;
use crate::processor;
use crate::snapshot::Snapshot;
use std::collections::HashMap;

/// Outcome of [`Registry::on_device_appeared`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discovery {
    /// Newly registered.
    Connected(DeviceSummary),
    /// A device at this path was already registered; nothing changed.
    AlreadyConnected(DeviceSummary),
    /// No definition matches the vendor/product ids. The device is ignored.
    NoMatch,
}

impl Discovery {
    /// The `Connected` event, only for a new connection.
    pub fn event(&self) -> Option<DeviceEvent> {
        match self {
            Discovery::Connected(summary) => Some(connected_event(summary)),
            Discovery::AlreadyConnected(_) | Discovery::NoMatch => None,
        }
    }

    /// The registered device, new or existing.
    pub fn summary(&self) -> Option<&DeviceSummary> {
        match self {
            Discovery::Connected(s) | Discovery::AlreadyConnected(s) => Some(s),
            Discovery::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Discovery::NoMatch)
    }
}

fn connected_event(summary: &DeviceSummary) -> DeviceEvent {
    DeviceEvent::new(
        summary.id.clone(),
        EventKind::Connected {
            path: summary.path.clone(),
            name: summary.name.clone(),
            has_shuttle: summary.has_shuttle,
            has_jog: summary.has_jog,
            num_buttons: summary.num_buttons,
        },
    )
}

/// Set of currently connected devices, keyed by [`DeviceId`] with a path index.
#[derive(Debug, Default)]
pub struct Registry {
    table: DefinitionTable,
    devices: HashMap<DeviceId, ConnectedDevice>,
    by_path: HashMap<String, DeviceId>,
}

impl Registry {
    pub fn new(table: DefinitionTable) -> Self {
        Self {
            table,
            devices: HashMap::new(),
            by_path: HashMap::new(),
        }
    }

    /// Registry over [`DefinitionTable::builtin`].
    pub fn builtin() -> Self {
        Self::new(DefinitionTable::builtin())
    }

    pub fn definitions(&self) -> &DefinitionTable {
        &self.table
    }

    /// A device showed up on the transport.
    ///
    /// Re-discovery of an already registered path is a no-op. If the derived id
    /// is registered under another path (the unit re-enumerated before its
    /// removal was seen), the stale entry is replaced with fresh state.
    pub fn on_device_appeared(&mut self, info: &DeviceInfo) -> Discovery {
        if let Some(existing) = self.find_by_path(&info.path) {
            return Discovery::AlreadyConnected(DeviceSummary::from(existing));
        }

        let Some(definition) = self.table.find(info.vendor_id, info.product_id) else {
            tracing::debug!(
                path = %info.path,
                vid = info.vendor_id,
                pid = info.product_id,
                "no definition for device; ignoring"
            );
            return Discovery::NoMatch;
        };

        let device = ConnectedDevice::new(info, definition.clone());
        if let Some(stale) = self.devices.remove(&device.id) {
            tracing::warn!(
                id = %device.id,
                old_path = %stale.path,
                new_path = %device.path,
                "device moved paths; replacing stale entry"
            );
            self.by_path.remove(&stale.path);
        }

        let summary = DeviceSummary::from(&device);
        tracing::info!(
            id = %device.id,
            path = %device.path,
            name = %device.name(),
            "device connected"
        );
        self.by_path.insert(device.path.clone(), device.id.clone());
        self.devices.insert(device.id.clone(), device);
        Discovery::Connected(summary)
    }

    /// Forget a device. Returns the `Disconnected` event if it was registered.
    pub fn on_device_removed(&mut self, id: &DeviceId) -> Option<DeviceEvent> {
        let device = self.devices.remove(id)?;
        self.by_path.remove(&device.path);
        tracing::info!(id = %device.id, path = %device.path, "device disconnected");
        Some(DeviceEvent::new(device.id, EventKind::Disconnected))
    }

    /// Same as [`on_device_removed`](Self::on_device_removed), keyed by transport path.
    pub fn on_path_removed(&mut self, path: &str) -> Option<DeviceEvent> {
        let id = self.by_path.get(path)?.clone();
        self.on_device_removed(&id)
    }

    /// Process a report from device `id`.
    ///
    /// Data for an unknown id (e.g. delivered after disconnect) yields nothing.
    pub fn on_data_received(&mut self, id: &DeviceId, report: &[u8]) -> Vec<DeviceEvent> {
        let Some(device) = self.devices.get_mut(id) else {
            tracing::debug!(id = %id, len = report.len(), "data for unknown device; ignoring");
            return Vec::new();
        };

        processor::process(report, &device.definition, &mut device.state)
            .into_iter()
            .map(|kind| DeviceEvent::new(device.id.clone(), kind))
            .collect()
    }

    /// Summaries of all connected devices, ordered by path.
    pub fn list(&self) -> Vec<DeviceSummary> {
        let mut out: Vec<DeviceSummary> = self.devices.values().map(DeviceSummary::from).collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    pub fn find_by_id(&self, id: &DeviceId) -> Option<&ConnectedDevice> {
        self.devices.get(id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<&ConnectedDevice> {
        self.by_path.get(path).and_then(|id| self.devices.get(id))
    }

    /// Copy of every connected device's state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(
            self.devices
                .iter()
                .map(|(id, dev)| (id.clone(), dev.state.clone()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{PID_SHUTTLEPRO_V2, PID_SHUTTLEXPRESS, VID_CONTOUR};

    fn xpress(path: &str) -> DeviceInfo {
        DeviceInfo::new(path, VID_CONTOUR, PID_SHUTTLEXPRESS)
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut reg = Registry::builtin();
        let d = reg.on_device_appeared(&DeviceInfo::new("p", 0x1234, 0x5678));
        assert_eq!(d, Discovery::NoMatch);
        assert!(d.event().is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn rediscovery_by_path_is_idempotent() {
        let mut reg = Registry::builtin();
        let first = reg.on_device_appeared(&xpress("usb:1"));
        let second = reg.on_device_appeared(&xpress("usb:1"));

        assert!(first.event().is_some());
        assert!(second.event().is_none());
        assert!(matches!(second, Discovery::AlreadyConnected(_)));
        assert_eq!(first.summary(), second.summary());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn connected_event_describes_model() {
        let mut reg = Registry::builtin();
        let info = DeviceInfo::new("usb:2", VID_CONTOUR, PID_SHUTTLEPRO_V2);
        let ev = reg.on_device_appeared(&info).event().unwrap();
        assert_eq!(ev.device_id, info.device_id());
        assert_eq!(
            ev.kind,
            EventKind::Connected {
                path: "usb:2".into(),
                name: "ShuttlePro v2".into(),
                has_shuttle: true,
                has_jog: true,
                num_buttons: 15,
            }
        );
    }

    #[test]
    fn lookup_by_id_and_path() {
        let mut reg = Registry::builtin();
        let info = xpress("usb:3").with_serial("S3");
        reg.on_device_appeared(&info);

        let id = info.device_id();
        assert_eq!(reg.find_by_id(&id).map(|d| d.path.as_str()), Some("usb:3"));
        assert_eq!(reg.find_by_path("usb:3").map(|d| &d.id), Some(&id));
        assert!(reg.find_by_path("usb:4").is_none());
        assert!(reg.find_by_id(&DeviceId::from_key("nope")).is_none());
    }

    #[test]
    fn removal_is_idempotent() {
        let mut reg = Registry::builtin();
        let info = xpress("usb:5");
        reg.on_device_appeared(&info);

        let ev = reg.on_device_removed(&info.device_id()).unwrap();
        assert_eq!(ev.kind, EventKind::Disconnected);
        assert!(reg.on_device_removed(&info.device_id()).is_none());
        assert!(reg.find_by_path("usb:5").is_none());
        assert!(reg.on_path_removed("usb:5").is_none());
    }

    #[test]
    fn remove_by_path() {
        let mut reg = Registry::builtin();
        let info = xpress("usb:6");
        reg.on_device_appeared(&info);
        let ev = reg.on_path_removed("usb:6").unwrap();
        assert_eq!(ev.device_id, info.device_id());
        assert!(reg.is_empty());
    }

    #[test]
    fn same_serial_new_path_replaces_stale_entry() {
        let mut reg = Registry::builtin();
        let old = xpress("usb:7").with_serial("S7");
        reg.on_device_appeared(&old);
        reg.on_data_received(&old.device_id(), &[0x04, 0x00, 0x00, 0x00, 0x00]);

        let moved = xpress("usb:8").with_serial("S7");
        let d = reg.on_device_appeared(&moved);
        assert!(matches!(d, Discovery::Connected(_)));
        assert_eq!(reg.len(), 1);
        assert!(reg.find_by_path("usb:7").is_none());
        assert_eq!(reg.find_by_id(&moved.device_id()).unwrap().state.shuttle, 0);
    }

    #[test]
    fn stale_data_yields_nothing() {
        let mut reg = Registry::builtin();
        let events = reg.on_data_received(&DeviceId::from_key("gone"), &[0; 5]);
        assert!(events.is_empty());
    }

    #[test]
    fn events_are_tagged_with_device() {
        let mut reg = Registry::builtin();
        let a = xpress("usb:a");
        let b = xpress("usb:b");
        reg.on_device_appeared(&a);
        reg.on_device_appeared(&b);

        let events = reg.on_data_received(&b.device_id(), &[0x00, 0x00, 0x00, 0x20, 0x00]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].device_id, b.device_id());
        assert_eq!(events[0].kind, EventKind::ButtonDown { button: 2 });

        let snap = reg.snapshot();
        assert!(snap.get(&b.device_id()).unwrap().is_pressed(2));
        assert!(!snap.get(&a.device_id()).unwrap().is_pressed(2));
    }

    #[test]
    fn list_is_sorted_by_path() {
        let mut reg = Registry::builtin();
        reg.on_device_appeared(&xpress("usb:z"));
        reg.on_device_appeared(&xpress("usb:m"));
        let paths: Vec<_> = reg.list().into_iter().map(|s| s.path).collect();
        assert_eq!(paths, vec!["usb:m".to_string(), "usb:z".to_string()]);
    }

    #[test]
    fn registry_can_be_shared_behind_a_mutex() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
