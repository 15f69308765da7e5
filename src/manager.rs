//! Registry plus open transports.
//!
//! [`Manager`] is the glue a host uses when it wants this crate to drive the
//! reads itself: it owns a [`Registry`] and one [`Transport`] per connected
//! device, and [`poll_events`](Manager::poll_events) drains pending reports
//! into events. A transport read error drops the device and yields
//! `Disconnected`.
//!
//! Hotplug notification stays with the host: call [`attach`](Manager::attach)
//! (or `rescan` with the `hid` feature) when a device appears.

use crate::backends::Transport;
use crate::definition::DefinitionTable;
use crate::device::{DeviceId, DeviceInfo};
use crate::event::DeviceEvent;
use crate::registry::{Discovery, Registry};
use std::collections::BTreeMap;

/// Maximum number of reports drained per device per `poll_events()` call.
///
/// Keeps one chatty device from starving the rest.
const MAX_REPORTS_PER_TICK: usize = 32;

/// Read buffer size; longer than any supported report so oversize reads are seen.
const READ_BUF_LEN: usize = 64;

pub struct Manager {
    registry: Registry,
    links: BTreeMap<DeviceId, Box<dyn Transport>>,
    pending: Vec<DeviceEvent>,
    buf: Vec<u8>,
    #[cfg(feature = "hid")]
    api: Option<hidapi::HidApi>,
}

impl Manager {
    pub fn new(table: DefinitionTable) -> Self {
        let buf_len = table
            .iter()
            .map(|d| d.packet_size + 1)
            .max()
            .unwrap_or(0)
            .max(READ_BUF_LEN);
        Self {
            registry: Registry::new(table),
            links: BTreeMap::new(),
            pending: Vec::new(),
            buf: vec![0u8; buf_len],
            #[cfg(feature = "hid")]
            api: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a device and take ownership of its transport.
    ///
    /// Returns the `Connected` event for a new device. Unmatched devices and
    /// re-discovered paths yield `None`; their transport is dropped.
    pub fn attach(&mut self, info: &DeviceInfo, transport: Box<dyn Transport>) -> Option<DeviceEvent> {
        let discovery = self.registry.on_device_appeared(info);
        if let Discovery::Connected(summary) = &discovery {
            self.links.insert(summary.id.clone(), transport);
        }
        discovery.event()
    }

    /// Close a device's transport and unregister it.
    pub fn detach(&mut self, id: &DeviceId) -> Option<DeviceEvent> {
        self.links.remove(id);
        self.registry.on_device_removed(id)
    }

    /// Drain pending reports from every transport and return the resulting events.
    pub fn poll_events(&mut self) -> Vec<DeviceEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let mut failed = Vec::new();

        for (id, transport) in self.links.iter_mut() {
            for _ in 0..MAX_REPORTS_PER_TICK {
                match transport.read(&mut self.buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let report = self.buf.get(..n).unwrap_or(&[]);
                        events.extend(self.registry.on_data_received(id, report));
                    }
                    Err(e) => {
                        tracing::warn!(
                            id = %id,
                            path = %transport.path(),
                            error = %e,
                            "read failed; dropping device"
                        );
                        failed.push(id.clone());
                        break;
                    }
                }
            }
        }

        for id in failed {
            events.extend(self.detach(&id));
        }
        events
    }
}

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
impl Manager {
    /// Open `hidapi` and attach every device matching the built-in table.
    ///
    /// The `Connected` events are returned by the first `poll_events()`.
    pub fn discover() -> crate::Result<Self> {
        Self::discover_with(DefinitionTable::builtin())
    }

    pub fn discover_with(table: DefinitionTable) -> crate::Result<Self> {
        let mut manager = Self::new(table);
        manager.api = Some(hidapi::HidApi::new()?);
        let events = manager.rescan()?;
        manager.pending.extend(events);
        Ok(manager)
    }

    /// Re-enumerate HID devices and attach matching ones not yet open.
    pub fn rescan(&mut self) -> crate::Result<Vec<DeviceEvent>> {
        match self.api.as_mut() {
            Some(api) => api.refresh_devices()?,
            None => self.api = Some(hidapi::HidApi::new()?),
        }
        let Some(api) = self.api.as_ref() else {
            return Ok(Vec::new());
        };

        let registry = &self.registry;
        let found = crate::backends::hid::probe_devices(api, registry.definitions(), |path| {
            registry.find_by_path(path).is_some()
        });
        tracing::debug!(count = found.len(), "probed hid devices");

        let mut events = Vec::new();
        for (info, transport) in found {
            events.extend(self.attach(&info, Box::new(transport)));
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualTransport;
    use crate::definition::{PID_SHUTTLEXPRESS, VID_CONTOUR};
    use crate::event::EventKind;

    fn xpress(path: &str) -> DeviceInfo {
        DeviceInfo::new(path, VID_CONTOUR, PID_SHUTTLEXPRESS)
    }

    #[test]
    fn attach_then_poll() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = xpress("virtual:0");
        let transport = VirtualTransport::new("virtual:0")
            .with_report(&[0x00, 0x01, 0x00, 0x00, 0x00])
            .with_report(&[0x00, 0x01, 0x00, 0x00]);

        let connected = mgr.attach(&info, Box::new(transport)).unwrap();
        assert!(connected.kind.is_lifecycle());

        let events = mgr.poll_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::JogPosition { value: 1 });
        assert!(mgr.poll_events().is_empty());
    }

    #[test]
    fn oversize_reports_are_discarded() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = xpress("virtual:1");
        let transport = VirtualTransport::new("virtual:1").with_report(&[0x05; 6]);
        mgr.attach(&info, Box::new(transport));
        assert!(mgr.poll_events().is_empty());
    }

    #[test]
    fn unmatched_device_is_not_attached() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = DeviceInfo::new("virtual:2", 0x0001, 0x0002);
        assert!(mgr.attach(&info, Box::new(VirtualTransport::new("virtual:2"))).is_none());
        assert!(mgr.registry().is_empty());
    }

    #[test]
    fn read_error_disconnects() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = xpress("virtual:3");
        let transport = VirtualTransport::new("virtual:3")
            .with_report(&[0x00, 0x00, 0x00, 0x10, 0x00])
            .fail_after_drain();
        mgr.attach(&info, Box::new(transport));

        let events = mgr.poll_events();
        assert_eq!(
            events.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
            vec![EventKind::ButtonDown { button: 1 }, EventKind::Disconnected]
        );
        assert!(mgr.registry().is_empty());
        assert!(mgr.poll_events().is_empty());
    }

    #[test]
    fn drain_is_bounded_per_tick() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = xpress("virtual:4");
        let mut transport = VirtualTransport::new("virtual:4");
        for i in 0..40u8 {
            transport.feed(&[0x00, i + 1, 0x00, 0x00, 0x00]);
        }
        mgr.attach(&info, Box::new(transport));

        // Two events per jog step.
        assert_eq!(mgr.poll_events().len(), 2 * MAX_REPORTS_PER_TICK);
        assert_eq!(mgr.poll_events().len(), 2 * (40 - MAX_REPORTS_PER_TICK));
    }

    #[test]
    fn detach_is_idempotent() {
        let mut mgr = Manager::new(DefinitionTable::builtin());
        let info = xpress("virtual:5");
        mgr.attach(&info, Box::new(VirtualTransport::new("virtual:5")));
        assert!(mgr.detach(&info.device_id()).is_some());
        assert!(mgr.detach(&info.device_id()).is_none());
    }
}
