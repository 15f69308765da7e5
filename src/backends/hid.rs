//! `hidapi` transport.
//!
//! Enumerates HID devices, keeps the ones the [`DefinitionTable`] knows, and
//! wraps each open handle as a non-blocking [`Transport`].

use crate::backends::Transport;
use crate::definition::DefinitionTable;
use crate::device::DeviceInfo;
use crate::error::Result;
use hidapi::{HidApi, HidDevice};

/// Open `hidapi` handle for one matched device.
pub struct HidTransport {
    path: String,
    raw: HidDevice,
}

impl HidTransport {
    /// Open a device entry in non-blocking mode.
    pub fn open(info: &hidapi::DeviceInfo, api: &HidApi) -> Result<Self> {
        let raw = info.open_device(api)?;
        raw.set_blocking_mode(false)?;
        Ok(Self {
            path: info.path().to_string_lossy().into_owned(),
            raw,
        })
    }
}

impl Transport for HidTransport {
    fn path(&self) -> &str {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.raw.read(buf)?)
    }
}

/// Convert a `hidapi` entry into the registry's [`DeviceInfo`].
pub fn device_info(info: &hidapi::DeviceInfo) -> DeviceInfo {
    DeviceInfo {
        path: info.path().to_string_lossy().into_owned(),
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        serial: info
            .serial_number()
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
    }
}

/// Open every enumerated device that matches a definition in `table`.
///
/// Devices that match but fail to open are logged and skipped. `skip` lets
/// the caller exclude paths it already has open.
pub fn probe_devices(
    api: &HidApi,
    table: &DefinitionTable,
    skip: impl Fn(&str) -> bool,
) -> Vec<(DeviceInfo, HidTransport)> {
    let mut found = Vec::new();
    for entry in api.device_list() {
        let info = device_info(entry);
        if table.find(info.vendor_id, info.product_id).is_none() || skip(&info.path) {
            continue;
        }
        match HidTransport::open(entry, api) {
            Ok(transport) => found.push((info, transport)),
            Err(e) => {
                tracing::warn!(path = %info.path, error = %e, "failed to open matched device");
            }
        }
    }
    found
}
