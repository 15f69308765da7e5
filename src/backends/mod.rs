//! Report transports for `shuttle-jog`.
//!
//! A [`Transport`] is an open handle to one device that hands back raw
//! reports. The [`Manager`](crate::manager::Manager) owns one per connected
//! device and feeds what it reads into the registry.
//!
//! # Feature flags
//! - **`hid`** — enables the `hidapi` transport and discovery.
//!
//! [`virtual_input::VirtualTransport`] is always available; it replays
//! scripted reports and is what tests and demos use.

use crate::error::Result;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;
pub mod virtual_input;

/// Source of raw reports for one open device.
pub trait Transport: Send {
    /// Transport path of the device.
    fn path(&self) -> &str;

    /// Copy the next pending report into `buf` without blocking.
    ///
    /// Returns the report length, or `0` if nothing is pending. An error
    /// means the device is gone and the transport will not recover.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}
