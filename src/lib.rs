//! shuttle-jog — event decoding for jog/shuttle controllers.
//!
//! Turns the fixed-length reports of Contour ShuttleXpress / ShuttlePro
//! devices (or any model described by a [`DeviceDefinition`]) into
//! edge-triggered events: shuttle position changes, jog direction, and
//! button press/release. A [`Registry`] tracks attached devices and gives each
//! a stable [`DeviceId`] across reconnects.
//!
//! The core does no I/O: the host feeds it "device appeared", "device
//! removed" and "data received" notifications and gets [`DeviceEvent`]s back.
//! [`Manager`] is an optional layer that owns [`Transport`]s and drives reads.

pub mod backends;
pub mod decode;
pub mod definition;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod processor;
pub mod registry;
pub mod snapshot;

pub use backends::Transport;
pub use decode::*;
pub use definition::*;
pub use device::*;
pub use error::{Error, Result};
pub use event::*;
pub use eventbus::*;
pub use filtered_listener::FilteredListener;
pub use logger::Logger;
pub use manager::*;
pub use metadata::*;
pub use processor::process;
pub use registry::*;
pub use snapshot::*;
