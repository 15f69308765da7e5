//! In-process fan-out of device events.
//!
//! The core hands events back as return values. [`EventBus`] is an optional
//! helper for hosts that prefer callbacks: register listeners, then pass each
//! batch of events to [`EventBus::emit_all`].

use crate::device::DeviceId;
use crate::event::DeviceEvent;
use std::collections::BTreeMap;

/// Trait for reacting to device events.
pub trait EventListener: Send {
    fn on_event(&mut self, event: &DeviceEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&DeviceEvent) + Send,
{
    fn on_event(&mut self, event: &DeviceEvent) {
        self(event)
    }
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    ShuttleOnly,
    JogOnly,
    ButtonsOnly,
    /// `Connected` / `Disconnected`.
    Lifecycle,
    Custom(fn(&DeviceEvent) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &DeviceEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::ShuttleOnly => event.kind.is_shuttle(),
            EventFilter::JogOnly => event.kind.is_jog(),
            EventFilter::ButtonsOnly => event.kind.is_button(),
            EventFilter::Lifecycle => event.kind.is_lifecycle(),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn EventListener>,
    enabled: bool,
    filter: EventFilter,
    device: Option<DeviceId>,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener, optionally restricted to one device.
    ///
    /// Listeners are called in registration order.
    pub fn add_listener(
        &mut self,
        listener: impl EventListener + 'static,
        filter: EventFilter,
        device: Option<DeviceId>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                device,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn emit(&mut self, event: &DeviceEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }
            if let Some(ref wanted) = entry.device {
                if event.device_id != *wanted {
                    continue;
                }
            }
            if entry.filter.accepts(event) {
                entry.listener.on_event(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners, preserving order.
    pub fn emit_all(&mut self, events: &[DeviceEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
