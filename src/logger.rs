use crate::event::DeviceEvent;
use crate::eventbus::EventListener;

/// A listener that logs every event through `tracing` as a JSON object.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }

    /// JSON line for an event, as logged by [`on_event`](EventListener::on_event).
    pub fn render(event: &DeviceEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|e| format!("{event:?} ({e})"))
    }
}

impl EventListener for Logger {
    fn on_event(&mut self, event: &DeviceEvent) {
        tracing::info!(target: "shuttle_jog::event", event = %Self::render(event));
    }
}
