use crate::event::DeviceEvent;
use crate::eventbus::EventListener;

/// Wraps a listener and filters events based on a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&DeviceEvent) -> bool + Send + Sync>,
    inner: Box<dyn EventListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&DeviceEvent) -> bool + Send + Sync + 'static,
        inner: impl EventListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl EventListener for FilteredListener {
    fn on_event(&mut self, event: &DeviceEvent) {
        if (self.predicate)(event) {
            self.inner.on_event(event);
        }
    }
}
