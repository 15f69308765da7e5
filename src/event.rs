//! Events produced from device reports and connection changes.
//!
//! Every change is an edge: a value is reported only when it differs from the
//! last one seen for that device. Within one report the order is fixed:
//! shuttle events, then jog events, then button edges in button order.
//!
//! ## Value conventions
//! - **Shuttle:** signed displacement from center, `0` = released.
//! - **Jog:** raw 8-bit counter; only [`JogDirection`] carries meaning.
//! - **Buttons:** 1-based numbers, position in the model's mask list.

use crate::device::DeviceId;
use serde::{Deserialize, Serialize};

/// Rotation direction of the jog wheel between two reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JogDirection {
    Clockwise,
    CounterClockwise,
}

impl JogDirection {
    /// Direction of travel from `old` to `new` on an 8-bit wrapping counter.
    ///
    /// `0xFF -> 0x00` is forward and `0x00 -> 0xFF` is backward; every other
    /// pair is plain numeric comparison. Larger skips across the wrap point
    /// are not detected.
    pub fn between(old: u8, new: u8) -> Self {
        let wrapped_forward = old == 0xFF && new == 0x00;
        let wrapped_backward = old == 0x00 && new == 0xFF;
        if wrapped_forward || (!wrapped_backward && old < new) {
            JogDirection::Clockwise
        } else {
            JogDirection::CounterClockwise
        }
    }

    /// `+1` for clockwise, `-1` for counter-clockwise.
    pub const fn signum(self) -> i8 {
        match self {
            JogDirection::Clockwise => 1,
            JogDirection::CounterClockwise => -1,
        }
    }
}

/// What happened on a device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    /// A device matched a definition and was registered.
    Connected {
        path: String,
        name: String,
        has_shuttle: bool,
        has_jog: bool,
        num_buttons: usize,
    },

    /// A device was removed or its transport failed.
    Disconnected,

    /// New shuttle position.
    ShuttlePosition { value: i64 },

    /// Shuttle moved from `old` to `new`. Always follows the matching `ShuttlePosition`.
    ShuttleTransition { old: i64, new: i64 },

    /// New raw jog counter value.
    JogPosition { value: u8 },

    /// Jog direction. Always follows the matching `JogPosition`.
    JogDirection { direction: JogDirection },

    /// A button transitioned to pressed.
    ButtonDown { button: u16 },

    /// A button transitioned to released.
    ButtonUp { button: u16 },
}

impl EventKind {
    pub fn is_shuttle(&self) -> bool {
        matches!(
            self,
            EventKind::ShuttlePosition { .. } | EventKind::ShuttleTransition { .. }
        )
    }

    pub fn is_jog(&self) -> bool {
        matches!(self, EventKind::JogPosition { .. } | EventKind::JogDirection { .. })
    }

    pub fn is_button(&self) -> bool {
        matches!(self, EventKind::ButtonDown { .. } | EventKind::ButtonUp { .. })
    }

    pub fn is_lifecycle(&self) -> bool {
        matches!(self, EventKind::Connected { .. } | EventKind::Disconnected)
    }
}

/// An [`EventKind`] tagged with the device it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub device_id: DeviceId,
    pub kind: EventKind,
}

impl DeviceEvent {
    pub fn new(device_id: DeviceId, kind: EventKind) -> Self {
        Self { device_id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn jog_wraparound() {
        assert_eq!(JogDirection::between(0xFF, 0x00), JogDirection::Clockwise);
        assert_eq!(JogDirection::between(0x00, 0xFF), JogDirection::CounterClockwise);
        assert_eq!(JogDirection::between(0x10, 0x20), JogDirection::Clockwise);
        assert_eq!(JogDirection::between(0x20, 0x10), JogDirection::CounterClockwise);
    }

    #[test]
    fn large_skip_uses_plain_comparison() {
        // 0x05 -> 0xF0 may physically be a backward wrap; it is still reported forward.
        assert_eq!(JogDirection::between(0x05, 0xF0), JogDirection::Clockwise);
        assert_eq!(JogDirection::between(0xF0, 0x05), JogDirection::CounterClockwise);
    }

    #[test]
    fn signum_matches_direction() {
        assert_eq!(JogDirection::Clockwise.signum(), 1);
        assert_eq!(JogDirection::CounterClockwise.signum(), -1);
    }

    #[test]
    fn kinds_classify() {
        assert!(EventKind::ShuttleTransition { old: 0, new: 1 }.is_shuttle());
        assert!(EventKind::JogPosition { value: 3 }.is_jog());
        assert!(EventKind::ButtonUp { button: 1 }.is_button());
        assert!(EventKind::Disconnected.is_lifecycle());
        assert!(!EventKind::ButtonDown { button: 1 }.is_lifecycle());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let ev = DeviceEvent::new(
            DeviceId::from_key("x"),
            EventKind::ButtonDown { button: 5 },
        );
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"]["type"], "ButtonDown");
        assert_eq!(json["kind"]["button"], 5);
        assert_eq!(json["device_id"], DeviceId::from_key("x").as_str());
    }

    proptest! {
        #[test]
        fn non_boundary_moves_compare_numerically(old in 0u8..=255, new in 0u8..=255) {
            prop_assume!(old != new);
            prop_assume!(!(old == 0xFF && new == 0x00) && !(old == 0x00 && new == 0xFF));
            let expected = if old < new {
                JogDirection::Clockwise
            } else {
                JogDirection::CounterClockwise
            };
            prop_assert_eq!(JogDirection::between(old, new), expected);
        }
    }
}
