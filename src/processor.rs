//! Packet processor.
//!
//! Turns one raw report into edge-triggered [`EventKind`]s by decoding every
//! field and diffing it against the device's [`DeviceState`].
//!
//! This module does **not**:
//! - know which device a report came from (the registry tags events)
//! - buffer, reorder or coalesce reports

use crate::decode::decode;
use crate::definition::{DeviceDefinition, FieldRule};
use crate::device::DeviceState;
use crate::error::Result;
use crate::event::{EventKind, JogDirection};

struct Decoded {
    shuttle: Option<i64>,
    jog: Option<u8>,
    buttons: Option<u64>,
}

fn read(report: &[u8], rule: Option<FieldRule>) -> Result<Option<i128>> {
    rule.map(|r| decode(report, r.offset, r.ty)).transpose()
}

/// Decode all fields up front so a failure leaves the state untouched.
fn decode_fields(report: &[u8], definition: &DeviceDefinition) -> Result<Decoded> {
    let rules = &definition.rules;
    Ok(Decoded {
        // 64-bit unsigned shuttle values beyond i64 saturate.
        shuttle: read(report, rules.shuttle)?
            .map(|v| i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })),
        // The jog counter is 8 bits wide whatever the field width.
        jog: read(report, rules.jog)?.map(|v| (v & 0xFF) as u8),
        // Two's-complement bit pattern for the mask test.
        buttons: read(report, rules.buttons)?.map(|v| v as u64),
    })
}

/// Process one report for a device described by `definition`.
///
/// Reports whose length differs from `definition.packet_size` are discarded
/// without touching `state`. Otherwise `state` is updated to the decoded
/// values and the resulting edges are returned in order: shuttle, jog,
/// buttons (by mask position).
pub fn process(report: &[u8], definition: &DeviceDefinition, state: &mut DeviceState) -> Vec<EventKind> {
    let mut events = Vec::new();

    if report.len() != definition.packet_size {
        tracing::debug!(
            device = %definition.name,
            expected = definition.packet_size,
            actual = report.len(),
            "discarding report of unexpected length"
        );
        return events;
    }

    let decoded = match decode_fields(report, definition) {
        Ok(d) => d,
        Err(e) => {
            // Unreachable for a validated definition.
            tracing::error!(device = %definition.name, error = %e, "report decode failed");
            return events;
        }
    };

    if let Some(shuttle) = decoded.shuttle {
        if shuttle != state.shuttle {
            events.push(EventKind::ShuttlePosition { value: shuttle });
            events.push(EventKind::ShuttleTransition {
                old: state.shuttle,
                new: shuttle,
            });
            state.shuttle = shuttle;
        }
    }

    if let Some(jog) = decoded.jog {
        if jog != state.jog {
            let direction = JogDirection::between(state.jog, jog);
            state.jog = jog;
            events.push(EventKind::JogPosition { value: jog });
            events.push(EventKind::JogDirection { direction });
        }
    }

    if let Some(raw) = decoded.buttons {
        for ((idx, mask), held) in definition
            .button_masks
            .iter()
            .enumerate()
            .zip(state.buttons_mut().iter_mut())
        {
            let pressed = raw & mask != 0;
            let button = u16::try_from(idx + 1).unwrap_or(u16::MAX);
            if pressed && !*held {
                events.push(EventKind::ButtonDown { button });
            } else if !pressed && *held {
                events.push(EventKind::ButtonUp { button });
            }
            *held = pressed;
        }
    }

    events
}
