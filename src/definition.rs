//! Device definition table.
//!
//! A [`DeviceDefinition`] describes one controller model: how to recognise it
//! (`vendor_id`/`product_id`), how long its reports are, where each logical
//! field lives in a report, and which bit patterns are buttons.
//!
//! Definitions are immutable once built and shared between every connected
//! unit of that model via `Arc`. A [`DefinitionTable`] is an ordered list;
//! lookups return the **first** definition whose ids match.
//!
//! # Authoring definitions
//! Besides the built-in Contour Design catalog, definitions can be loaded from
//! TOML:
//!
//! ```toml
//! [[device]]
//! name = "ShuttleXpress"
//! vendor = "Contour Design, Inc."
//! vendor_id = 0x0B33
//! product_id = 0x0020
//! packet_size = 5
//! button_masks = [0x0010, 0x0020, 0x0040, 0x0080, 0x0100]
//!
//! [device.rules.shuttle]
//! offset = 0
//! type = "i8"
//!
//! [device.rules.jog]
//! offset = 1
//! type = "u8"
//!
//! [device.rules.buttons]
//! offset = 3
//! type = "u16le"
//! ```

use crate::decode::NumericType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// USB vendor id of Contour Design, Inc.
pub const VID_CONTOUR: u16 = 0x0B33;
pub const PID_SHUTTLEPRO_V1: u16 = 0x0010;
pub const PID_SHUTTLEXPRESS: u16 = 0x0020;
pub const PID_SHUTTLEPRO_V2: u16 = 0x0030;

/// Location and encoding of one logical field inside a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Byte index of the first byte of the field.
    pub offset: usize,
    #[serde(rename = "type")]
    pub ty: NumericType,
}

impl FieldRule {
    pub const fn new(offset: usize, ty: NumericType) -> Self {
        Self { offset, ty }
    }

    fn end(&self) -> usize {
        self.offset.saturating_add(self.ty.width())
    }
}

/// Per-field decode rules. A model without a shuttle dial (say) omits that rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuttle: Option<FieldRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jog: Option<FieldRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<FieldRule>,
}

/// Static description of a controller model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    pub name: String,
    pub vendor: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Exact length of every report; reports of any other length are discarded.
    pub packet_size: usize,
    pub rules: FieldRules,
    /// Position `i` is button number `i + 1`.
    #[serde(default)]
    pub button_masks: Vec<u64>,
}

impl DeviceDefinition {
    pub fn has_shuttle(&self) -> bool {
        self.rules.shuttle.is_some()
    }

    pub fn has_jog(&self) -> bool {
        self.rules.jog.is_some()
    }

    pub fn num_buttons(&self) -> usize {
        self.button_masks.len()
    }

    /// `true` if this definition describes the device with the given ids.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// Check that every field rule fits inside `packet_size`.
    ///
    /// A validated definition can never make the decoder read out of bounds
    /// for a report that passed the length check.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidDefinition {
            name: self.name.clone(),
            reason,
        };

        if self.packet_size == 0 {
            return Err(invalid("packet_size must be non-zero".into()));
        }

        let rules = [
            ("shuttle", self.rules.shuttle),
            ("jog", self.rules.jog),
            ("buttons", self.rules.buttons),
        ];
        if rules.iter().all(|(_, r)| r.is_none()) {
            return Err(invalid("no field rules".into()));
        }
        for (field, rule) in rules {
            if let Some(rule) = rule {
                if rule.end() > self.packet_size {
                    return Err(invalid(format!(
                        "{field} rule ({} at offset {}) exceeds packet_size {}",
                        rule.ty, rule.offset, self.packet_size
                    )));
                }
            }
        }

        if !self.button_masks.is_empty() && self.rules.buttons.is_none() {
            return Err(invalid("button_masks given without a buttons rule".into()));
        }
        if let Some(idx) = self.button_masks.iter().position(|&m| m == 0) {
            return Err(invalid(format!("button mask #{} is zero", idx + 1)));
        }

        Ok(())
    }
}

/// The field layout shared by every Contour Design model.
fn contour(name: &str, product_id: u16, button_masks: Vec<u64>) -> DeviceDefinition {
    DeviceDefinition {
        name: name.to_string(),
        vendor: "Contour Design, Inc.".to_string(),
        vendor_id: VID_CONTOUR,
        product_id,
        packet_size: 5,
        rules: FieldRules {
            shuttle: Some(FieldRule::new(0, NumericType::I8)),
            jog: Some(FieldRule::new(1, NumericType::U8)),
            buttons: Some(FieldRule::new(3, NumericType::U16Le)),
        },
        button_masks,
    }
}

/// `[1, 2, 4, ...]` with `count` entries.
fn single_bits(count: u32) -> Vec<u64> {
    (0..count).map(|bit| 1u64 << bit).collect()
}

#[derive(Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    device: Vec<DeviceDefinition>,
}

/// Ordered catalog of known models; lookups take the first match.
#[derive(Clone, Debug, Default)]
pub struct DefinitionTable {
    definitions: Vec<Arc<DeviceDefinition>>,
}

impl DefinitionTable {
    /// An empty table (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// ShuttleXpress, ShuttlePro v1 and ShuttlePro v2.
    pub fn builtin() -> Self {
        let definitions = vec![
            contour(
                "ShuttleXpress",
                PID_SHUTTLEXPRESS,
                vec![0x0010, 0x0020, 0x0040, 0x0080, 0x0100],
            ),
            contour("ShuttlePro v1", PID_SHUTTLEPRO_V1, single_bits(13)),
            contour("ShuttlePro v2", PID_SHUTTLEPRO_V2, single_bits(15)),
        ];
        Self {
            definitions: definitions.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build a table from definitions, validating each one.
    pub fn from_definitions(definitions: impl IntoIterator<Item = DeviceDefinition>) -> Result<Self> {
        let mut table = Self::new();
        for def in definitions {
            table.push(def)?;
        }
        Ok(table)
    }

    /// Parse `[[device]]` tables from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: DefinitionFile = toml::from_str(s)?;
        Self::from_definitions(file.device)
    }

    /// Read and parse a TOML definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            count = table.len(),
            "loaded device definitions"
        );
        Ok(table)
    }

    /// Append a validated definition. It matches after every existing entry.
    pub fn push(&mut self, definition: DeviceDefinition) -> Result<()> {
        definition.validate()?;
        self.definitions.push(Arc::new(definition));
        Ok(())
    }

    /// Append all of `other`'s definitions after this table's.
    pub fn extend(&mut self, other: DefinitionTable) {
        self.definitions.extend(other.definitions);
    }

    /// First definition matching `(vendor_id, product_id)`.
    pub fn find(&self, vendor_id: u16, product_id: u16) -> Option<&Arc<DeviceDefinition>> {
        self.definitions
            .iter()
            .find(|d| d.matches(vendor_id, product_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DeviceDefinition>> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
