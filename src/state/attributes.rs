// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical state attributes.
//!
//! Attributes are the consumer-facing state model derived from raw property
//! reports. Each attribute has an identity key (its kind, plus a sub-kind
//! where one kind covers several independent slots) and the store never
//! holds two attributes with the same key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical high-level device status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusValue {
    /// Parked on the charger.
    Docked,
    /// Powered on, doing nothing.
    Idle,
    /// Driving back to the charger.
    Returning,
    /// Actively cleaning.
    Cleaning,
    /// Job suspended, resumable.
    Paused,
    /// Driving without cleaning (locating, mapping, going to a target).
    Moving,
    /// Stopped on a device fault.
    Error,
}

impl StatusValue {
    /// Whether this status describes the robot actively driving around.
    ///
    /// Active states keep the map changing, so they gate map refreshes.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Cleaning | Self::Returning | Self::Moving)
    }
}

/// Qualifier refining a [`StatusValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFlag {
    /// Cleanup restricted to drawn zones.
    Zone,
    /// Cleanup restricted to selected segments.
    Segment,
    /// Spot cleanup around a point.
    Spot,
    /// Moving towards a goto target.
    Target,
    /// Parked with a job pending resume.
    Resumable,
    /// Building a map without cleaning.
    Mapping,
}

/// The composite status attribute.
///
/// Always derived whole from the reconciler's scalar snapshot; never
/// patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAttribute {
    /// Canonical status value.
    pub value: StatusValue,
    /// Optional qualifier.
    pub flag: Option<StatusFlag>,
    /// Diagnostic metadata (raw error code and description on faults).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl StatusAttribute {
    /// Creates a status without flag or metadata.
    #[must_use]
    pub fn new(value: StatusValue) -> Self {
        Self {
            value,
            flag: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Battery charge attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryAttribute {
    /// Charge level in percent (0-100).
    pub level: u8,
}

/// Components that can be physically attached to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    /// The water tank.
    Watertank,
    /// The mop pad. Reported through the same vendor property as the tank.
    Mop,
}

/// Attachment presence attribute. Keyed by attachment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentAttribute {
    /// Which component this describes.
    pub kind: AttachmentType,
    /// Whether the component is currently attached.
    pub attached: bool,
}

/// Preset families a device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetType {
    /// Suction intensity.
    FanSpeed,
    /// Mopping water throughput.
    WaterGrade,
}

/// Currently selected preset of one family. Keyed by preset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSelectionAttribute {
    /// Which preset family this describes.
    pub kind: PresetType,
    /// Semantic preset name, `None` when the raw value is not in the table.
    pub selected: Option<String>,
    /// Raw vendor value as reported.
    pub raw_value: i64,
}

/// Wear parts with tracked remaining life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    /// Main roller brush.
    MainBrush,
    /// Side whisker brush.
    SideBrush,
    /// Dustbin filter.
    Filter,
    /// Cliff/wall sensors (cleaning interval).
    Sensor,
}

/// Remaining life of one wear part. Keyed by consumable kind.
///
/// Time and percent arrive as separate reports; whichever is present is
/// merged into the existing attribute by the consumable monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableAttribute {
    /// Which wear part this describes.
    pub kind: ConsumableKind,
    /// Remaining life in minutes.
    pub remaining_minutes: Option<u32>,
    /// Remaining life in percent.
    pub remaining_percent: Option<u8>,
}

/// Identity key of a state attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    /// The single composite status slot.
    Status,
    /// The single battery slot.
    Battery,
    /// One slot per attachment type.
    Attachment(AttachmentType),
    /// One slot per preset family.
    PresetSelection(PresetType),
    /// One slot per wear part.
    Consumable(ConsumableKind),
}

/// A typed state attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StateAttribute {
    /// Composite device status.
    Status(StatusAttribute),
    /// Battery charge level.
    Battery(BatteryAttribute),
    /// Attachment presence.
    Attachment(AttachmentAttribute),
    /// Selected preset of one family.
    PresetSelection(PresetSelectionAttribute),
    /// Remaining life of one wear part.
    Consumable(ConsumableAttribute),
}

impl StateAttribute {
    /// Returns the identity key the store deduplicates on.
    #[must_use]
    pub fn key(&self) -> AttributeKey {
        match self {
            Self::Status(_) => AttributeKey::Status,
            Self::Battery(_) => AttributeKey::Battery,
            Self::Attachment(a) => AttributeKey::Attachment(a.kind),
            Self::PresetSelection(p) => AttributeKey::PresetSelection(p.kind),
            Self::Consumable(c) => AttributeKey::Consumable(c.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_statuses() {
        assert!(StatusValue::Cleaning.is_active());
        assert!(StatusValue::Returning.is_active());
        assert!(StatusValue::Moving.is_active());
        assert!(!StatusValue::Docked.is_active());
        assert!(!StatusValue::Idle.is_active());
        assert!(!StatusValue::Paused.is_active());
        assert!(!StatusValue::Error.is_active());
    }

    #[test]
    fn identity_keys_separate_sub_kinds() {
        let tank = StateAttribute::Attachment(AttachmentAttribute {
            kind: AttachmentType::Watertank,
            attached: true,
        });
        let mop = StateAttribute::Attachment(AttachmentAttribute {
            kind: AttachmentType::Mop,
            attached: true,
        });

        assert_ne!(tank.key(), mop.key());
        assert_eq!(tank.key(), AttributeKey::Attachment(AttachmentType::Watertank));
    }

    #[test]
    fn status_key_is_singular() {
        let a = StateAttribute::Status(StatusAttribute::new(StatusValue::Idle));
        let b = StateAttribute::Status(StatusAttribute::new(StatusValue::Error));

        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn status_serializes_snake_case() {
        let status = StatusAttribute::new(StatusValue::Cleaning);
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["value"], "cleaning");
        assert!(json.get("metadata").is_none());
    }
}
