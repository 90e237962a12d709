// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered attribute store with upsert semantics.

use serde::{Deserialize, Serialize};

use super::attributes::{
    AttachmentAttribute, AttachmentType, AttributeKey, BatteryAttribute, ConsumableAttribute,
    ConsumableKind, PresetSelectionAttribute, PresetType, StateAttribute, StatusAttribute,
};

/// The canonical state of one robot.
///
/// An ordered collection of typed attributes, each uniquely addressed by its
/// identity key. Insertion order is preserved; replacing an attribute keeps
/// its position.
///
/// # Examples
///
/// ```
/// use miovac_lib::state::{BatteryAttribute, StateAttribute, StateStore};
///
/// let mut store = StateStore::new();
/// store.upsert_first_matching_attribute(StateAttribute::Battery(BatteryAttribute { level: 80 }));
/// store.upsert_first_matching_attribute(StateAttribute::Battery(BatteryAttribute { level: 79 }));
///
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.battery().unwrap().level, 79);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore {
    attributes: Vec<StateAttribute>,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the attribute, replacing the first existing attribute with
    /// the same identity key in place.
    pub fn upsert_first_matching_attribute(&mut self, attribute: StateAttribute) {
        let key = attribute.key();
        match self.attributes.iter().position(|a| a.key() == key) {
            Some(idx) => self.attributes[idx] = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Returns the attribute with the given identity key, if present.
    #[must_use]
    pub fn attribute(&self, key: AttributeKey) -> Option<&StateAttribute> {
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Returns all attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[StateAttribute] {
        &self.attributes
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns whether the store holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the composite status, if derived yet.
    #[must_use]
    pub fn status(&self) -> Option<&StatusAttribute> {
        match self.attribute(AttributeKey::Status) {
            Some(StateAttribute::Status(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the battery attribute, if reported yet.
    #[must_use]
    pub fn battery(&self) -> Option<&BatteryAttribute> {
        match self.attribute(AttributeKey::Battery) {
            Some(StateAttribute::Battery(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the attachment attribute for the given component.
    #[must_use]
    pub fn attachment(&self, kind: AttachmentType) -> Option<&AttachmentAttribute> {
        match self.attribute(AttributeKey::Attachment(kind)) {
            Some(StateAttribute::Attachment(a)) => Some(a),
            _ => None,
        }
    }

    /// Returns the selected preset of the given family.
    #[must_use]
    pub fn preset_selection(&self, kind: PresetType) -> Option<&PresetSelectionAttribute> {
        match self.attribute(AttributeKey::PresetSelection(kind)) {
            Some(StateAttribute::PresetSelection(p)) => Some(p),
            _ => None,
        }
    }

    /// Returns the consumable attribute for the given wear part.
    #[must_use]
    pub fn consumable(&self, kind: ConsumableKind) -> Option<&ConsumableAttribute> {
        match self.attribute(AttributeKey::Consumable(kind)) {
            Some(StateAttribute::Consumable(c)) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatusValue;

    fn battery(level: u8) -> StateAttribute {
        StateAttribute::Battery(BatteryAttribute { level })
    }

    #[test]
    fn new_store_is_empty() {
        let store = StateStore::new();
        assert!(store.is_empty());
        assert!(store.status().is_none());
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let mut store = StateStore::new();

        store.upsert_first_matching_attribute(battery(80));
        assert_eq!(store.len(), 1);

        store.upsert_first_matching_attribute(battery(42));
        assert_eq!(store.len(), 1);
        assert_eq!(store.battery().unwrap().level, 42);
    }

    #[test]
    fn upsert_keeps_position() {
        let mut store = StateStore::new();

        store.upsert_first_matching_attribute(battery(80));
        store.upsert_first_matching_attribute(StateAttribute::Status(StatusAttribute::new(
            StatusValue::Idle,
        )));
        store.upsert_first_matching_attribute(battery(50));

        assert!(matches!(store.attributes()[0], StateAttribute::Battery(_)));
        assert!(matches!(store.attributes()[1], StateAttribute::Status(_)));
    }

    #[test]
    fn sub_kinds_occupy_separate_slots() {
        let mut store = StateStore::new();

        store.upsert_first_matching_attribute(StateAttribute::Attachment(AttachmentAttribute {
            kind: AttachmentType::Watertank,
            attached: false,
        }));
        store.upsert_first_matching_attribute(StateAttribute::Attachment(AttachmentAttribute {
            kind: AttachmentType::Mop,
            attached: false,
        }));
        store.upsert_first_matching_attribute(StateAttribute::Attachment(AttachmentAttribute {
            kind: AttachmentType::Watertank,
            attached: true,
        }));

        assert_eq!(store.len(), 2);
        assert!(store.attachment(AttachmentType::Watertank).unwrap().attached);
        assert!(!store.attachment(AttachmentType::Mop).unwrap().attached);
    }

    #[test]
    fn repeated_upserts_leave_exactly_one_attribute() {
        let mut store = StateStore::new();

        for level in 0..50 {
            store.upsert_first_matching_attribute(battery(level));
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.battery().unwrap().level, 49);
    }
}
