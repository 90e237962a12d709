// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MIOT protocol primitives.
//!
//! MIOT addresses everything on a device numerically: a *service* (siid)
//! groups *properties* (piid) that can be read or written and *actions*
//! (aiid) that can be invoked. This module provides the typed vocabulary for
//! that addressing scheme, the inbound message shapes pushed by the device,
//! and the outbound request helper used by capabilities and the poller.
//!
//! # Wire Shapes
//!
//! | Direction | Method | Payload |
//! |-----------|--------|---------|
//! | outbound | `get_properties` | `[{did, siid, piid}, ...]` |
//! | outbound | `set_properties` | `[{did, siid, piid, value}, ...]` |
//! | outbound | `action` | `{did, siid, aiid, in: [{piid, value}, ...]}` |
//! | inbound | `properties_changed` | `{id, params: [{siid, piid, value}, ...]}` |
//! | inbound | `props` | `{id, params: {ota_state, ...}}` |
//! | inbound | `event_occured` | `{id, ...}` (vendor spelling) |

mod client;
mod message;
mod transport;

pub use client::MiotClient;
pub use message::{InboundMessage, PropsParams, ack};
pub use transport::Transport;

use serde::{Deserialize, Serialize};

/// Address of one readable/writable device property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId {
    /// Service identifier.
    pub siid: u16,
    /// Property identifier within the service.
    pub piid: u16,
}

impl PropertyId {
    /// Creates a property address.
    #[must_use]
    pub const fn new(siid: u16, piid: u16) -> Self {
        Self { siid, piid }
    }
}

/// Address of one invokable device action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId {
    /// Service identifier.
    pub siid: u16,
    /// Action identifier within the service.
    pub aiid: u16,
}

impl ActionId {
    /// Creates an action address.
    #[must_use]
    pub const fn new(siid: u16, aiid: u16) -> Self {
        Self { siid, aiid }
    }
}

/// One raw property report as pushed by the device or returned by a poll.
///
/// Reports are transient: they are routed into the state model and then
/// discarded, never stored as-is. Extra wire fields (`did`, `code`) are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPropertyReport {
    /// Service identifier.
    pub siid: u16,
    /// Property identifier.
    pub piid: u16,
    /// Raw vendor value. Numeric for most properties, but some firmware
    /// revisions report strings, so the JSON value is kept as-is.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RawPropertyReport {
    /// Creates a report from its parts.
    #[must_use]
    pub fn new(siid: u16, piid: u16, value: serde_json::Value) -> Self {
        Self { siid, piid, value }
    }

    /// Returns the report value as a signed integer, if it is one.
    #[must_use]
    pub fn value_as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    /// Returns the report value normalized to a string.
    ///
    /// Error codes arrive as JSON numbers or strings depending on firmware;
    /// this renders both uniformly so sentinel comparisons hold.
    #[must_use]
    pub fn value_as_code(&self) -> Option<String> {
        match &self.value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One `{piid, value}` entry in an action invocation's `in`/`out` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParam {
    /// Property identifier the value belongs to.
    pub piid: u16,
    /// Parameter value.
    pub value: serde_json::Value,
}

impl ActionParam {
    /// Creates an action parameter.
    #[must_use]
    pub fn new(piid: u16, value: serde_json::Value) -> Self {
        Self { piid, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_deserializes_with_extra_fields() {
        let json = json!({"did": "123456", "siid": 4, "piid": 1, "value": 2, "code": 0});
        let report: RawPropertyReport = serde_json::from_value(json).unwrap();

        assert_eq!(report.siid, 4);
        assert_eq!(report.piid, 1);
        assert_eq!(report.value_as_i64(), Some(2));
    }

    #[test]
    fn report_without_value_defaults_to_null() {
        let json = json!({"siid": 4, "piid": 7});
        let report: RawPropertyReport = serde_json::from_value(json).unwrap();

        assert!(report.value.is_null());
        assert_eq!(report.value_as_i64(), None);
    }

    #[test]
    fn code_normalization_accepts_numbers_and_strings() {
        let numeric = RawPropertyReport::new(4, 18, json!(68));
        let string = RawPropertyReport::new(4, 18, json!("68"));

        assert_eq!(numeric.value_as_code().as_deref(), Some("68"));
        assert_eq!(string.value_as_code().as_deref(), Some("68"));
        assert_eq!(RawPropertyReport::new(4, 18, json!([])).value_as_code(), None);
    }

    #[test]
    fn property_and_action_ids_serialize_flat() {
        let prop = PropertyId::new(4, 1);
        assert_eq!(serde_json::to_value(prop).unwrap(), json!({"siid": 4, "piid": 1}));

        let action = ActionId::new(4, 2);
        assert_eq!(serde_json::to_value(action).unwrap(), json!({"siid": 4, "aiid": 2}));
    }
}
