// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound message shapes pushed by the device.

use serde::Deserialize;
use serde_json::{Value, json};

/// A message pushed by the device, discriminated by its `method` tag.
///
/// Only the methods the reconciler understands are modeled; anything else
/// fails to parse and is reported as not handled so an outer layer can deal
/// with it.
///
/// # Examples
///
/// ```
/// use miovac_lib::miot::InboundMessage;
/// use serde_json::json;
///
/// let msg = json!({
///     "id": 17,
///     "method": "properties_changed",
///     "params": [{"siid": 3, "piid": 1, "value": 42}]
/// });
///
/// let parsed = InboundMessage::parse(&msg).unwrap();
/// assert!(matches!(parsed, InboundMessage::PropertiesChanged { id: 17, .. }));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method")]
pub enum InboundMessage {
    /// Incremental property reports.
    ///
    /// Elements are kept as raw JSON here: a single malformed or unknown
    /// element must not invalidate the rest of the batch.
    #[serde(rename = "properties_changed")]
    PropertiesChanged {
        /// Message id to acknowledge.
        id: i64,
        /// The raw report elements.
        params: Vec<Value>,
    },

    /// Firmware state ping. Only acknowledged when it carries `ota_state`.
    #[serde(rename = "props")]
    Props {
        /// Message id to acknowledge.
        id: i64,
        /// Ping payload.
        #[serde(default)]
        params: Option<PropsParams>,
    },

    /// Cleanup-summary notification. The parameters describe a past run and
    /// are intentionally not reflected in current state.
    #[serde(rename = "event_occured")]
    EventOccurred {
        /// Message id to acknowledge.
        id: i64,
    },
}

/// Payload of a `props` ping.
#[derive(Debug, Clone, Deserialize)]
pub struct PropsParams {
    /// OTA state string, e.g. `"idle"`.
    #[serde(default)]
    pub ota_state: Option<Value>,
}

impl InboundMessage {
    /// Parses a raw message, returning `None` for unrecognized methods or
    /// shapes the reconciler does not handle.
    #[must_use]
    pub fn parse(msg: &Value) -> Option<Self> {
        serde_json::from_value(msg.clone()).ok()
    }
}

/// Builds the success acknowledgement for an inbound message id.
#[must_use]
pub fn ack(id: i64) -> Value {
    json!({"id": id, "result": "ok"})
}
