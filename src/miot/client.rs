// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound request helper shared by capabilities and the poller.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::ProtocolError;

use super::{ActionId, ActionParam, PropertyId, Transport};

/// Builds and issues outbound MIOT requests for one device.
///
/// The client owns the device id (`did`) every request must carry and checks
/// the MIOT result codes on responses, so capabilities deal only in typed
/// identifiers and values. Success means the request was issued and accepted;
/// eventual device compliance is observed later through state reports.
#[derive(Debug)]
pub struct MiotClient<T: Transport> {
    transport: Arc<T>,
    device_id: String,
}

impl<T: Transport> Clone for MiotClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            device_id: self.device_id.clone(),
        }
    }
}

impl<T: Transport> MiotClient<T> {
    /// Creates a client for the given transport and device id.
    #[must_use]
    pub fn new(transport: Arc<T>, device_id: impl Into<String>) -> Self {
        Self {
            transport,
            device_id: device_id.into(),
        }
    }

    /// Returns the device id requests are addressed to.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Reads a batch of properties, returning the raw `result` payload.
    ///
    /// The payload is left unparsed: the reconciler applies its own
    /// fail-fast shape check before touching any state.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails or times out.
    pub async fn get_properties(&self, props: &[PropertyId]) -> Result<Value, ProtocolError> {
        let params: Vec<Value> = props
            .iter()
            .map(|p| json!({"did": self.device_id, "siid": p.siid, "piid": p.piid}))
            .collect();

        tracing::debug!(count = props.len(), "Polling properties");
        self.transport
            .send_command("get_properties", Value::Array(params))
            .await
    }

    /// Reads a single property value.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails, the device answers
    /// with a non-zero code, or the response shape is unexpected.
    pub async fn get_property(&self, prop: PropertyId) -> Result<Value, ProtocolError> {
        let response = self.get_properties(std::slice::from_ref(&prop)).await?;

        let entry = response
            .as_array()
            .and_then(|entries| entries.first())
            .ok_or_else(|| {
                ProtocolError::UnexpectedResponse("empty get_properties result".into())
            })?;

        check_result_code(entry)?;

        Ok(entry.get("value").cloned().unwrap_or(Value::Null))
    }

    /// Writes a single property value.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails or the device rejects
    /// the write.
    pub async fn set_property(&self, prop: PropertyId, value: Value) -> Result<(), ProtocolError> {
        self.set_properties(&[(prop, value)]).await
    }

    /// Writes several property values in one request.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails or the device rejects
    /// any of the writes.
    pub async fn set_properties(
        &self,
        entries: &[(PropertyId, Value)],
    ) -> Result<(), ProtocolError> {
        let params: Vec<Value> = entries
            .iter()
            .map(|(p, value)| {
                json!({"did": self.device_id, "siid": p.siid, "piid": p.piid, "value": value})
            })
            .collect();

        tracing::debug!(count = entries.len(), "Writing properties");
        let response = self
            .transport
            .send_command("set_properties", Value::Array(params))
            .await?;

        if let Some(results) = response.as_array() {
            for entry in results {
                check_result_code(entry)?;
            }
        }

        Ok(())
    }

    /// Invokes an action, returning its `out` parameters.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails or the device answers
    /// with a non-zero code.
    pub async fn invoke_action(
        &self,
        action: ActionId,
        params: Vec<ActionParam>,
    ) -> Result<Vec<ActionParam>, ProtocolError> {
        let request = json!({
            "did": self.device_id,
            "siid": action.siid,
            "aiid": action.aiid,
            "in": params,
        });

        tracing::debug!(siid = action.siid, aiid = action.aiid, "Invoking action");
        let response = self.transport.send_command("action", request).await?;

        check_result_code(&response)?;

        let out = response
            .get("out")
            .cloned()
            .map_or_else(Vec::new, |out| serde_json::from_value(out).unwrap_or_default());

        Ok(out)
    }

    /// Sends a fire-and-forget payload (acknowledgements).
    pub fn send_cloud(&self, payload: Value) {
        self.transport.send_cloud(payload);
    }
}

/// Rejects payloads whose MIOT `code` field is present and non-zero.
fn check_result_code(payload: &Value) -> Result<(), ProtocolError> {
    match payload.get("code").and_then(Value::as_i64) {
        None | Some(0) => Ok(()),
        Some(code) => Err(ProtocolError::DeviceCode(code)),
    }
}
