// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport seam between the adapter and the device session.

use serde_json::Value;

use crate::error::ProtocolError;

/// A transport capable of exchanging MIOT messages with one device.
///
/// How messages physically travel (cloud relay, local TLS socket) is out of
/// scope for this crate; implementations own connection handling, request
/// ids, and timeouts. The adapter only needs a request/response channel and
/// a fire-and-forget channel for acknowledgements.
///
/// A timed-out request must surface as an `Err`: the adapter degrades a
/// failed poll to "no update" and reports failed capability requests to the
/// caller, so transports should not retry indefinitely.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync + 'static {
    /// Sends a request and awaits the device's `result` payload.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request could not be delivered or
    /// timed out.
    async fn send_command(&self, method: &str, params: Value) -> Result<Value, ProtocolError>;

    /// Sends a payload without awaiting a response.
    ///
    /// Used for acknowledging pushed messages back to the device/cloud.
    fn send_cloud(&self, payload: Value);
}
