// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `MioVac` library.
//!
//! This module provides a comprehensive error hierarchy for handling failures
//! across the library: value validation, protocol communication, JSON parsing,
//! and capability configuration.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when interacting
/// with MIOT robot vacuums.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred while constructing or registering a capability.
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// An empty collection was provided where at least one element is required.
    #[error("empty {0} list")]
    Empty(&'static str),

    /// Too many elements were provided.
    #[error("too many {kind}: {actual} exceeds the limit of {max}")]
    TooMany {
        /// What kind of element overflowed.
        kind: &'static str,
        /// Maximum allowed count.
        max: usize,
        /// The actual count that was provided.
        actual: usize,
    },

    /// A preset name is not part of the configured preset table.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Errors related to protocol communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The transport failed to deliver the request.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with a non-zero MIOT result code.
    #[error("device rejected request with code {0}")]
    DeviceCode(i64),

    /// The device answered with a payload we could not interpret.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

/// Errors related to parsing MIOT payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Unexpected payload format.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to capability construction and registration.
///
/// These are programming errors: a robot that fails to assemble its
/// capability set is unusable, so they surface at startup and are not
/// recoverable at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// A capability requiring a non-empty binding list was given an empty one.
    #[error("capability {capability} requires a non-empty {binding} binding")]
    EmptyBinding {
        /// The capability that was misconfigured.
        capability: &'static str,
        /// The binding that was empty.
        binding: &'static str,
    },

    /// A preset table contains duplicate raw values.
    #[error("capability {capability} preset table maps two names to raw value {raw}")]
    DuplicatePresetValue {
        /// The capability that was misconfigured.
        capability: &'static str,
        /// The raw vendor value bound twice.
        raw: i64,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::Empty("zone");
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::Empty("zone"))));
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::DeviceCode(-4004);
        assert_eq!(err.to_string(), "device rejected request with code -4004");
    }

    #[test]
    fn capability_error_display() {
        let err = CapabilityError::EmptyBinding {
            capability: "FanSpeedControl",
            binding: "presets",
        };
        assert_eq!(
            err.to_string(),
            "capability FanSpeedControl requires a non-empty presets binding"
        );
    }
}
