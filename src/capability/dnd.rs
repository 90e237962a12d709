// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Do-not-disturb window configuration.

use std::any::Any;
use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ParseError, ProtocolError, Result};
use crate::miot::{MiotClient, PropertyId, Transport};

use super::{Capability, CapabilityTag};

/// Wire format of the window boundaries.
const TIME_FORMAT: &str = "%H:%M";

/// Property bindings for the do-not-disturb service.
#[derive(Debug, Clone, Copy)]
pub struct DoNotDisturbBindings {
    /// Window enabled flag.
    pub enabled: PropertyId,
    /// Window start time.
    pub start_time: PropertyId,
    /// Window end time.
    pub end_time: PropertyId,
}

/// The configured do-not-disturb window.
///
/// During the window the robot will not resume pending jobs or announce
/// anything. A window may span midnight (start after end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoNotDisturbConfiguration {
    /// Whether the window is active.
    pub enabled: bool,
    /// Window start.
    pub start: NaiveTime,
    /// Window end.
    pub end: NaiveTime,
}

/// Do-not-disturb window control.
#[derive(Debug)]
pub struct DoNotDisturbCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: DoNotDisturbBindings,
}

impl<T: Transport> DoNotDisturbCapability<T> {
    /// Creates the capability with its property bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: DoNotDisturbBindings) -> Self {
        Self { client, bindings }
    }

    /// Reads the configured window.
    ///
    /// # Errors
    ///
    /// Returns an error if the read could not be issued or the reported
    /// values are not interpretable.
    pub async fn configuration(&self) -> Result<DoNotDisturbConfiguration> {
        let props = [
            self.bindings.enabled,
            self.bindings.start_time,
            self.bindings.end_time,
        ];
        let response = self.client.get_properties(&props).await?;

        let entries = response.as_array().ok_or_else(|| {
            ProtocolError::UnexpectedResponse("non-array get_properties result".into())
        })?;

        let value_of = |prop: PropertyId| -> Option<&Value> {
            entries
                .iter()
                .find(|e| {
                    e.get("siid").and_then(Value::as_u64) == Some(u64::from(prop.siid))
                        && e.get("piid").and_then(Value::as_u64) == Some(u64::from(prop.piid))
                })
                .and_then(|e| e.get("value"))
        };

        let enabled = match value_of(self.bindings.enabled) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => return Err(ParseError::MissingField("dnd enabled".into()).into()),
        };

        let start = parse_time(value_of(self.bindings.start_time), "dnd start time")?;
        let end = parse_time(value_of(self.bindings.end_time), "dnd end time")?;

        Ok(DoNotDisturbConfiguration {
            enabled,
            start,
            end,
        })
    }

    /// Writes the window configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be issued.
    pub async fn set_configuration(&self, config: DoNotDisturbConfiguration) -> Result<()> {
        self.client
            .set_properties(&[
                (self.bindings.enabled, json!(i32::from(config.enabled))),
                (
                    self.bindings.start_time,
                    json!(config.start.format(TIME_FORMAT).to_string()),
                ),
                (
                    self.bindings.end_time,
                    json!(config.end.format(TIME_FORMAT).to_string()),
                ),
            ])
            .await?;

        Ok(())
    }
}

fn parse_time(value: Option<&Value>, field: &str) -> Result<NaiveTime> {
    let raw = value
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?;

    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| ParseError::UnexpectedFormat(format!("{field}: {raw}")).into())
}

impl<T: Transport> Capability for DoNotDisturbCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::DoNotDisturb
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
