// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Targeted cleanups: zones, segments, and mapping passes.
//!
//! All three are parameterized invocations of the vacuum start action: the
//! mode parameter selects the cleanup variant and a JSON-encoded parameter
//! blob carries the target description.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, ValueError};
use crate::miot::{ActionId, ActionParam, MiotClient, PropertyId, Transport};

use super::{Capability, CapabilityTag};

/// Maximum number of zones one cleanup may target.
const MAX_ZONES: usize = 4;

/// Iteration bounds per zone/segment.
const MIN_ITERATIONS: u8 = 1;
const MAX_ITERATIONS: u8 = 4;

/// Bindings shared by the parameterized-start capabilities.
#[derive(Debug, Clone, Copy)]
pub struct CleaningBindings {
    /// The vacuum start action.
    pub start: ActionId,
    /// The mode property carried in the action's `in` parameters.
    pub mode: PropertyId,
    /// The extra-parameters property carrying the JSON target blob.
    pub additional_parameters: PropertyId,
}

/// One rectangular cleanup zone in map coordinates (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningZone {
    /// One corner.
    pub x1: i32,
    /// One corner.
    pub y1: i32,
    /// Opposite corner.
    pub x2: i32,
    /// Opposite corner.
    pub y2: i32,
    /// How many passes to clean the zone (1-4).
    pub iterations: u8,
}

impl CleaningZone {
    /// Creates a zone, validating the iteration count.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if iterations is outside [1, 4].
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, iterations: u8) -> Result<Self> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
            return Err(ValueError::OutOfRange {
                min: i64::from(MIN_ITERATIONS),
                max: i64::from(MAX_ITERATIONS),
                actual: i64::from(iterations),
            }
            .into());
        }

        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            iterations,
        })
    }
}

/// Zone-targeted cleanups.
#[derive(Debug)]
pub struct ZoneCleaningCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: CleaningBindings,
    mode_value: i64,
}

impl<T: Transport> ZoneCleaningCapability<T> {
    /// Creates the capability with its bindings and the mode value that
    /// selects zone cleanups on this generation.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: CleaningBindings, mode_value: i64) -> Self {
        Self {
            client,
            bindings,
            mode_value,
        }
    }

    /// Starts a cleanup of the given zones.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for an empty or oversized zone list, or a
    /// protocol error if the request could not be issued.
    pub async fn start(&self, zones: &[CleaningZone]) -> Result<()> {
        if zones.is_empty() {
            return Err(ValueError::Empty("zone").into());
        }
        if zones.len() > MAX_ZONES {
            return Err(ValueError::TooMany {
                kind: "zones",
                max: MAX_ZONES,
                actual: zones.len(),
            }
            .into());
        }

        let areas: Vec<serde_json::Value> = zones
            .iter()
            .map(|z| json!([z.x1, z.y1, z.x2, z.y2, z.iterations, 1, 1]))
            .collect();
        let blob = json!({"areas": areas}).to_string();

        self.client
            .invoke_action(
                self.bindings.start,
                vec![
                    ActionParam::new(self.bindings.mode.piid, json!(self.mode_value)),
                    ActionParam::new(self.bindings.additional_parameters.piid, json!(blob)),
                ],
            )
            .await?;

        Ok(())
    }
}

impl<T: Transport> Capability for ZoneCleaningCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::ZoneCleaning
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Segment-targeted cleanups.
#[derive(Debug)]
pub struct MapSegmentationCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: CleaningBindings,
    mode_value: i64,
}

impl<T: Transport> MapSegmentationCapability<T> {
    /// Creates the capability with its bindings and the mode value that
    /// selects segment cleanups on this generation.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: CleaningBindings, mode_value: i64) -> Self {
        Self {
            client,
            bindings,
            mode_value,
        }
    }

    /// Starts a cleanup of the given map segments.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for an empty segment list or an out-of-range
    /// iteration count, or a protocol error if the request could not be
    /// issued.
    pub async fn start(&self, segment_ids: &[u32], iterations: u8) -> Result<()> {
        if segment_ids.is_empty() {
            return Err(ValueError::Empty("segment").into());
        }
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
            return Err(ValueError::OutOfRange {
                min: i64::from(MIN_ITERATIONS),
                max: i64::from(MAX_ITERATIONS),
                actual: i64::from(iterations),
            }
            .into());
        }

        let selects: Vec<serde_json::Value> = segment_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| json!([id, iterations, 1, 1, idx + 1]))
            .collect();
        let blob = json!({"selects": selects}).to_string();

        self.client
            .invoke_action(
                self.bindings.start,
                vec![
                    ActionParam::new(self.bindings.mode.piid, json!(self.mode_value)),
                    ActionParam::new(self.bindings.additional_parameters.piid, json!(blob)),
                ],
            )
            .await?;

        Ok(())
    }
}

impl<T: Transport> Capability for MapSegmentationCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::MapSegmentation
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Map-building pass without cleaning.
#[derive(Debug)]
pub struct MappingPassCapability<T: Transport> {
    client: MiotClient<T>,
    start: ActionId,
    mode: PropertyId,
    mode_value: i64,
}

impl<T: Transport> MappingPassCapability<T> {
    /// Creates the capability with its bindings and the mode value that
    /// selects mapping passes on this generation.
    #[must_use]
    pub fn new(client: MiotClient<T>, start: ActionId, mode: PropertyId, mode_value: i64) -> Self {
        Self {
            client,
            start,
            mode,
            mode_value,
        }
    }

    /// Starts a mapping pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn start(&self) -> Result<()> {
        self.client
            .invoke_action(
                self.start,
                vec![ActionParam::new(self.mode.piid, json!(self.mode_value))],
            )
            .await?;

        Ok(())
    }
}

impl<T: Transport> Capability for MappingPassCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::MappingPass
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
