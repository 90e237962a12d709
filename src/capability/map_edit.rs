// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Map edits: segment surgery, renaming, resets, and virtual restrictions.
//!
//! All map edits are invocations of the map-edit action carrying a
//! JSON-encoded edit description in the map-details parameter. The device
//! reports the outcome in the action-result out parameter, which is checked
//! before the operation is considered issued.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ProtocolError, Result, ValueError};
use crate::miot::{ActionId, ActionParam, MiotClient, PropertyId, Transport};

use super::{Capability, CapabilityTag};

/// Maximum number of virtual walls per map.
const MAX_WALLS: usize = 10;

/// Maximum number of restricted zones per map.
const MAX_RESTRICTED_ZONES: usize = 10;

/// Bindings shared by all map-edit capabilities.
#[derive(Debug, Clone, Copy)]
pub struct MapEditBindings {
    /// The map-edit action.
    pub edit: ActionId,
    /// The map-details property carried in the `in` parameters.
    pub map_details: PropertyId,
    /// The action-result property returned in the `out` parameters.
    pub action_result: PropertyId,
}

/// Issues one map edit and verifies the device-side result code.
async fn execute_edit<T: Transport>(
    client: &MiotClient<T>,
    bindings: MapEditBindings,
    details: Value,
) -> Result<()> {
    let out = client
        .invoke_action(
            bindings.edit,
            vec![ActionParam::new(bindings.map_details.piid, json!(details.to_string()))],
        )
        .await?;

    // The edit result rides in a JSON string on the action-result out
    // parameter. A missing result means an older firmware; accept it.
    if let Some(result) = out.iter().find(|p| p.piid == bindings.action_result.piid)
        && let Some(raw) = result.value.as_str()
        && let Ok(parsed) = serde_json::from_str::<Value>(raw)
        && let Some(code) = parsed.get("code").and_then(Value::as_i64)
        && code != 0
    {
        return Err(ProtocolError::DeviceCode(code).into());
    }

    Ok(())
}

/// Segment join/split edits.
#[derive(Debug)]
pub struct MapSegmentEditCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: MapEditBindings,
}

impl<T: Transport> MapSegmentEditCapability<T> {
    /// Creates the capability with its bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: MapEditBindings) -> Self {
        Self { client, bindings }
    }

    /// Joins two adjacent segments into one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued or the device
    /// rejected the edit.
    pub async fn join_segments(&self, segment_a: u32, segment_b: u32) -> Result<()> {
        execute_edit(
            &self.client,
            self.bindings,
            json!({"sm": [segment_a, segment_b]}),
        )
        .await
    }

    /// Splits a segment along the given line (map coordinates in
    /// millimeters).
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued or the device
    /// rejected the edit.
    pub async fn split_segment(
        &self,
        segment_id: u32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        execute_edit(
            &self.client,
            self.bindings,
            json!({"sp": [x1, y1, x2, y2, segment_id]}),
        )
        .await
    }
}

impl<T: Transport> Capability for MapSegmentEditCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::MapSegmentEdit
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Segment renaming.
#[derive(Debug)]
pub struct MapSegmentRenameCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: MapEditBindings,
}

impl<T: Transport> MapSegmentRenameCapability<T> {
    /// Creates the capability with its bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: MapEditBindings) -> Self {
        Self { client, bindings }
    }

    /// Renames a segment.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for an empty name, or a protocol error if the
    /// request could not be issued or the device rejected the edit.
    pub async fn rename_segment(&self, segment_id: u32, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ValueError::Empty("segment name").into());
        }

        execute_edit(
            &self.client,
            self.bindings,
            json!({"nsr": {"id": segment_id, "name": name}}),
        )
        .await
    }
}

impl<T: Transport> Capability for MapSegmentRenameCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::MapSegmentRename
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Wiping the stored map.
#[derive(Debug)]
pub struct MapResetCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: MapEditBindings,
}

impl<T: Transport> MapResetCapability<T> {
    /// Creates the capability with its bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: MapEditBindings) -> Self {
        Self { client, bindings }
    }

    /// Discards the stored map. The robot will build a new one on its next
    /// run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued or the device
    /// rejected the edit.
    pub async fn reset_map(&self) -> Result<()> {
        execute_edit(&self.client, self.bindings, json!({"rm": 1})).await
    }
}

impl<T: Transport> Capability for MapResetCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::MapReset
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// One virtual wall segment in map coordinates (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualWall {
    /// Line start.
    pub x1: i32,
    /// Line start.
    pub y1: i32,
    /// Line end.
    pub x2: i32,
    /// Line end.
    pub y2: i32,
}

/// What a restricted zone keeps out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictedZoneKind {
    /// Keep the robot out entirely.
    Regular,
    /// Keep the robot out only while mopping.
    Mop,
}

/// One rectangular restricted zone in map coordinates (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedZone {
    /// One corner.
    pub x1: i32,
    /// One corner.
    pub y1: i32,
    /// Opposite corner.
    pub x2: i32,
    /// Opposite corner.
    pub y2: i32,
    /// What the zone keeps out.
    pub kind: RestrictedZoneKind,
}

/// Virtual walls and restricted zones.
///
/// The device takes the full restriction set in one edit; there is no
/// incremental add/remove, callers always send the complete picture.
#[derive(Debug)]
pub struct VirtualRestrictionsCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: MapEditBindings,
}

impl<T: Transport> VirtualRestrictionsCapability<T> {
    /// Creates the capability with its bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: MapEditBindings) -> Self {
        Self { client, bindings }
    }

    /// Replaces all virtual walls and restricted zones.
    ///
    /// Passing empty slices clears the restrictions.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if a limit is exceeded, or a protocol error if
    /// the request could not be issued or the device rejected the edit.
    pub async fn set_restrictions(
        &self,
        walls: &[VirtualWall],
        zones: &[RestrictedZone],
    ) -> Result<()> {
        if walls.len() > MAX_WALLS {
            return Err(ValueError::TooMany {
                kind: "virtual walls",
                max: MAX_WALLS,
                actual: walls.len(),
            }
            .into());
        }
        if zones.len() > MAX_RESTRICTED_ZONES {
            return Err(ValueError::TooMany {
                kind: "restricted zones",
                max: MAX_RESTRICTED_ZONES,
                actual: zones.len(),
            }
            .into());
        }

        let lines: Vec<Value> = walls
            .iter()
            .map(|w| json!([w.x1, w.y1, w.x2, w.y2]))
            .collect();
        let rects: Vec<Value> = zones
            .iter()
            .filter(|z| z.kind == RestrictedZoneKind::Regular)
            .map(|z| json!([z.x1, z.y1, z.x2, z.y2]))
            .collect();
        let mops: Vec<Value> = zones
            .iter()
            .filter(|z| z.kind == RestrictedZoneKind::Mop)
            .map(|z| json!([z.x1, z.y1, z.x2, z.y2]))
            .collect();

        execute_edit(
            &self.client,
            self.bindings,
            json!({"vw": {"line": lines, "rect": rects, "mop": mops}}),
        )
        .await
    }
}

impl<T: Transport> Capability for VirtualRestrictionsCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::CombinedVirtualRestrictions
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
