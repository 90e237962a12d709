// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumable monitoring: wear-part telemetry and reset actions.
//!
//! This capability is special-cased by the reconciler: reports from the
//! consumable services are delegated here whole, making it the sole writer
//! of consumable attributes. Reset operations follow the regular capability
//! contract.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::miot::{ActionId, MiotClient, PropertyId, RawPropertyReport, Transport};
use crate::state::{ConsumableAttribute, ConsumableKind, StateAttribute, StateStore};

use super::{Capability, CapabilityTag};

/// Identifier bindings for one wear part.
#[derive(Debug, Clone, Copy)]
pub struct ConsumableBinding {
    /// Remaining-time property (reported in hours).
    pub time_left: PropertyId,
    /// Remaining-percent property.
    pub percent_left: PropertyId,
    /// Wear-counter reset action.
    pub reset: ActionId,
}

/// Bindings for all four monitored wear parts.
#[derive(Debug, Clone, Copy)]
pub struct ConsumableBindings {
    /// Main roller brush.
    pub main_brush: ConsumableBinding,
    /// Side whisker brush.
    pub side_brush: ConsumableBinding,
    /// Dustbin filter.
    pub filter: ConsumableBinding,
    /// Cliff/wall sensors.
    pub sensor: ConsumableBinding,
}

impl ConsumableBindings {
    fn binding(&self, kind: ConsumableKind) -> &ConsumableBinding {
        match kind {
            ConsumableKind::MainBrush => &self.main_brush,
            ConsumableKind::SideBrush => &self.side_brush,
            ConsumableKind::Filter => &self.filter,
            ConsumableKind::Sensor => &self.sensor,
        }
    }

    /// Maps a service id to the wear part it reports for.
    fn kind_for_service(&self, siid: u16) -> Option<ConsumableKind> {
        [
            ConsumableKind::MainBrush,
            ConsumableKind::SideBrush,
            ConsumableKind::Filter,
            ConsumableKind::Sensor,
        ]
        .into_iter()
        .find(|&kind| self.binding(kind).time_left.siid == siid)
    }
}

/// Wear-part telemetry and per-part reset actions.
#[derive(Debug)]
pub struct ConsumableMonitoringCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: ConsumableBindings,
}

impl<T: Transport> ConsumableMonitoringCapability<T> {
    /// Creates the capability with its bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: ConsumableBindings) -> Self {
        Self { client, bindings }
    }

    /// Applies one consumable-service report to the store.
    ///
    /// Time and percent arrive as separate reports and are merged into the
    /// existing attribute for the part. Reports for unknown properties or
    /// with non-numeric values are logged and ignored.
    pub fn parse_consumables_message(&self, report: &RawPropertyReport, store: &mut StateStore) {
        let Some(kind) = self.bindings.kind_for_service(report.siid) else {
            tracing::warn!(siid = report.siid, "Report for unmonitored consumable service");
            return;
        };
        let binding = self.bindings.binding(kind);

        let Some(value) = report.value_as_i64().filter(|v| *v >= 0) else {
            tracing::warn!(
                siid = report.siid,
                piid = report.piid,
                "Non-numeric consumable report value"
            );
            return;
        };

        let mut attribute = store
            .consumable(kind)
            .copied()
            .unwrap_or(ConsumableAttribute {
                kind,
                remaining_minutes: None,
                remaining_percent: None,
            });

        if report.piid == binding.time_left.piid {
            // The wire unit is hours.
            let minutes = u32::try_from(value.saturating_mul(60)).unwrap_or(u32::MAX);
            attribute.remaining_minutes = Some(minutes);
        } else if report.piid == binding.percent_left.piid {
            let percent = u8::try_from(value.min(100)).unwrap_or(100);
            attribute.remaining_percent = Some(percent);
        } else {
            tracing::warn!(
                siid = report.siid,
                piid = report.piid,
                "Unhandled consumable property"
            );
            return;
        }

        store.upsert_first_matching_attribute(StateAttribute::Consumable(attribute));
    }

    /// Resets the wear counter for one part after replacing/cleaning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn reset(&self, kind: ConsumableKind) -> Result<()> {
        let binding = self.bindings.binding(kind);
        self.client.invoke_action(binding.reset, Vec::new()).await?;
        Ok(())
    }
}

impl<T: Transport> Capability for ConsumableMonitoringCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::ConsumableMonitoring
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
