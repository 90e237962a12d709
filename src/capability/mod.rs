// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability model.
//!
//! A capability adapts one canonical operation family (power control, fan
//! speed selection, zone cleaning, consumable maintenance) to the protocol
//! identifiers of a concrete device generation. Capabilities are constructed
//! with exactly the identifier bindings they need (never a whole registry)
//! and registered against a robot instance, keyed by their
//! [`CapabilityTag`], at most one per tag.
//!
//! Operations issue outbound requests and report issuance success or
//! failure; whether the device actually complied is observed later through
//! its state reports. Capabilities never mutate the state store, with one
//! deliberate exception, the consumable monitor, which the reconciler
//! delegates wear-telemetry parsing to.
//!
//! # Retrieving a Concrete Capability
//!
//! The registry hands out `Arc<dyn Capability>`; concrete operations live on
//! the concrete types, which are recovered by downcast:
//!
//! ```ignore
//! let basic = robot
//!     .capability::<BasicControlCapability<C>>(CapabilityTag::BasicControl)
//!     .expect("gen2 robots register basic control");
//! basic.start().await?;
//! ```

mod basic_control;
mod cleaning;
mod consumables;
mod dnd;
mod locate;
mod map_edit;
mod presets;
mod settings;

pub use basic_control::{BasicControlBindings, BasicControlCapability};
pub use cleaning::{
    CleaningBindings, CleaningZone, MapSegmentationCapability, MappingPassCapability,
    ZoneCleaningCapability,
};
pub use consumables::{ConsumableBinding, ConsumableBindings, ConsumableMonitoringCapability};
pub use dnd::{DoNotDisturbBindings, DoNotDisturbCapability, DoNotDisturbConfiguration};
pub use locate::LocateCapability;
pub use map_edit::{
    MapEditBindings, MapResetCapability, MapSegmentEditCapability, MapSegmentRenameCapability,
    RestrictedZone, RestrictedZoneKind, VirtualRestrictionsCapability, VirtualWall,
};
pub use presets::{PresetSelectionCapability, SelectionPreset};
pub use settings::{SpeakerVolumeControlCapability, ToggleSettingCapability};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifies one operation family.
///
/// A robot registers at most one capability per tag; registering a second
/// one replaces the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityTag {
    /// Start/stop/pause/home.
    BasicControl,
    /// Suction intensity presets.
    FanSpeedControl,
    /// Mopping water presets.
    WaterUsageControl,
    /// Locate jingle.
    Locate,
    /// Zone-targeted cleanups.
    ZoneCleaning,
    /// Segment-targeted cleanups.
    MapSegmentation,
    /// Map-building pass without cleaning.
    MappingPass,
    /// Segment join/split edits.
    MapSegmentEdit,
    /// Segment renaming.
    MapSegmentRename,
    /// Wiping the stored map.
    MapReset,
    /// Virtual walls and restricted zones.
    CombinedVirtualRestrictions,
    /// Wear-part telemetry and resets.
    ConsumableMonitoring,
    /// Speaker volume.
    SpeakerVolumeControl,
    /// Carpet boost toggle.
    CarpetModeControl,
    /// Child/key lock toggle.
    KeyLock,
    /// Do-not-disturb window.
    DoNotDisturb,
}

impl fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A registered capability.
///
/// The trait is deliberately thin so the registry stays object-safe: the
/// tag identifies the operation family, and the downcast hook recovers the
/// concrete type with its operation methods.
pub trait Capability: Send + Sync + 'static {
    /// Returns the operation-family tag this capability serves.
    fn tag(&self) -> CapabilityTag;

    /// Upcasts for downcasting back to the concrete capability type.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
