// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol identifier registry.
//!
//! Maps semantic names to the numeric MIOT identifiers of each supported
//! device generation. The tables are compile-time constants and never change
//! at runtime; the reconciler and the capabilities are written against the
//! semantic accessors here and hardcode no identifier anywhere else.
//!
//! Currently one generation is modeled ([`gen2`]). Further generations get
//! sibling modules with their own tables; their structure may differ freely
//! as long as the semantic surface stays the same.

/// Semantic classification of a service identifier.
///
/// Used by the reconciler to route property reports without spreading
/// numeric identifiers through its match arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceId {
    /// Device identity (serial number etc.). Pulled on demand, not reconciled.
    Device,
    /// Mirror of the device service some firmwares push under siid 99.
    DeviceMirror,
    /// Legacy vacuum service, fully superseded by [`ServiceId::Vacuum`].
    VacuumLegacy,
    /// The current-generation vacuum service owning mode/task/error state.
    Vacuum,
    /// Battery level and charger contact.
    Battery,
    /// Do-not-disturb window configuration.
    DoNotDisturb,
    /// Voice/audio service. Polled on demand, pushes are ignored.
    Audio,
    /// Main brush wear telemetry.
    MainBrush,
    /// Side brush wear telemetry.
    SideBrush,
    /// Filter wear telemetry.
    Filter,
    /// Cliff/wall sensor wear telemetry.
    Sensor,
    /// Map frames, cloud filenames, and map-edit plumbing.
    Map,
    /// Persistent map storage toggle.
    PersistentMaps,
    /// Auto-empty dock control.
    AutoEmptyDock,
    /// Anything this generation's table does not know.
    Unknown(u64),
}

/// Identifier tables for the second-generation MIOT vacuums.
///
/// Taken from the vendor's published instance spec for the D9/Z10-class
/// devices; it applies to many sibling models of that generation.
pub mod gen2 {
    use crate::state::{StatusFlag, StatusValue};

    use super::ServiceId;

    /// Device identity service.
    pub mod device {
        use crate::miot::PropertyId;

        /// Service id.
        pub const SIID: u16 = 1;
        /// Device serial number.
        pub const SERIAL_NUMBER: PropertyId = PropertyId::new(SIID, 5);
    }

    /// Legacy vacuum service. Its status/error properties duplicate what the
    /// current vacuum service reports, so only its actions are used.
    pub mod vacuum_legacy {
        use crate::miot::ActionId;

        /// Service id.
        pub const SIID: u16 = 2;
        /// Resume a paused or pending job.
        pub const RESUME: ActionId = ActionId::new(SIID, 1);
        /// Pause the current job.
        pub const PAUSE: ActionId = ActionId::new(SIID, 2);
    }

    /// Current vacuum service.
    pub mod vacuum {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 4;
        /// Operating mode (see [`super::status_for_mode`]).
        pub const MODE: PropertyId = PropertyId::new(SIID, 1);
        /// Minutes cleaned in the current/last run.
        pub const CLEANING_TIME: PropertyId = PropertyId::new(SIID, 2);
        /// Area cleaned in the current/last run.
        pub const CLEANING_AREA: PropertyId = PropertyId::new(SIID, 3);
        /// Fan speed preset (raw vendor value).
        pub const FAN_SPEED: PropertyId = PropertyId::new(SIID, 4);
        /// Water grade preset (raw vendor value).
        pub const WATER_USAGE: PropertyId = PropertyId::new(SIID, 5);
        /// Water tank / mop pad attachment. The vendor conflates the two.
        pub const WATER_TANK_ATTACHMENT: PropertyId = PropertyId::new(SIID, 6);
        /// Pending-task indicator. Non-zero while a job waits to resume.
        pub const TASK_STATUS: PropertyId = PropertyId::new(SIID, 7);
        /// Unix timestamp of the last state change.
        pub const STATE_CHANGE_TIMESTAMP: PropertyId = PropertyId::new(SIID, 8);
        /// Unidentified; observed in the field, semantics unknown.
        pub const UNKNOWN_01: PropertyId = PropertyId::new(SIID, 9);
        /// Extra parameters for zone/segment cleanups (JSON string).
        pub const ADDITIONAL_CLEANUP_PROPERTIES: PropertyId = PropertyId::new(SIID, 10);
        /// Carpet boost toggle.
        pub const CARPET_MODE: PropertyId = PropertyId::new(SIID, 12);
        /// Manual movement control channel.
        pub const MANUAL_CONTROL: PropertyId = PropertyId::new(SIID, 15);
        /// Vendor error code. `"0"`/`""` mean no error.
        pub const ERROR_CODE: PropertyId = PropertyId::new(SIID, 18);
        /// Self-location progress (0 located, 1 locating, 10 failed, 11 done).
        pub const LOCATING_STATUS: PropertyId = PropertyId::new(SIID, 20);
        /// Obstacle avoidance toggle.
        pub const OBSTACLE_AVOIDANCE: PropertyId = PropertyId::new(SIID, 21);
        /// Child/key lock toggle.
        pub const KEY_LOCK: PropertyId = PropertyId::new(SIID, 27);

        /// Start a cleanup. Mode and extra parameters go in the `in` params.
        pub const START: ActionId = ActionId::new(SIID, 1);
        /// Stop the current cleanup.
        pub const STOP: ActionId = ActionId::new(SIID, 2);
    }

    /// Battery service.
    pub mod battery {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 3;
        /// Charge level in percent.
        pub const LEVEL: PropertyId = PropertyId::new(SIID, 1);
        /// Charger contact state (see [`is_on_charger`]).
        pub const CHARGING: PropertyId = PropertyId::new(SIID, 2);
        /// Send the robot back to the charger.
        pub const START_CHARGE: ActionId = ActionId::new(SIID, 1);

        /// Collapses the vendor's charging tri-state to "is on charger".
        ///
        /// Observed values: 1 on charger, 2 not on charger, 5 returning to
        /// charger.
        #[must_use]
        pub fn is_on_charger(value: i64) -> bool {
            value == 1
        }
    }

    /// Do-not-disturb service.
    pub mod dnd {
        use crate::miot::PropertyId;

        /// Service id.
        pub const SIID: u16 = 5;
        /// Window enabled flag.
        pub const ENABLED: PropertyId = PropertyId::new(SIID, 1);
        /// Window start, `"HH:MM"`.
        pub const START_TIME: PropertyId = PropertyId::new(SIID, 2);
        /// Window end, `"HH:MM"`.
        pub const END_TIME: PropertyId = PropertyId::new(SIID, 3);
    }

    /// Voice/audio service.
    pub mod audio {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 7;
        /// Speaker volume in percent.
        pub const VOLUME: PropertyId = PropertyId::new(SIID, 1);
        /// Play the locate jingle.
        pub const LOCATE: ActionId = ActionId::new(SIID, 1);
    }

    /// Main brush wear telemetry.
    pub mod main_brush {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 9;
        /// Remaining life in hours.
        pub const TIME_LEFT: PropertyId = PropertyId::new(SIID, 1);
        /// Remaining life in percent.
        pub const PERCENT_LEFT: PropertyId = PropertyId::new(SIID, 2);
        /// Reset the wear counter after replacing the part.
        pub const RESET: ActionId = ActionId::new(SIID, 1);
    }

    /// Side brush wear telemetry.
    pub mod side_brush {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 10;
        /// Remaining life in hours.
        pub const TIME_LEFT: PropertyId = PropertyId::new(SIID, 1);
        /// Remaining life in percent.
        pub const PERCENT_LEFT: PropertyId = PropertyId::new(SIID, 2);
        /// Reset the wear counter after replacing the part.
        pub const RESET: ActionId = ActionId::new(SIID, 1);
    }

    /// Filter wear telemetry. Time and percent piids are swapped relative to
    /// the brush services; that is the vendor's table, not a typo.
    pub mod filter {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 11;
        /// Remaining life in hours.
        pub const TIME_LEFT: PropertyId = PropertyId::new(SIID, 2);
        /// Remaining life in percent.
        pub const PERCENT_LEFT: PropertyId = PropertyId::new(SIID, 1);
        /// Reset the wear counter after replacing the part.
        pub const RESET: ActionId = ActionId::new(SIID, 1);
    }

    /// Sensor wear telemetry. Same swapped piids as [`filter`].
    pub mod sensor {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 16;
        /// Remaining time until the sensors want cleaning, in hours.
        pub const TIME_LEFT: PropertyId = PropertyId::new(SIID, 2);
        /// Remaining time in percent.
        pub const PERCENT_LEFT: PropertyId = PropertyId::new(SIID, 1);
        /// Reset the maintenance counter.
        pub const RESET: ActionId = ActionId::new(SIID, 1);
    }

    /// Map service.
    pub mod map {
        use crate::miot::{ActionId, PropertyId};

        /// Service id.
        pub const SIID: u16 = 6;
        /// Raw map frame payload.
        pub const MAP_DATA: PropertyId = PropertyId::new(SIID, 1);
        /// Frame type (I or P frame).
        pub const FRAME_TYPE: PropertyId = PropertyId::new(SIID, 2);
        /// Cloud-side map filename.
        pub const CLOUD_FILE_NAME: PropertyId = PropertyId::new(SIID, 3);
        /// Map-edit parameter payload (JSON string).
        pub const MAP_DETAILS: PropertyId = PropertyId::new(SIID, 4);
        /// Map-edit action result (JSON string).
        pub const ACTION_RESULT: PropertyId = PropertyId::new(SIID, 6);
        /// Second cloud-side filename variant.
        pub const CLOUD_FILE_NAME_2: PropertyId = PropertyId::new(SIID, 8);

        /// Request a fresh map frame.
        pub const POLL: ActionId = ActionId::new(SIID, 1);
        /// Apply a map edit described by [`MAP_DETAILS`].
        pub const EDIT: ActionId = ActionId::new(SIID, 2);
    }

    /// Persistent map storage toggle.
    pub mod persistent_maps {
        use crate::miot::PropertyId;

        /// Service id.
        pub const SIID: u16 = 13;
        /// Persistence enabled flag.
        pub const ENABLED: PropertyId = PropertyId::new(SIID, 1);
    }

    /// Auto-empty dock service.
    pub mod auto_empty_dock {
        use crate::miot::ActionId;

        /// Service id.
        pub const SIID: u16 = 15;
        /// Empty the dustbin into the dock.
        pub const EMPTY_DUSTBIN: ActionId = ActionId::new(SIID, 1);
    }

    /// Siid some firmwares use to push a duplicate of the device service.
    pub const DEVICE_MIRROR_SIID: u16 = 99;

    /// Mode value selecting a segment-targeted cleanup.
    pub const SEGMENT_CLEANING_MODE: i64 = 18;
    /// Mode value selecting a zone-targeted cleanup.
    pub const ZONE_CLEANING_MODE: i64 = 19;
    /// Mode value selecting a map-building pass without cleaning.
    pub const MAPPING_PASS_MODE: i64 = 21;

    /// Classifies a service identifier for this generation.
    #[must_use]
    pub fn classify(siid: u64) -> ServiceId {
        match siid {
            s if s == u64::from(device::SIID) => ServiceId::Device,
            s if s == u64::from(DEVICE_MIRROR_SIID) => ServiceId::DeviceMirror,
            s if s == u64::from(vacuum_legacy::SIID) => ServiceId::VacuumLegacy,
            s if s == u64::from(vacuum::SIID) => ServiceId::Vacuum,
            s if s == u64::from(battery::SIID) => ServiceId::Battery,
            s if s == u64::from(dnd::SIID) => ServiceId::DoNotDisturb,
            s if s == u64::from(audio::SIID) => ServiceId::Audio,
            s if s == u64::from(main_brush::SIID) => ServiceId::MainBrush,
            s if s == u64::from(side_brush::SIID) => ServiceId::SideBrush,
            s if s == u64::from(filter::SIID) => ServiceId::Filter,
            s if s == u64::from(sensor::SIID) => ServiceId::Sensor,
            s if s == u64::from(map::SIID) => ServiceId::Map,
            s if s == u64::from(persistent_maps::SIID) => ServiceId::PersistentMaps,
            s if s == u64::from(auto_empty_dock::SIID) => ServiceId::AutoEmptyDock,
            other => ServiceId::Unknown(other),
        }
    }

    /// Fan speed presets: semantic name to raw vendor value.
    pub const FAN_SPEED_PRESETS: [(&str, i64); 4] =
        [("low", 0), ("medium", 1), ("high", 2), ("max", 3)];

    /// Water grade presets: semantic name to raw vendor value.
    pub const WATER_GRADE_PRESETS: [(&str, i64); 3] = [("low", 1), ("medium", 2), ("high", 3)];

    /// Reverse lookup of a raw fan speed value against the preset table.
    #[must_use]
    pub fn fan_speed_preset_name(raw: i64) -> Option<&'static str> {
        FAN_SPEED_PRESETS
            .iter()
            .find(|(_, value)| *value == raw)
            .map(|(name, _)| *name)
    }

    /// Reverse lookup of a raw water grade value against the preset table.
    #[must_use]
    pub fn water_grade_preset_name(raw: i64) -> Option<&'static str> {
        WATER_GRADE_PRESETS
            .iter()
            .find(|(_, value)| *value == raw)
            .map(|(name, _)| *name)
    }

    /// Base status and flag for one vacuum mode value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeStatus {
        /// Canonical status value.
        pub value: StatusValue,
        /// Qualifying flag, where the mode implies one.
        pub flag: Option<StatusFlag>,
    }

    /// Maps a vacuum mode value to its base status.
    ///
    /// Returns `None` for modes this generation's firmware has not been
    /// observed to report; callers fall back rather than fail.
    #[must_use]
    pub fn status_for_mode(mode: i64) -> Option<ModeStatus> {
        let (value, flag) = match mode {
            0 => (StatusValue::Idle, None),
            1 => (StatusValue::Paused, None),
            2 | 7 => (StatusValue::Cleaning, None),
            3 | 14 => (StatusValue::Returning, None),
            4 => (StatusValue::Cleaning, Some(StatusFlag::Spot)),
            5 => (StatusValue::Moving, Some(StatusFlag::Target)),
            6 | 13 => (StatusValue::Docked, None),
            SEGMENT_CLEANING_MODE => (StatusValue::Cleaning, Some(StatusFlag::Segment)),
            ZONE_CLEANING_MODE => (StatusValue::Cleaning, Some(StatusFlag::Zone)),
            MAPPING_PASS_MODE => (StatusValue::Moving, Some(StatusFlag::Mapping)),
            _ => return None,
        };

        Some(ModeStatus { value, flag })
    }

    /// Error code the device raises when it docks with the mop pad still
    /// attached. Not a fault; intercepted and turned into a reminder.
    pub const ERROR_CODE_MOP_STILL_ATTACHED: &str = "68";

    /// Human-readable description for a vendor error code.
    #[must_use]
    pub fn error_code_description(code: &str) -> String {
        let description = match code {
            "0" | "" => "No error",
            "1" => "Wheel lost floor contact",
            "2" => "Obstacle sensor dirty",
            "3" => "Stuck front bumper",
            "4" => "Tilted robot",
            "5" | "6" => "Stuck wheel",
            "7" => "Internal error",
            "8" => "Dustbin missing",
            "9" => "Water tank missing",
            "10" => "Water tank empty",
            "11" => "Dustbin full",
            "12" => "Main brush jammed",
            "13" => "Side brush jammed",
            "14" => "Filter jammed",
            "15" | "16" | "17" | "18" => "Robot stuck or trapped",
            "19" => "Charging station without power",
            "20" => "Battery low",
            "21" => "Charging contact dirty",
            "23" => "Internal fan error",
            "24" => "Camera blocked",
            ERROR_CODE_MOP_STILL_ATTACHED => "Docked with mop still attached",
            _ => return format!("Unknown error code {code}"),
        };

        description.to_string()
    }

}
