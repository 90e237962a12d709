// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composite-status derivation.
//!
//! The device never reports its high-level state directly; it reports a
//! mode, an error code, a pending-task indicator, and a charger contact
//! flag, each on its own schedule. This module folds one coherent snapshot
//! of those scalars into the single status attribute, applying the
//! vendor-specific precedence rules.

use crate::services::gen2;
use crate::state::{StatusAttribute, StatusFlag, StatusValue};

/// Result of one derivation pass.
#[derive(Debug)]
pub(crate) struct DerivedStatus {
    /// The status attribute to upsert.
    pub attribute: StatusAttribute,
    /// Whether the mop-attachment reminder should be raised.
    pub mop_reminder: bool,
}

/// Derives the composite status from the transient scalar snapshot.
///
/// Precedence: a clear error code defers to the mode table, with two
/// corrections layered on top (pending task while docked, charging while
/// nominally idle). A set error code wins over the mode, except code 68,
/// which the vendor raises for "docked with mop still attached" and which
/// is a reminder, not a fault.
pub(crate) fn derive_status(
    mode: i64,
    error_code: &str,
    task_status: i64,
    is_on_charger: bool,
) -> DerivedStatus {
    let mut attribute;
    let mut mop_reminder = false;

    if error_code.is_empty() || error_code == "0" {
        let base = gen2::status_for_mode(mode).unwrap_or_else(|| {
            tracing::warn!(mode, "Unmapped vacuum mode, reporting as idle");
            gen2::ModeStatus {
                value: StatusValue::Idle,
                flag: None,
            }
        });

        attribute = StatusAttribute::new(base.value);
        attribute.flag = base.flag;

        if attribute.value == StatusValue::Docked && task_status != 0 {
            // Parked on low battery with a job pending; it will resume once
            // charged enough.
            attribute.flag = Some(StatusFlag::Resumable);
        } else if attribute.value == StatusValue::Idle
            && attribute.flag.is_none()
            && is_on_charger
        {
            // Idle-while-charging is indistinguishable from docked at the
            // mode level; the charging scalar disambiguates.
            attribute.value = StatusValue::Docked;
        }
    } else if error_code == gen2::ERROR_CODE_MOP_STILL_ATTACHED {
        attribute = StatusAttribute::new(StatusValue::Docked);
        mop_reminder = true;
    } else {
        attribute = StatusAttribute::new(StatusValue::Error);
        attribute
            .metadata
            .insert("error_code".to_string(), error_code.to_string());
        attribute.metadata.insert(
            "error_description".to_string(),
            gen2::error_code_description(error_code),
        );
    }

    DerivedStatus {
        attribute,
        mop_reminder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_error_defers_to_mode_table() {
        let derived = derive_status(2, "0", 0, false);
        assert_eq!(derived.attribute.value, StatusValue::Cleaning);
        assert_eq!(derived.attribute.flag, None);
        assert!(!derived.mop_reminder);
    }

    #[test]
    fn empty_error_code_counts_as_clear() {
        let derived = derive_status(6, "", 0, false);
        assert_eq!(derived.attribute.value, StatusValue::Docked);
    }

    #[test]
    fn docked_with_pending_task_is_resumable() {
        let derived = derive_status(6, "0", 3, true);
        assert_eq!(derived.attribute.value, StatusValue::Docked);
        assert_eq!(derived.attribute.flag, Some(StatusFlag::Resumable));
    }

    #[test]
    fn idle_on_charger_promotes_to_docked() {
        let derived = derive_status(0, "0", 0, true);
        assert_eq!(derived.attribute.value, StatusValue::Docked);
        assert_eq!(derived.attribute.flag, None);
    }

    #[test]
    fn idle_off_charger_stays_idle() {
        let derived = derive_status(0, "0", 0, false);
        assert_eq!(derived.attribute.value, StatusValue::Idle);
    }

    #[test]
    fn flagged_modes_are_not_promoted() {
        // Zone cleanups keep their flag even while the charger scalar is set
        // (it lags behind after leaving the dock).
        let derived = derive_status(19, "0", 0, true);
        assert_eq!(derived.attribute.value, StatusValue::Cleaning);
        assert_eq!(derived.attribute.flag, Some(StatusFlag::Zone));
    }

    #[test]
    fn mop_code_is_docked_with_reminder() {
        let derived = derive_status(6, "68", 0, true);
        assert_eq!(derived.attribute.value, StatusValue::Docked);
        assert!(derived.mop_reminder);
        assert!(derived.attribute.metadata.is_empty());
    }

    #[test]
    fn other_error_codes_surface_as_error() {
        let derived = derive_status(2, "12", 0, false);
        assert_eq!(derived.attribute.value, StatusValue::Error);
        assert!(!derived.mop_reminder);
        assert_eq!(
            derived.attribute.metadata.get("error_code").map(String::as_str),
            Some("12")
        );
        assert_eq!(
            derived
                .attribute
                .metadata
                .get("error_description")
                .map(String::as_str),
            Some("Main brush jammed")
        );
    }

    #[test]
    fn unmapped_mode_falls_back_to_idle() {
        let derived = derive_status(1234, "0", 0, false);
        assert_eq!(derived.attribute.value, StatusValue::Idle);
    }
}
