// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Robot event types.

use uuid::Uuid;

/// Events emitted by a robot instance.
///
/// Each event carries a unique instance id so consumers that persist or
/// deduplicate events have a stable handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotEvent {
    /// State attributes may have changed.
    ///
    /// Emitted after every processed report batch, whether or not the
    /// composite status was recomputed.
    StateAttributesUpdated {
        /// Unique event instance id.
        event_id: Uuid,
    },

    /// The robot docked with the mop pad still attached (or vice versa);
    /// the user should check the attachment.
    ///
    /// Raised once per triggering report batch.
    MopAttachmentReminder {
        /// Unique event instance id.
        event_id: Uuid,
    },
}

impl RobotEvent {
    /// Creates a state-attributes-updated event.
    #[must_use]
    pub fn state_attributes_updated() -> Self {
        Self::StateAttributesUpdated {
            event_id: Uuid::new_v4(),
        }
    }

    /// Creates a mop-attachment-reminder event.
    #[must_use]
    pub fn mop_attachment_reminder() -> Self {
        Self::MopAttachmentReminder {
            event_id: Uuid::new_v4(),
        }
    }

    /// Returns the event instance id.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        match self {
            Self::StateAttributesUpdated { event_id } | Self::MopAttachmentReminder { event_id } => {
                *event_id
            }
        }
    }

    /// Returns `true` if this is a user-facing reminder.
    #[must_use]
    pub fn is_reminder(&self) -> bool {
        matches!(self, Self::MopAttachmentReminder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_get_distinct_ids() {
        let a = RobotEvent::state_attributes_updated();
        let b = RobotEvent::state_attributes_updated();

        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn reminder_classification() {
        assert!(RobotEvent::mop_attachment_reminder().is_reminder());
        assert!(!RobotEvent::state_attributes_updated().is_reminder());
    }
}
