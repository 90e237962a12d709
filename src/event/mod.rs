// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for robot notifications.
//!
//! This module provides a pub/sub event system for notifying subscribers
//! about state changes and user-facing reminders. The [`EventBus`] uses
//! tokio's broadcast channel to allow multiple subscribers to receive
//! events.
//!
//! # Examples
//!
//! ```
//! use miovac_lib::event::{EventBus, RobotEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(RobotEvent::state_attributes_updated());
//! ```

mod event_bus;
mod robot_event;

pub use event_bus::EventBus;
pub use robot_event::RobotEvent;
