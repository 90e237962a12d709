// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `MioVac` Lib - A Rust library to control MIOT robot vacuums.
//!
//! MIOT devices speak a numeric, property/action-addressed RPC dialect.
//! This library translates their raw, incremental property reports into a
//! canonical state model, and canonical intents (start cleaning, set fan
//! speed, edit a map zone, reset a consumable) back into protocol requests.
//!
//! # Architecture
//!
//! - [`services`] holds the immutable identifier tables per device
//!   generation; no numeric identifier appears outside it.
//! - [`state`] is the canonical attribute store with upsert semantics.
//! - [`capability`] adapts one operation family each to its protocol
//!   bindings.
//! - [`robot`] ties it together: message routing, state reconciliation,
//!   polling, and the capability registry.
//! - [`miot`] carries the wire vocabulary and the [`miot::Transport`] seam;
//!   how messages physically travel (cloud relay, local socket) is up to
//!   the embedding application.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use miovac_lib::capability::{BasicControlCapability, CapabilityTag};
//! use miovac_lib::miot::Transport;
//! use miovac_lib::robot::{Gen2Robot, NoopMapFetcher};
//! use serde_json::{Value, json};
//!
//! struct CloudSession;
//!
//! impl Transport for CloudSession {
//!     async fn send_command(
//!         &self,
//!         _method: &str,
//!         _params: Value,
//!     ) -> Result<Value, miovac_lib::error::ProtocolError> {
//!         // Deliver the request over your session and return the result.
//!         Ok(json!([]))
//!     }
//!
//!     fn send_cloud(&self, _payload: Value) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> miovac_lib::Result<()> {
//!     let robot = Gen2Robot::new(
//!         Arc::new(CloudSession),
//!         "123456789",
//!         Arc::new(NoopMapFetcher),
//!     )?;
//!
//!     // Feed pushed messages into the reconciler...
//!     let handled = robot
//!         .on_message(&json!({
//!             "id": 1,
//!             "method": "properties_changed",
//!             "params": [{"siid": 3, "piid": 1, "value": 76}]
//!         }))
//!         .await;
//!     assert!(handled);
//!
//!     // ...and issue intents through capabilities.
//!     if let Some(basic) =
//!         robot.capability::<BasicControlCapability<CloudSession>>(CapabilityTag::BasicControl)
//!     {
//!         basic.start().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod capability;
pub mod error;
pub mod event;
pub mod miot;
pub mod robot;
pub mod services;
pub mod state;

pub use capability::{Capability, CapabilityTag};
pub use error::{CapabilityError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{EventBus, RobotEvent};
pub use miot::{ActionId, MiotClient, PropertyId, RawPropertyReport, Transport};
pub use robot::{Gen2Robot, MapFetcher, NoopMapFetcher};
pub use state::{StateAttribute, StateStore, StatusFlag, StatusValue};
