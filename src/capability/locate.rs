// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Locate: make the robot announce its position.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::miot::{ActionId, MiotClient, Transport};

use super::{Capability, CapabilityTag};

/// Plays the locate jingle through the robot's speaker.
#[derive(Debug)]
pub struct LocateCapability<T: Transport> {
    client: MiotClient<T>,
    action: ActionId,
}

impl<T: Transport> LocateCapability<T> {
    /// Creates the capability with its action binding.
    #[must_use]
    pub fn new(client: MiotClient<T>, action: ActionId) -> Self {
        Self { client, action }
    }

    /// Asks the robot to announce its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn locate(&self) -> Result<()> {
        self.client.invoke_action(self.action, Vec::new()).await?;
        Ok(())
    }
}

impl<T: Transport> Capability for LocateCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::Locate
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
