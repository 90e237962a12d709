// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Basic power control: start, stop, pause, return home.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::miot::{ActionId, MiotClient, Transport};

use super::{Capability, CapabilityTag};

/// Action bindings for basic control.
///
/// Start and pause live on the legacy vacuum service while stop lives on
/// the current one; the bindings keep that split out of the capability
/// logic.
#[derive(Debug, Clone, Copy)]
pub struct BasicControlBindings {
    /// Start or resume a cleanup.
    pub start: ActionId,
    /// Stop the current cleanup.
    pub stop: ActionId,
    /// Pause the current cleanup.
    pub pause: ActionId,
    /// Send the robot back to the charger.
    pub home: ActionId,
}

/// Start/stop/pause/home control.
#[derive(Debug)]
pub struct BasicControlCapability<T: Transport> {
    client: MiotClient<T>,
    bindings: BasicControlBindings,
}

impl<T: Transport> BasicControlCapability<T> {
    /// Creates the capability with its action bindings.
    #[must_use]
    pub fn new(client: MiotClient<T>, bindings: BasicControlBindings) -> Self {
        Self { client, bindings }
    }

    /// Starts or resumes a cleanup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn start(&self) -> Result<()> {
        self.client
            .invoke_action(self.bindings.start, Vec::new())
            .await?;
        Ok(())
    }

    /// Stops the current cleanup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn stop(&self) -> Result<()> {
        self.client
            .invoke_action(self.bindings.stop, Vec::new())
            .await?;
        Ok(())
    }

    /// Pauses the current cleanup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn pause(&self) -> Result<()> {
        self.client
            .invoke_action(self.bindings.pause, Vec::new())
            .await?;
        Ok(())
    }

    /// Sends the robot back to the charger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    pub async fn home(&self) -> Result<()> {
        self.client
            .invoke_action(self.bindings.home, Vec::new())
            .await?;
        Ok(())
    }
}

impl<T: Transport> Capability for BasicControlCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::BasicControl
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
