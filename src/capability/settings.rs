// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simple device settings: boolean toggles and the speaker volume.

use std::any::Any;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{ProtocolError, Result, ValueError};
use crate::miot::{MiotClient, PropertyId, Transport};

use super::{Capability, CapabilityTag};

/// Speaker volume bounds in percent.
const VOLUME_MIN: i64 = 0;
const VOLUME_MAX: i64 = 100;

/// A boolean device setting behind one property.
///
/// Carpet boost and the key lock are the same shape on the wire (0/1
/// integers); one capability type serves both, parameterized by its tag.
#[derive(Debug)]
pub struct ToggleSettingCapability<T: Transport> {
    client: MiotClient<T>,
    property: PropertyId,
    tag: CapabilityTag,
}

impl<T: Transport> ToggleSettingCapability<T> {
    /// Creates the carpet boost toggle.
    #[must_use]
    pub fn carpet_mode(client: MiotClient<T>, property: PropertyId) -> Self {
        Self {
            client,
            property,
            tag: CapabilityTag::CarpetModeControl,
        }
    }

    /// Creates the child/key lock toggle.
    #[must_use]
    pub fn key_lock(client: MiotClient<T>, property: PropertyId) -> Self {
        Self {
            client,
            property,
            tag: CapabilityTag::KeyLock,
        }
    }

    /// Reads the current setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the read could not be issued or the value is not
    /// interpretable.
    pub async fn is_enabled(&self) -> Result<bool> {
        let value = self.client.get_property(self.property).await?;

        match value {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64() == Some(1)),
            other => Err(ProtocolError::UnexpectedResponse(format!(
                "toggle property returned {other}"
            ))
            .into()),
        }
    }

    /// Writes the setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be issued.
    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.client
            .set_property(self.property, json!(i32::from(enabled)))
            .await?;
        Ok(())
    }
}

impl<T: Transport> Capability for ToggleSettingCapability<T> {
    fn tag(&self) -> CapabilityTag {
        self.tag
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Speaker volume control (0-100 percent).
#[derive(Debug)]
pub struct SpeakerVolumeControlCapability<T: Transport> {
    client: MiotClient<T>,
    property: PropertyId,
}

impl<T: Transport> SpeakerVolumeControlCapability<T> {
    /// Creates the capability with its property binding.
    #[must_use]
    pub fn new(client: MiotClient<T>, property: PropertyId) -> Self {
        Self { client, property }
    }

    /// Reads the current volume in percent.
    ///
    /// # Errors
    ///
    /// Returns an error if the read could not be issued or the value is not
    /// numeric.
    pub async fn volume(&self) -> Result<u8> {
        let value = self.client.get_property(self.property).await?;

        let volume = value.as_i64().ok_or_else(|| {
            ProtocolError::UnexpectedResponse(format!("volume property returned {value}"))
        })?;

        Ok(u8::try_from(volume.clamp(VOLUME_MIN, VOLUME_MAX)).unwrap_or(100))
    }

    /// Sets the volume in percent.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for values above 100, or a protocol
    /// error if the write could not be issued.
    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        if i64::from(volume) > VOLUME_MAX {
            return Err(ValueError::OutOfRange {
                min: VOLUME_MIN,
                max: VOLUME_MAX,
                actual: i64::from(volume),
            }
            .into());
        }

        self.client.set_property(self.property, json!(volume)).await?;
        Ok(())
    }
}

impl<T: Transport> Capability for SpeakerVolumeControlCapability<T> {
    fn tag(&self) -> CapabilityTag {
        CapabilityTag::SpeakerVolumeControl
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
