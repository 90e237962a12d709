// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The robot instance: capability registry, reconciler, and poller.
//!
//! A [`Gen2Robot`] owns everything belonging to one device session: the
//! outbound client, the capability registry, the state store, and the
//! transient scalars that feed status derivation. All store mutations go
//! through the reconciliation path, which is serialized by a single async
//! mutex: a report batch is fully applied, including status derivation,
//! before the next one starts, and a poll awaiting its response excludes
//! push-driven mutation of the same store.

mod status;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use crate::capability::{
    BasicControlBindings, BasicControlCapability, Capability, CapabilityTag, CleaningBindings,
    ConsumableBinding, ConsumableBindings, ConsumableMonitoringCapability, DoNotDisturbBindings,
    DoNotDisturbCapability, LocateCapability, MapEditBindings, MapResetCapability,
    MapSegmentEditCapability, MapSegmentRenameCapability, MapSegmentationCapability,
    MappingPassCapability, PresetSelectionCapability, SelectionPreset,
    SpeakerVolumeControlCapability, ToggleSettingCapability, VirtualRestrictionsCapability,
    ZoneCleaningCapability,
};
use crate::error::Result;
use crate::event::{EventBus, RobotEvent};
use crate::miot::{InboundMessage, MiotClient, RawPropertyReport, Transport, ack};
use crate::services::{ServiceId, gen2};
use crate::state::{
    AttachmentAttribute, AttachmentType, BatteryAttribute, PresetSelectionAttribute, PresetType,
    StateAttribute, StateStore,
};

use status::derive_status;

/// Minimum spacing between map refresh requests.
const MAP_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Collaborator that fetches map data out of band.
///
/// Map frames are large and decoded elsewhere; the reconciler only nudges
/// the fetcher when the robot enters an active state, because that is when
/// the map changes.
pub trait MapFetcher: Send + Sync {
    /// Requests a map refresh. Fire-and-forget; implementations spawn their
    /// own work and must not block.
    fn poll_map(&self);
}

/// A map fetcher that does nothing, for setups without map support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMapFetcher;

impl MapFetcher for NoopMapFetcher {
    fn poll_map(&self) {}
}

/// Store and transient scalars, guarded as one unit.
///
/// The scalars are meaningless individually; only a coherent snapshot of
/// all of them yields a valid status. They are mutated exclusively while a
/// report batch is applied and never exposed to observers.
#[derive(Debug)]
struct ReconcilerState {
    store: StateStore,
    mode: i64,
    error_code: String,
    task_status: i64,
    is_on_charger: bool,
    state_needs_update: bool,
}

impl ReconcilerState {
    fn new() -> Self {
        Self {
            store: StateStore::new(),
            mode: 0,
            error_code: "0".to_string(),
            task_status: 0,
            is_on_charger: false,
            state_needs_update: false,
        }
    }
}

/// Side effects owed after a batch has been applied.
///
/// Collected under the lock, executed after it is released.
#[derive(Debug, Default)]
struct BatchOutcome {
    notify: bool,
    mop_reminder: bool,
    trigger_map_poll: bool,
}

/// A second-generation MIOT vacuum robot.
///
/// Construction wires the full capability roster for this generation from
/// the identifier tables in [`crate::services::gen2`] and seeds the store
/// with detached attachment attributes.
pub struct Gen2Robot<T: Transport> {
    client: MiotClient<T>,
    capabilities: HashMap<CapabilityTag, Arc<dyn Capability>>,
    // Second, concretely-typed reference next to the registry entry: the
    // reconciler delegates consumable reports to it directly.
    consumables: Arc<ConsumableMonitoringCapability<T>>,
    reconciler: Mutex<ReconcilerState>,
    events: EventBus,
    map_fetcher: Arc<dyn MapFetcher>,
    last_map_poll: parking_lot::Mutex<Option<Instant>>,
}

impl<T: Transport> Gen2Robot<T> {
    /// Creates a robot for the given transport and device id.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` if a built-in capability cannot be
    /// assembled; the robot is unusable in that case.
    pub fn new(
        transport: Arc<T>,
        device_id: impl Into<String>,
        map_fetcher: Arc<dyn MapFetcher>,
    ) -> Result<Self> {
        let client = MiotClient::new(transport, device_id);

        let consumables = Arc::new(ConsumableMonitoringCapability::new(
            client.clone(),
            ConsumableBindings {
                main_brush: ConsumableBinding {
                    time_left: gen2::main_brush::TIME_LEFT,
                    percent_left: gen2::main_brush::PERCENT_LEFT,
                    reset: gen2::main_brush::RESET,
                },
                side_brush: ConsumableBinding {
                    time_left: gen2::side_brush::TIME_LEFT,
                    percent_left: gen2::side_brush::PERCENT_LEFT,
                    reset: gen2::side_brush::RESET,
                },
                filter: ConsumableBinding {
                    time_left: gen2::filter::TIME_LEFT,
                    percent_left: gen2::filter::PERCENT_LEFT,
                    reset: gen2::filter::RESET,
                },
                sensor: ConsumableBinding {
                    time_left: gen2::sensor::TIME_LEFT,
                    percent_left: gen2::sensor::PERCENT_LEFT,
                    reset: gen2::sensor::RESET,
                },
            },
        ));

        let mut robot = Self {
            client: client.clone(),
            capabilities: HashMap::new(),
            consumables: Arc::clone(&consumables),
            reconciler: Mutex::new(ReconcilerState::new()),
            events: EventBus::new(),
            map_fetcher,
            last_map_poll: parking_lot::Mutex::new(None),
        };

        robot.register_capability(Arc::new(BasicControlCapability::new(
            client.clone(),
            BasicControlBindings {
                start: gen2::vacuum_legacy::RESUME,
                stop: gen2::vacuum::STOP,
                pause: gen2::vacuum_legacy::PAUSE,
                home: gen2::battery::START_CHARGE,
            },
        )));

        robot.register_capability(Arc::new(PresetSelectionCapability::fan_speed(
            client.clone(),
            gen2::vacuum::FAN_SPEED,
            gen2::FAN_SPEED_PRESETS
                .iter()
                .map(|&(name, value)| SelectionPreset::new(name, value))
                .collect(),
        )?));

        robot.register_capability(Arc::new(PresetSelectionCapability::water_usage(
            client.clone(),
            gen2::vacuum::WATER_USAGE,
            gen2::WATER_GRADE_PRESETS
                .iter()
                .map(|&(name, value)| SelectionPreset::new(name, value))
                .collect(),
        )?));

        robot.register_capability(Arc::new(LocateCapability::new(
            client.clone(),
            gen2::audio::LOCATE,
        )));

        let cleaning_bindings = CleaningBindings {
            start: gen2::vacuum::START,
            mode: gen2::vacuum::MODE,
            additional_parameters: gen2::vacuum::ADDITIONAL_CLEANUP_PROPERTIES,
        };
        robot.register_capability(Arc::new(ZoneCleaningCapability::new(
            client.clone(),
            cleaning_bindings,
            gen2::ZONE_CLEANING_MODE,
        )));
        robot.register_capability(Arc::new(MapSegmentationCapability::new(
            client.clone(),
            cleaning_bindings,
            gen2::SEGMENT_CLEANING_MODE,
        )));
        robot.register_capability(Arc::new(MappingPassCapability::new(
            client.clone(),
            gen2::vacuum::START,
            gen2::vacuum::MODE,
            gen2::MAPPING_PASS_MODE,
        )));

        let map_edit_bindings = MapEditBindings {
            edit: gen2::map::EDIT,
            map_details: gen2::map::MAP_DETAILS,
            action_result: gen2::map::ACTION_RESULT,
        };
        robot.register_capability(Arc::new(MapSegmentEditCapability::new(
            client.clone(),
            map_edit_bindings,
        )));
        robot.register_capability(Arc::new(MapSegmentRenameCapability::new(
            client.clone(),
            map_edit_bindings,
        )));
        robot.register_capability(Arc::new(MapResetCapability::new(
            client.clone(),
            map_edit_bindings,
        )));
        robot.register_capability(Arc::new(VirtualRestrictionsCapability::new(
            client.clone(),
            map_edit_bindings,
        )));

        robot.register_capability(Arc::clone(&consumables) as Arc<dyn Capability>);

        robot.register_capability(Arc::new(SpeakerVolumeControlCapability::new(
            client.clone(),
            gen2::audio::VOLUME,
        )));
        robot.register_capability(Arc::new(ToggleSettingCapability::carpet_mode(
            client.clone(),
            gen2::vacuum::CARPET_MODE,
        )));
        robot.register_capability(Arc::new(ToggleSettingCapability::key_lock(
            client.clone(),
            gen2::vacuum::KEY_LOCK,
        )));
        robot.register_capability(Arc::new(DoNotDisturbCapability::new(
            client,
            DoNotDisturbBindings {
                enabled: gen2::dnd::ENABLED,
                start_time: gen2::dnd::START_TIME,
                end_time: gen2::dnd::END_TIME,
            },
        )));

        {
            let state = robot.reconciler.get_mut();
            state
                .store
                .upsert_first_matching_attribute(StateAttribute::Attachment(
                    AttachmentAttribute {
                        kind: AttachmentType::Watertank,
                        attached: false,
                    },
                ));
            state
                .store
                .upsert_first_matching_attribute(StateAttribute::Attachment(
                    AttachmentAttribute {
                        kind: AttachmentType::Mop,
                        attached: false,
                    },
                ));
        }

        Ok(robot)
    }

    /// Returns the device id this robot is bound to.
    #[must_use]
    pub fn device_id(&self) -> &str {
        self.client.device_id()
    }

    /// Registers a capability, replacing any previous one with the same tag.
    pub fn register_capability(&mut self, capability: Arc<dyn Capability>) {
        let tag = capability.tag();
        if self.capabilities.insert(tag, capability).is_some() {
            tracing::debug!(%tag, "Replacing previously registered capability");
        }
    }

    /// Returns whether a capability is registered for the tag.
    #[must_use]
    pub fn supports(&self, tag: CapabilityTag) -> bool {
        self.capabilities.contains_key(&tag)
    }

    /// Returns the registered capability tags, sorted.
    #[must_use]
    pub fn supported_capabilities(&self) -> Vec<CapabilityTag> {
        let mut tags: Vec<_> = self.capabilities.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Returns the capability registered for the tag, downcast to its
    /// concrete type.
    ///
    /// Returns `None` if nothing is registered for the tag or the
    /// registered capability is of a different type.
    #[must_use]
    pub fn capability<C: Capability>(&self, tag: CapabilityTag) -> Option<Arc<C>> {
        let capability = Arc::clone(self.capabilities.get(&tag)?);
        capability.as_any().downcast::<C>().ok()
    }

    /// Returns the consumable monitor.
    ///
    /// This is the same instance as the registry entry under
    /// [`CapabilityTag::ConsumableMonitoring`], kept as a typed reference
    /// for the reconciler.
    #[must_use]
    pub fn consumable_monitoring(&self) -> &Arc<ConsumableMonitoringCapability<T>> {
        &self.consumables
    }

    /// Subscribes to robot events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RobotEvent> {
        self.events.subscribe()
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> StateStore {
        self.reconciler.lock().await.store.clone()
    }

    /// Handles a message pushed by the device.
    ///
    /// Returns whether the message was handled. Handled messages are
    /// acknowledged back through the transport; unrecognized ones are left
    /// for an outer layer.
    pub async fn on_message(&self, msg: &Value) -> bool {
        let Some(message) = InboundMessage::parse(msg) else {
            return false;
        };

        match message {
            InboundMessage::PropertiesChanged { id, params } => {
                for element in &params {
                    self.route_property_change(element).await;
                }
                self.client.send_cloud(ack(id));
                true
            }
            InboundMessage::Props { id, params } => {
                if params.is_some_and(|p| p.ota_state.is_some()) {
                    self.client.send_cloud(ack(id));
                    true
                } else {
                    false
                }
            }
            InboundMessage::EventOccurred { id } => {
                // Describes a finished cleanup, not the current state.
                self.client.send_cloud(ack(id));
                true
            }
        }
    }

    /// Routes one pushed property-change element by its service id.
    async fn route_property_change(&self, element: &Value) {
        let Some(siid) = element.get("siid").and_then(Value::as_u64) else {
            tracing::warn!(%element, "Property change without service id");
            return;
        };

        match gen2::classify(siid) {
            ServiceId::Map => {
                let piid = element.get("piid").and_then(Value::as_u64).unwrap_or(0);
                if piid == u64::from(gen2::map::MAP_DATA.piid) {
                    // Pushed frames are P-frames, which are unsupported.
                } else if piid == u64::from(gen2::map::CLOUD_FILE_NAME.piid)
                    || piid == u64::from(gen2::map::CLOUD_FILE_NAME_2.piid)
                {
                    // Cloud-side filenames are irrelevant here.
                } else {
                    tracing::warn!(piid, "Unhandled map property change");
                }
            }
            ServiceId::VacuumLegacy
            | ServiceId::Vacuum
            | ServiceId::Battery
            | ServiceId::MainBrush
            | ServiceId::SideBrush
            | ServiceId::Filter
            | ServiceId::Sensor => {
                self.parse_and_update_state(&Value::Array(vec![element.clone()]))
                    .await;
            }
            ServiceId::Device | ServiceId::DeviceMirror => {
                // Device identity is pulled on demand.
            }
            ServiceId::Audio => {
                // Audio state is polled when required; pushes carry nothing new.
            }
            ServiceId::AutoEmptyDock => {
                // Dock control is not modeled (yet?).
            }
            ServiceId::DoNotDisturb | ServiceId::PersistentMaps | ServiceId::Unknown(_) => {
                tracing::warn!(siid, "Unhandled property change");
            }
        }
    }

    /// Applies a batch of raw property reports to the state model.
    ///
    /// A payload that is not an array is logged and dropped without
    /// touching the store. After a batch is applied, the composite status
    /// is re-derived once if any status-relevant scalar changed, and
    /// observers are notified that attributes may have changed.
    pub async fn parse_and_update_state(&self, data: &Value) {
        let mut state = self.reconciler.lock().await;
        let outcome = self.apply_batch(&mut state, data);
        drop(state);
        self.finish_batch(outcome);
    }

    /// Polls the fixed property set and applies the response.
    ///
    /// A failed poll leaves the store untouched and returns the prior
    /// state; partial overwrites cannot happen. The reconciler lock is held
    /// across the round trip, so a pushed batch cannot interleave with the
    /// poll's application.
    pub async fn poll_state(&self) -> StateStore {
        let props = [
            gen2::vacuum::MODE,
            gen2::vacuum::TASK_STATUS,
            gen2::vacuum::FAN_SPEED,
            gen2::vacuum::WATER_USAGE,
            gen2::vacuum::WATER_TANK_ATTACHMENT,
            gen2::vacuum::ERROR_CODE,
            gen2::battery::LEVEL,
            gen2::battery::CHARGING,
        ];

        let mut state = self.reconciler.lock().await;
        match self.client.get_properties(&props).await {
            Ok(response) if !response.is_null() => {
                let outcome = self.apply_batch(&mut state, &response);
                let snapshot = state.store.clone();
                drop(state);
                self.finish_batch(outcome);
                snapshot
            }
            Ok(_) => {
                tracing::debug!("Empty poll response, keeping previous state");
                state.store.clone()
            }
            Err(err) => {
                tracing::warn!(error = %err, "State poll failed, keeping previous state");
                state.store.clone()
            }
        }
    }

    /// Applies one batch under the reconciler lock.
    fn apply_batch(&self, state: &mut ReconcilerState, data: &Value) -> BatchOutcome {
        let Some(elements) = data.as_array() else {
            tracing::error!(payload = %data, "Received non-array state payload");
            return BatchOutcome::default();
        };

        for element in elements {
            match serde_json::from_value::<RawPropertyReport>(element.clone()) {
                Ok(report) => self.apply_report(state, &report),
                Err(err) => {
                    tracing::warn!(payload = %element, error = %err, "Malformed property report");
                }
            }
        }

        let mut outcome = BatchOutcome {
            notify: true,
            ..BatchOutcome::default()
        };

        if state.state_needs_update {
            let derived = derive_status(
                state.mode,
                &state.error_code,
                state.task_status,
                state.is_on_charger,
            );

            outcome.mop_reminder = derived.mop_reminder;
            outcome.trigger_map_poll = derived.attribute.value.is_active();

            state
                .store
                .upsert_first_matching_attribute(StateAttribute::Status(derived.attribute));
            state.state_needs_update = false;
        }

        outcome
    }

    /// Applies one report to the scalars or the store.
    fn apply_report(&self, state: &mut ReconcilerState, report: &RawPropertyReport) {
        match gen2::classify(u64::from(report.siid)) {
            ServiceId::VacuumLegacy => {
                // Everything here is also on the current vacuum service.
            }
            ServiceId::Vacuum => apply_vacuum_report(state, report),
            ServiceId::Battery => apply_battery_report(state, report),
            ServiceId::MainBrush | ServiceId::SideBrush | ServiceId::Filter | ServiceId::Sensor => {
                self.consumables
                    .parse_consumables_message(report, &mut state.store);
            }
            _ => {
                tracing::warn!(siid = report.siid, piid = report.piid, "Unhandled property update");
            }
        }
    }

    /// Runs the side effects owed after a batch.
    fn finish_batch(&self, outcome: BatchOutcome) {
        if outcome.mop_reminder {
            self.events.publish(RobotEvent::mop_attachment_reminder());
        }
        if outcome.trigger_map_poll {
            self.request_map_poll();
        }
        if outcome.notify {
            self.events.publish(RobotEvent::state_attributes_updated());
        }
    }

    /// Nudges the map fetcher, rate-limited.
    fn request_map_poll(&self) {
        let mut last = self.last_map_poll.lock();
        let now = Instant::now();

        if last.is_none_or(|t| now.duration_since(t) >= MAP_POLL_INTERVAL) {
            *last = Some(now);
            self.map_fetcher.poll_map();
        }
    }
}

/// Applies one report from the current vacuum service.
fn apply_vacuum_report(state: &mut ReconcilerState, report: &RawPropertyReport) {
    let piid = report.piid;

    if piid == gen2::vacuum::MODE.piid {
        if let Some(mode) = report.value_as_i64() {
            state.mode = mode;
            state.state_needs_update = true;
        } else {
            tracing::warn!(value = %report.value, "Non-numeric mode value");
        }
    } else if piid == gen2::vacuum::ERROR_CODE.piid {
        if let Some(code) = report.value_as_code() {
            state.error_code = code;
            state.state_needs_update = true;
        } else {
            tracing::warn!(value = %report.value, "Uninterpretable error code");
        }
    } else if piid == gen2::vacuum::TASK_STATUS.piid {
        if let Some(task_status) = report.value_as_i64() {
            state.task_status = task_status;
            state.state_needs_update = true;
        } else {
            tracing::warn!(value = %report.value, "Non-numeric task status");
        }
    } else if piid == gen2::vacuum::FAN_SPEED.piid {
        if let Some(raw) = report.value_as_i64() {
            state
                .store
                .upsert_first_matching_attribute(StateAttribute::PresetSelection(
                    PresetSelectionAttribute {
                        kind: PresetType::FanSpeed,
                        selected: gen2::fan_speed_preset_name(raw).map(str::to_string),
                        raw_value: raw,
                    },
                ));
        }
    } else if piid == gen2::vacuum::WATER_USAGE.piid {
        if let Some(raw) = report.value_as_i64() {
            state
                .store
                .upsert_first_matching_attribute(StateAttribute::PresetSelection(
                    PresetSelectionAttribute {
                        kind: PresetType::WaterGrade,
                        selected: gen2::water_grade_preset_name(raw).map(str::to_string),
                        raw_value: raw,
                    },
                ));
        }
    } else if piid == gen2::vacuum::WATER_TANK_ATTACHMENT.piid {
        // The vendor reports tank and mop pad through one property.
        let attached = report.value_as_i64() == Some(1);
        state
            .store
            .upsert_first_matching_attribute(StateAttribute::Attachment(
                AttachmentAttribute {
                    kind: AttachmentType::Watertank,
                    attached,
                },
            ));
        state
            .store
            .upsert_first_matching_attribute(StateAttribute::Attachment(
                AttachmentAttribute {
                    kind: AttachmentType::Mop,
                    attached,
                },
            ));
    } else if piid == gen2::vacuum::CLEANING_TIME.piid
        || piid == gen2::vacuum::CLEANING_AREA.piid
        || piid == gen2::vacuum::STATE_CHANGE_TIMESTAMP.piid
        || piid == gen2::vacuum::UNKNOWN_01.piid
        || piid == gen2::vacuum::LOCATING_STATUS.piid
        || piid == gen2::vacuum::CARPET_MODE.piid
        || piid == gen2::vacuum::KEY_LOCK.piid
        || piid == gen2::vacuum::OBSTACLE_AVOIDANCE.piid
    {
        // Known but not reflected in the canonical state.
    } else {
        tracing::warn!(piid, "Unhandled vacuum property");
    }
}

/// Applies one report from the battery service.
fn apply_battery_report(state: &mut ReconcilerState, report: &RawPropertyReport) {
    if report.piid == gen2::battery::LEVEL.piid {
        if let Some(level) = report.value_as_i64() {
            let level = u8::try_from(level.clamp(0, 100)).unwrap_or(100);
            state
                .store
                .upsert_first_matching_attribute(StateAttribute::Battery(BatteryAttribute {
                    level,
                }));
        }
    } else if report.piid == gen2::battery::CHARGING.piid {
        if let Some(value) = report.value_as_i64() {
            state.is_on_charger = gen2::battery::is_on_charger(value);
            state.state_needs_update = true;
        }
    }
}
