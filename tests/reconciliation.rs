// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for message routing, state reconciliation, and polling.

mod support;

use std::sync::Arc;

use miovac_lib::error::ProtocolError;
use miovac_lib::event::RobotEvent;
use miovac_lib::robot::{Gen2Robot, MapFetcher};
use miovac_lib::state::{
    AttachmentType, ConsumableKind, PresetType, StatusFlag, StatusValue,
};
use serde_json::{Value, json};
use tokio::sync::broadcast;

use support::{CountingMapFetcher, MockTransport};

fn robot() -> (
    Arc<MockTransport>,
    Arc<CountingMapFetcher>,
    Gen2Robot<MockTransport>,
) {
    let transport = Arc::new(MockTransport::new());
    let fetcher = Arc::new(CountingMapFetcher::new());
    let robot = Gen2Robot::new(
        Arc::clone(&transport),
        "471865291",
        Arc::clone(&fetcher) as Arc<dyn MapFetcher>,
    )
    .expect("gen2 robot construction");

    (transport, fetcher, robot)
}

/// Drains the receiver and counts mop-attachment reminders.
fn drain_reminders(rx: &mut broadcast::Receiver<RobotEvent>) -> usize {
    let mut reminders = 0;
    while let Ok(event) = rx.try_recv() {
        if event.is_reminder() {
            reminders += 1;
        }
    }
    reminders
}

// ============================================================================
// Status Derivation
// ============================================================================

#[tokio::test]
async fn cleaning_mode_with_clear_error_yields_cleaning_status() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 2},
            {"siid": 4, "piid": 18, "value": "0"}
        ]))
        .await;

    let state = robot.state().await;
    let status = state.status().expect("status derived");
    assert_eq!(status.value, StatusValue::Cleaning);
    assert_eq!(status.flag, None);
    assert!(status.metadata.is_empty());
}

#[tokio::test]
async fn idle_while_charging_is_promoted_to_docked() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 3, "piid": 2, "value": 1}]))
        .await;
    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 0},
            {"siid": 4, "piid": 18, "value": "0"}
        ]))
        .await;

    let state = robot.state().await;
    assert_eq!(state.status().unwrap().value, StatusValue::Docked);
}

#[tokio::test]
async fn docked_with_pending_task_is_flagged_resumable() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 6},
            {"siid": 4, "piid": 7, "value": 3},
            {"siid": 4, "piid": 18, "value": "0"}
        ]))
        .await;

    let state = robot.state().await;
    let status = state.status().unwrap();
    assert_eq!(status.value, StatusValue::Docked);
    assert_eq!(status.flag, Some(StatusFlag::Resumable));
}

#[tokio::test]
async fn genuine_error_code_surfaces_with_description() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 4, "piid": 18, "value": "12"}]))
        .await;

    let state = robot.state().await;
    let status = state.status().unwrap();
    assert_eq!(status.value, StatusValue::Error);
    assert_eq!(status.metadata.get("error_code").map(String::as_str), Some("12"));
    assert_eq!(
        status.metadata.get("error_description").map(String::as_str),
        Some("Main brush jammed")
    );
}

#[tokio::test]
async fn mop_attachment_code_never_surfaces_as_error() {
    let (_, _, robot) = robot();
    let mut rx = robot.subscribe();

    robot
        .parse_and_update_state(&json!([{"siid": 4, "piid": 18, "value": "68"}]))
        .await;

    let state = robot.state().await;
    let status = state.status().unwrap();
    assert_eq!(status.value, StatusValue::Docked);
    assert!(status.metadata.is_empty());
    assert_eq!(drain_reminders(&mut rx), 1);
}

#[tokio::test]
async fn mop_reminder_fires_once_per_triggering_batch() {
    let (_, _, robot) = robot();
    let mut rx = robot.subscribe();

    let batch = json!([{"siid": 4, "piid": 18, "value": "68"}]);
    robot.parse_and_update_state(&batch).await;
    robot.parse_and_update_state(&batch).await;

    assert_eq!(drain_reminders(&mut rx), 2);
}

#[tokio::test]
async fn numeric_error_codes_match_string_sentinels() {
    let (_, _, robot) = robot();

    // Some firmware revisions push the code as a JSON number.
    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 2},
            {"siid": 4, "piid": 18, "value": 0}
        ]))
        .await;

    let state = robot.state().await;
    assert_eq!(state.status().unwrap().value, StatusValue::Cleaning);
}

// ============================================================================
// Batch Semantics
// ============================================================================

#[tokio::test]
async fn reapplying_a_batch_is_idempotent() {
    let (_, _, robot) = robot();

    let batch = json!([
        {"siid": 4, "piid": 1, "value": 2},
        {"siid": 4, "piid": 18, "value": "0"},
        {"siid": 4, "piid": 4, "value": 3},
        {"siid": 3, "piid": 1, "value": 76}
    ]);

    robot.parse_and_update_state(&batch).await;
    let first = robot.state().await;

    robot.parse_and_update_state(&batch).await;
    let second = robot.state().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn non_array_payload_leaves_store_untouched() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 3, "piid": 1, "value": 50}]))
        .await;
    let before = robot.state().await;

    robot.parse_and_update_state(&json!("oops")).await;

    assert_eq!(robot.state().await, before);
}

#[tokio::test]
async fn unknown_identifiers_are_absorbed() {
    let (_, _, robot) = robot();
    let before = robot.state().await;

    robot
        .parse_and_update_state(&json!([
            {"siid": 1234, "piid": 1, "value": 5},
            {"siid": 4, "piid": 250, "value": 5},
            {"no_siid_at_all": true}
        ]))
        .await;

    assert_eq!(robot.state().await, before);
}

#[tokio::test]
async fn legacy_vacuum_reports_are_ignored() {
    let (_, _, robot) = robot();
    let before = robot.state().await;

    robot
        .parse_and_update_state(&json!([{"siid": 2, "piid": 1, "value": 7}]))
        .await;

    assert_eq!(robot.state().await, before);
}

#[tokio::test]
async fn every_processed_batch_notifies_observers() {
    let (_, _, robot) = robot();
    let mut rx = robot.subscribe();

    // No status-relevant scalar in this batch; notification still fires.
    robot
        .parse_and_update_state(&json!([{"siid": 3, "piid": 1, "value": 80}]))
        .await;

    let event = rx.try_recv().expect("notification expected");
    assert!(matches!(event, RobotEvent::StateAttributesUpdated { .. }));
}

// ============================================================================
// Attribute Updates
// ============================================================================

#[tokio::test]
async fn battery_level_updates_keep_a_single_attribute() {
    let (_, _, robot) = robot();

    for level in [90, 85, 76] {
        robot
            .parse_and_update_state(&json!([{"siid": 3, "piid": 1, "value": level}]))
            .await;
    }

    let state = robot.state().await;
    assert_eq!(state.battery().unwrap().level, 76);
    let batteries = state
        .attributes()
        .iter()
        .filter(|a| matches!(a, miovac_lib::StateAttribute::Battery(_)))
        .count();
    assert_eq!(batteries, 1);
}

#[tokio::test]
async fn fan_speed_report_maps_to_preset_name() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 4, "piid": 4, "value": 3}]))
        .await;

    let state = robot.state().await;
    let preset = state.preset_selection(PresetType::FanSpeed).unwrap();
    assert_eq!(preset.selected.as_deref(), Some("max"));
    assert_eq!(preset.raw_value, 3);
}

#[tokio::test]
async fn unknown_fan_speed_value_keeps_raw_without_name() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 4, "piid": 4, "value": 42}]))
        .await;

    let state = robot.state().await;
    let preset = state.preset_selection(PresetType::FanSpeed).unwrap();
    assert_eq!(preset.selected, None);
    assert_eq!(preset.raw_value, 42);
}

#[tokio::test]
async fn water_tank_report_updates_tank_and_mop_together() {
    let (_, _, robot) = robot();

    // Seeded detached at construction.
    let state = robot.state().await;
    assert!(!state.attachment(AttachmentType::Watertank).unwrap().attached);
    assert!(!state.attachment(AttachmentType::Mop).unwrap().attached);

    robot
        .parse_and_update_state(&json!([{"siid": 4, "piid": 6, "value": 1}]))
        .await;

    let state = robot.state().await;
    assert!(state.attachment(AttachmentType::Watertank).unwrap().attached);
    assert!(state.attachment(AttachmentType::Mop).unwrap().attached);
}

#[tokio::test]
async fn accepted_but_unmodeled_vacuum_properties_change_nothing() {
    let (_, _, robot) = robot();
    let before = robot.state().await;

    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 2, "value": 45},
            {"siid": 4, "piid": 3, "value": 28},
            {"siid": 4, "piid": 8, "value": 1_700_000_000_i64},
            {"siid": 4, "piid": 20, "value": 0},
            {"siid": 4, "piid": 21, "value": 1},
            {"siid": 4, "piid": 27, "value": 0}
        ]))
        .await;

    assert_eq!(robot.state().await, before);
}

// ============================================================================
// Consumable Telemetry
// ============================================================================

#[tokio::test]
async fn main_brush_hours_are_stored_as_minutes() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 9, "piid": 1, "value": 120}]))
        .await;

    let state = robot.state().await;
    let brush = state.consumable(ConsumableKind::MainBrush).unwrap();
    assert_eq!(brush.remaining_minutes, Some(7200));
    assert_eq!(brush.remaining_percent, None);
}

#[tokio::test]
async fn time_and_percent_reports_merge_into_one_attribute() {
    let (_, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 10, "piid": 1, "value": 80}]))
        .await;
    robot
        .parse_and_update_state(&json!([{"siid": 10, "piid": 2, "value": 44}]))
        .await;

    let state = robot.state().await;
    let brush = state.consumable(ConsumableKind::SideBrush).unwrap();
    assert_eq!(brush.remaining_minutes, Some(4800));
    assert_eq!(brush.remaining_percent, Some(44));
}

#[tokio::test]
async fn filter_uses_the_swapped_property_ids() {
    let (_, _, robot) = robot();

    // On the filter service the time property is piid 2 and percent piid 1.
    robot
        .parse_and_update_state(&json!([
            {"siid": 11, "piid": 2, "value": 100},
            {"siid": 11, "piid": 1, "value": 87}
        ]))
        .await;

    let state = robot.state().await;
    let filter = state.consumable(ConsumableKind::Filter).unwrap();
    assert_eq!(filter.remaining_minutes, Some(6000));
    assert_eq!(filter.remaining_percent, Some(87));
}

// ============================================================================
// Inbound Message Handling
// ============================================================================

#[tokio::test]
async fn properties_changed_is_acknowledged_and_applied() {
    let (transport, _, robot) = robot();

    let handled = robot
        .on_message(&json!({
            "id": 17,
            "method": "properties_changed",
            "params": [{"siid": 3, "piid": 1, "value": 64}]
        }))
        .await;

    assert!(handled);
    assert_eq!(robot.state().await.battery().unwrap().level, 64);
    assert_eq!(
        transport.cloud_payloads(),
        vec![json!({"id": 17, "result": "ok"})]
    );
}

#[tokio::test]
async fn map_frame_pushes_are_acknowledged_without_state_effect() {
    let (transport, _, robot) = robot();
    let before = robot.state().await;

    let handled = robot
        .on_message(&json!({
            "id": 5,
            "method": "properties_changed",
            "params": [
                {"siid": 6, "piid": 1, "value": "base64data"},
                {"siid": 6, "piid": 3, "value": "0/1/123456"}
            ]
        }))
        .await;

    assert!(handled);
    assert_eq!(robot.state().await, before);
    assert_eq!(transport.cloud_payloads().len(), 1);
}

#[tokio::test]
async fn props_ping_is_acknowledged_only_with_ota_state() {
    let (transport, _, robot) = robot();

    let with_ota = robot
        .on_message(&json!({"id": 2, "method": "props", "params": {"ota_state": "idle"}}))
        .await;
    assert!(with_ota);
    assert_eq!(transport.cloud_payloads(), vec![json!({"id": 2, "result": "ok"})]);

    let without_ota = robot
        .on_message(&json!({"id": 3, "method": "props", "params": {"something": 1}}))
        .await;
    assert!(!without_ota);
    assert_eq!(transport.cloud_payloads().len(), 1);
}

#[tokio::test]
async fn cleanup_summaries_are_acknowledged_without_state_effect() {
    let (transport, _, robot) = robot();
    let before = robot.state().await;

    let handled = robot
        .on_message(&json!({
            "id": 9,
            "method": "event_occured",
            "params": {"siid": 4, "arguments": [{"piid": 1, "value": 2}]}
        }))
        .await;

    assert!(handled);
    assert_eq!(robot.state().await, before);
    assert_eq!(transport.cloud_payloads(), vec![json!({"id": 9, "result": "ok"})]);
}

#[tokio::test]
async fn unknown_methods_are_not_handled() {
    let (transport, _, robot) = robot();

    let handled = robot
        .on_message(&json!({"id": 4, "method": "brand_new_method", "params": []}))
        .await;

    assert!(!handled);
    assert!(transport.cloud_payloads().is_empty());
}

// ============================================================================
// Map Poll Trigger
// ============================================================================

#[tokio::test]
async fn entering_an_active_state_triggers_a_map_poll() {
    let (_, fetcher, robot) = robot();

    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 2},
            {"siid": 4, "piid": 18, "value": "0"}
        ]))
        .await;

    assert_eq!(fetcher.polls(), 1);
}

#[tokio::test]
async fn map_polls_are_rate_limited() {
    let (_, fetcher, robot) = robot();

    let batch = json!([
        {"siid": 4, "piid": 1, "value": 2},
        {"siid": 4, "piid": 18, "value": "0"}
    ]);
    robot.parse_and_update_state(&batch).await;
    robot.parse_and_update_state(&batch).await;

    assert_eq!(fetcher.polls(), 1);
}

#[tokio::test]
async fn docked_states_do_not_trigger_map_polls() {
    let (_, fetcher, robot) = robot();

    robot
        .parse_and_update_state(&json!([
            {"siid": 4, "piid": 1, "value": 6},
            {"siid": 4, "piid": 18, "value": "0"}
        ]))
        .await;

    assert_eq!(fetcher.polls(), 0);
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test]
async fn poll_requests_the_fixed_property_set() {
    let (transport, _, robot) = robot();

    robot.poll_state().await;

    let (method, params) = transport.last_command();
    assert_eq!(method, "get_properties");

    let entries = params.as_array().unwrap();
    assert_eq!(entries.len(), 8);
    for entry in entries {
        assert_eq!(entry["did"], "471865291");
        assert!(entry.get("siid").is_some());
        assert!(entry.get("piid").is_some());
    }
}

#[tokio::test]
async fn successful_poll_updates_and_returns_the_store() {
    let (transport, _, robot) = robot();

    transport.push_response(Ok(json!([
        {"did": "471865291", "siid": 4, "piid": 1, "value": 2, "code": 0},
        {"did": "471865291", "siid": 4, "piid": 18, "value": "0", "code": 0},
        {"did": "471865291", "siid": 3, "piid": 1, "value": 55, "code": 0}
    ])));

    let store = robot.poll_state().await;

    assert_eq!(store.status().unwrap().value, StatusValue::Cleaning);
    assert_eq!(store.battery().unwrap().level, 55);
    assert_eq!(store, robot.state().await);
}

#[tokio::test]
async fn failed_poll_returns_the_previous_store_unchanged() {
    let (transport, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 3, "piid": 1, "value": 88}]))
        .await;
    let before = robot.state().await;

    transport.push_response(Err(ProtocolError::Timeout(5000)));
    let store = robot.poll_state().await;

    assert_eq!(store, before);
    assert_eq!(robot.state().await, before);
}

#[tokio::test]
async fn empty_poll_response_is_treated_as_no_data() {
    let (transport, _, robot) = robot();

    robot
        .parse_and_update_state(&json!([{"siid": 3, "piid": 1, "value": 88}]))
        .await;
    let before = robot.state().await;

    transport.push_response(Ok(Value::Null));
    let store = robot.poll_state().await;

    assert_eq!(store, before);
}
