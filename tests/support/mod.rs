// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test doubles for the transport and map-fetch collaborators.

// Each integration suite compiles its own copy of this module.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use miovac_lib::error::ProtocolError;
use miovac_lib::miot::Transport;
use miovac_lib::robot::MapFetcher;
use serde_json::Value;

/// A transport that records every request and replays queued responses.
///
/// When the response queue is empty, requests succeed with `null`, which
/// every request path treats as "accepted, nothing to parse".
#[derive(Debug, Default)]
pub struct MockTransport {
    commands: Mutex<Vec<(String, Value)>>,
    cloud: Mutex<Vec<Value>>,
    responses: Mutex<VecDeque<Result<Value, ProtocolError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the response for the next `send_command` call.
    pub fn push_response(&self, response: Result<Value, ProtocolError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Returns all recorded `send_command` calls as (method, params).
    pub fn commands(&self) -> Vec<(String, Value)> {
        self.commands.lock().unwrap().clone()
    }

    /// Returns the last recorded `send_command` call.
    pub fn last_command(&self) -> (String, Value) {
        self.commands
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no command was sent")
    }

    /// Returns all recorded fire-and-forget payloads.
    pub fn cloud_payloads(&self) -> Vec<Value> {
        self.cloud.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send_command(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        self.commands
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }

    fn send_cloud(&self, payload: Value) {
        self.cloud.lock().unwrap().push(payload);
    }
}

/// A map fetcher that counts refresh requests.
#[derive(Debug, Default)]
pub struct CountingMapFetcher {
    polls: AtomicUsize,
}

impl CountingMapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl MapFetcher for CountingMapFetcher {
    fn poll_map(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }
}
