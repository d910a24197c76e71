// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use super::Transport;
use crate::error::ProtocolError;

/// A message captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic it was published on.
    pub topic: String,
    /// Raw payload.
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    /// Parses the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Debug, Default)]
struct Inner {
    messages: Mutex<Vec<PublishedMessage>>,
    failing: AtomicBool,
}

/// Transport that keeps every publish in memory.
///
/// Clones share the same log. It can be switched into a failing mode to
/// exercise publish error handling.
///
/// # Examples
///
/// ```
/// use cleaner_sim::protocol::{MemoryTransport, Transport};
///
/// let transport = MemoryTransport::new();
/// transport.publish("cleaner/alerts", b"{}".to_vec()).unwrap();
/// assert_eq!(transport.published_on("cleaner/alerts").len(), 1);
///
/// transport.set_failing(true);
/// assert!(transport.publish("cleaner/alerts", b"{}".to_vec()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Inner>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later publish fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::Release);
    }

    /// Returns every message published so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.inner.messages.lock().clone()
    }

    /// Returns the messages published on `topic`.
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<PublishedMessage> {
        self.inner
            .messages
            .lock()
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Returns the most recent message on `topic`.
    #[must_use]
    pub fn last_on(&self, topic: &str) -> Option<PublishedMessage> {
        self.inner
            .messages
            .lock()
            .iter()
            .rev()
            .find(|m| m.topic == topic)
            .cloned()
    }

    /// Forgets every recorded message.
    pub fn clear(&self) {
        self.inner.messages.lock().clear();
    }
}

impl Transport for MemoryTransport {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ProtocolError> {
        if self.inner.failing.load(Ordering::Acquire) {
            return Err(ProtocolError::PublishFailed {
                topic: topic.to_string(),
                reason: "transport offline".to_string(),
            });
        }
        self.inner.messages.lock().push(PublishedMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}
