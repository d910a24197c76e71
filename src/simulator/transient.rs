// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delayed reset of bump and cliff readings.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::TransientSensor;

/// Request to reset a transient sensor, sent when its timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransientClear {
    pub sensor: TransientSensor,
    pub generation: u64,
}

struct Pending {
    generation: u64,
    task: JoinHandle<()>,
}

/// One pending reset per sensor.
///
/// Timers do not touch the state themselves: they send a
/// [`TransientClear`] back to the simulator loop, which applies it only if
/// its generation is still the latest one for that sensor.
pub(crate) struct TransientTimers {
    pending: HashMap<TransientSensor, Pending>,
    next_generation: u64,
    clear_tx: mpsc::UnboundedSender<TransientClear>,
}

impl TransientTimers {
    pub fn new(clear_tx: mpsc::UnboundedSender<TransientClear>) -> Self {
        Self {
            pending: HashMap::new(),
            next_generation: 0,
            clear_tx,
        }
    }

    /// Schedules a reset of `sensor` after `delay`, replacing any pending one.
    pub fn schedule(&mut self, sensor: TransientSensor, delay: Duration) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.clear_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TransientClear { sensor, generation });
        });

        if let Some(old) = self.pending.insert(sensor, Pending { generation, task }) {
            old.task.abort();
            tracing::trace!(%sensor, "Replaced pending sensor reset");
        }
    }

    /// Returns `true` if `clear` is the latest reset for its sensor, and
    /// forgets it.
    pub fn accept(&mut self, clear: TransientClear) -> bool {
        match self.pending.get(&clear.sensor) {
            Some(pending) if pending.generation == clear.generation => {
                self.pending.remove(&clear.sensor);
                true
            }
            _ => false,
        }
    }

    /// Returns the number of pending resets.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Cancels every pending reset.
    pub fn abort_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.task.abort();
        }
    }
}

impl Drop for TransientTimers {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expired_timer_sends_clear() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TransientTimers::new(tx);

        timers.schedule(TransientSensor::Cliff, Duration::from_secs(2));
        let clear = rx.recv().await.unwrap();

        assert_eq!(clear.sensor, TransientSensor::Cliff);
        assert!(timers.accept(clear));
        assert_eq!(timers.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_invalidates_older_clear() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TransientTimers::new(tx);

        timers.schedule(TransientSensor::Bump, Duration::from_secs(3));
        let stale = TransientClear {
            sensor: TransientSensor::Bump,
            generation: 1,
        };
        timers.schedule(TransientSensor::Bump, Duration::from_secs(3));

        assert!(!timers.accept(stale));

        let clear = rx.recv().await.unwrap();
        assert_eq!(clear.generation, 2);
        assert!(timers.accept(clear));
    }

    #[tokio::test(start_paused = true)]
    async fn sensors_are_independent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TransientTimers::new(tx);

        timers.schedule(TransientSensor::Bump, Duration::from_secs(3));
        timers.schedule(TransientSensor::Cliff, Duration::from_secs(2));
        assert_eq!(timers.pending(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.sensor, TransientSensor::Cliff);
        assert!(timers.accept(first));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.sensor, TransientSensor::Bump);
        assert!(timers.accept(second));
    }

    #[tokio::test(start_paused = true)]
    async fn abort_all_cancels_timers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TransientTimers::new(tx);

        timers.schedule(TransientSensor::Bump, Duration::from_secs(1));
        timers.abort_all();
        drop(timers);

        assert!(rx.recv().await.is_none());
    }
}
