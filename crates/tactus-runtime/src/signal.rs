// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Control signal channel of the scheduler.
//!
//! The scheduling loop owns the receiving end and drains it once per
//! iteration, so a stop can be requested from inside an activation
//! callback or from another thread without ever touching the
//! scheduler's state directly.

use log;

/// Control signals understood by a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    /// Finish the current iteration, then leave the scheduling loop.
    Stop,
}

/// Signal channel owned by the scheduler.
#[derive(Debug)]
pub struct SignalBus {
    sender: flume::Sender<EngineSignal>,
    receiver: flume::Receiver<EngineSignal>,
}

impl SignalBus {
    /// Creates a bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::trace!("Signal bus initialized.");
        Self { sender, receiver }
    }

    /// Hands out a cloneable handle able to request a stop.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            sender: self.sender.clone(),
        }
    }

    /// Drains pending signals and tells whether a stop was among them.
    pub fn stop_requested(&self) -> bool {
        let mut requested = false;
        for signal in self.receiver.try_iter() {
            match signal {
                EngineSignal::Stop => requested = true,
            }
        }
        requested
    }

    /// Throws away signals left over from a previous run.
    pub fn discard_pending(&self) {
        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            log::debug!("Discarded {discarded} stale signal(s) from a previous run.");
        }
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe handle requesting a scheduler stop.
///
/// The request is only observed at the end of the loop iteration being
/// executed, never in its middle.
#[derive(Debug, Clone)]
pub struct StopHandle {
    sender: flume::Sender<EngineSignal>,
}

impl StopHandle {
    /// Asks the scheduler to leave its loop after the current iteration.
    pub fn request_stop(&self) {
        log::debug!("Stop requested.");
        if let Err(e) = self.sender.send(EngineSignal::Stop) {
            log::error!("Failed to deliver the stop signal: {e}. Scheduler likely gone.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn no_stop_is_pending_initially() {
        let bus = SignalBus::new();
        assert!(!bus.stop_requested());
    }

    #[test]
    fn a_requested_stop_is_observed_exactly_once() {
        let bus = SignalBus::new();
        bus.stop_handle().request_stop();

        assert!(bus.stop_requested(), "The stop must be observed");
        assert!(
            !bus.stop_requested(),
            "Draining must consume the stop signal"
        );
    }

    #[test]
    fn cloned_handles_reach_the_same_bus() {
        let bus = SignalBus::new();
        let first = bus.stop_handle();
        let second = first.clone();

        second.request_stop();

        assert!(bus.stop_requested());
    }

    #[test]
    fn discard_pending_swallows_stale_signals() {
        let bus = SignalBus::new();
        bus.stop_handle().request_stop();
        bus.stop_handle().request_stop();

        bus.discard_pending();

        assert!(!bus.stop_requested());
    }

    #[test]
    fn stop_can_be_requested_from_another_thread() {
        let bus = SignalBus::new();
        let handle = bus.stop_handle();

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.request_stop();
        });
        worker.join().expect("Thread join failed");

        assert!(bus.stop_requested());
    }

    #[test]
    fn requesting_a_stop_after_the_bus_is_gone_does_not_panic() {
        let bus = SignalBus::new();
        let handle = bus.stop_handle();
        drop(bus);

        // Only logged, never propagated.
        handle.request_stop();
    }
}
