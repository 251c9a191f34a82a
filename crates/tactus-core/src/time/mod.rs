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

//! Time base of the engine.
//!
//! All scheduling is expressed on a single discrete timeline whose unit is
//! the *engine tick*, a fixed wall-clock quantum measured in microseconds.
//! Simulation, rendering and input ticks are coarser counters derived from
//! it, each advancing once per *period* of engine ticks.

use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

/// One microsecond, the finest time unit the engine reasons about.
pub type Microsecond = u64;

/// A frequency expressed in cycles per second.
pub type Hertz = u32;

/// Index on the fundamental engine timeline.
pub type EngineTick = u64;

/// Index on the simulation timeline.
pub type SimulationTick = u64;

/// Index on the rendering timeline.
pub type RenderingTick = u64;

/// Index on the input polling timeline.
pub type InputTick = u64;

/// Length of a coarser cycle, counted in finer ticks.
///
/// A simulation period is counted in engine ticks, an active object
/// period in simulation ticks.
pub type Period = u64;

/// Number of samples taken when probing the OS scheduling granularity.
const GRANULARITY_SAMPLE_COUNT: usize = 8;

static GRANULARITY: OnceLock<Duration> = OnceLock::new();

/// Monotonic clock counting microseconds since it was started.
///
/// The soft real-time loop derives the current engine tick from this
/// clock, so drift never accumulates: late iterations fall behind the
/// clock and are caught up, they do not stretch the timeline.
#[derive(Debug, Clone, Copy)]
pub struct EngineClock {
    origin: Instant,
}

impl EngineClock {
    /// Starts a new clock at the current instant.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Microseconds elapsed since the clock was started.
    pub fn elapsed_microseconds(&self) -> Microsecond {
        self.origin.elapsed().as_micros() as Microsecond
    }

    /// Elapsed time since the clock was started.
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Engine tick the timeline currently stands at, for the given
    /// tick duration.
    pub fn engine_tick(&self, tick_duration: Microsecond) -> EngineTick {
        self.elapsed_microseconds() / tick_duration
    }
}

/// Smallest sleep the OS reliably honours, measured once and cached.
///
/// The probe requests a one microsecond sleep a few times and keeps the
/// median observed duration, which on common desktop kernels lands in
/// the tens of microseconds to a few milliseconds range.
pub fn scheduling_granularity() -> Duration {
    *GRANULARITY.get_or_init(|| {
        let mut samples = [Duration::ZERO; GRANULARITY_SAMPLE_COUNT];
        for sample in samples.iter_mut() {
            let before = Instant::now();
            thread::sleep(Duration::from_micros(1));
            *sample = before.elapsed();
        }
        samples.sort();
        let median = samples[GRANULARITY_SAMPLE_COUNT / 2];
        log::debug!(
            "Measured scheduling granularity: {} microseconds.",
            median.as_micros()
        );
        // A zero granularity would break the idle arithmetic downstream.
        median.max(Duration::from_micros(1))
    })
}

/// Tells whether the platform can sleep for less than a second.
///
/// Soft real-time scheduling is refused when this does not hold, as the
/// idle phase could then overshoot whole batches of deadlines.
pub fn sub_second_sleep_available() -> bool {
    scheduling_granularity() < Duration::from_secs(1)
}

/// Sleeps for the smallest honoured quantum, yielding the CPU.
///
/// This is the default way for the scheduler to spend idle time when no
/// custom idle callback is registered.
pub fn atomic_sleep() {
    thread::sleep(scheduling_granularity());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_is_cached_and_positive() {
        let first = scheduling_granularity();
        let second = scheduling_granularity();

        assert!(
            first > Duration::ZERO,
            "Granularity probe should never report zero"
        );
        assert_eq!(first, second, "Probe result should be cached");
    }

    #[test]
    fn sub_second_sleep_is_available_on_test_hosts() {
        assert!(
            sub_second_sleep_available(),
            "Test hosts are expected to honour sub-second sleeps"
        );
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = EngineClock::start();
        let earlier = clock.elapsed_microseconds();
        atomic_sleep();
        let later = clock.elapsed_microseconds();

        assert!(
            later >= earlier,
            "Elapsed time went backwards: {earlier} then {later}"
        );
    }

    #[test]
    fn engine_tick_follows_elapsed_time() {
        let clock = EngineClock::start();
        thread::sleep(Duration::from_millis(5));

        // With a 1 ms quantum, 5 ms of wall clock is at least 4 ticks
        // even under heavy timer slack.
        let tick = clock.engine_tick(1_000);
        assert!(tick >= 4, "Expected at least 4 engine ticks, got {tick}");
    }

    #[test]
    fn atomic_sleep_returns_promptly() {
        let before = Instant::now();
        atomic_sleep();

        assert!(
            before.elapsed() < Duration::from_secs(1),
            "Atomic sleep should stay well below a second"
        );
    }
}
