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

//! End of run statistics.

use std::fmt;
use std::time::Duration;

use tactus_core::time::{EngineTick, Hertz, Microsecond, Period};

use crate::scheduler::ScheduleMode;

/// Statistics of one tick kind over a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct KindStats {
    /// Human readable name of the kind.
    pub label: &'static str,
    /// Frequency that was asked for.
    pub requested_hz: Hertz,
    /// Frequency the granted period amounts to.
    pub agreed_hz: f64,
    /// Frequency actually achieved over the run, skips excluded.
    pub measured_hz: f64,
    /// Granted period, in engine ticks.
    pub period: Period,
    /// Value the tick counter reached, skipped ticks included.
    pub final_tick: u64,
    /// How many of those ticks were skipped.
    pub missed: u64,
}

impl KindStats {
    /// Share of ticks that were skipped, in percent.
    pub fn missed_share(&self) -> f64 {
        if self.final_tick == 0 {
            0.0
        } else {
            100.0 * self.missed as f64 / self.final_tick as f64
        }
    }
}

impl fmt::Display for KindStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} tick(s) at {:.2} Hz agreed, {} missed ({:.1}%)",
            self.label,
            self.final_tick,
            self.agreed_hz,
            self.missed,
            self.missed_share(),
        )
    }
}

/// Complete account of a finished scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleReport {
    /// Mode the run was executed in.
    pub mode: ScheduleMode,
    /// Wall-clock duration of the run.
    pub runtime: Duration,
    /// Engine tick duration the run used.
    pub engine_tick_duration: Microsecond,
    /// Engine tick the run stopped at.
    pub final_engine_tick: EngineTick,
    /// Simulation timeline statistics.
    pub simulation: KindStats,
    /// Rendering timeline statistics.
    pub rendering: KindStats,
    /// Input polling timeline statistics.
    pub input: KindStats,
    /// How many times the idle policy was invoked.
    pub idle_calls: u64,
    /// Frames captured to disk, in no-deadline mode.
    pub frames_captured: u64,
}

impl ScheduleReport {
    /// Logs the whole report as one info level block.
    pub fn log_summary(&self) {
        log::info!("--- Scheduler Summary ---");
        log::info!(
            "Mode: {}; runtime: {:.3} s over {} engine tick(s) of {} microsecond(s).",
            self.mode,
            self.runtime.as_secs_f64(),
            self.final_engine_tick,
            self.engine_tick_duration,
        );
        for stats in [&self.simulation, &self.rendering, &self.input] {
            log::info!(
                "{}: requested {} Hz, agreed {:.2} Hz, measured {:.2} Hz; {} tick(s), {} missed ({:.1}%).",
                stats.label,
                stats.requested_hz,
                stats.agreed_hz,
                stats.measured_hz,
                stats.final_tick,
                stats.missed,
                stats.missed_share(),
            );
        }
        log::info!("Idle policy invoked {} time(s).", self.idle_calls);
        if self.frames_captured > 0 {
            log::info!("Frames captured: {}.", self.frames_captured);
        }
        log::info!("-------------------------");
    }
}

impl fmt::Display for ScheduleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} run over {:.3} s ({} engine tick(s) of {} microsecond(s)); {}; {}; {}; idle policy invoked {} time(s), {} frame(s) captured",
            self.mode,
            self.runtime.as_secs_f64(),
            self.final_engine_tick,
            self.engine_tick_duration,
            self.simulation,
            self.rendering,
            self.input,
            self.idle_calls,
            self.frames_captured,
        )
    }
}
