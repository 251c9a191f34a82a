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

//! Conversions between requested frequencies and tick periods.
//!
//! Periods are whole numbers of ticks, so most frequencies cannot be
//! honoured exactly. Scheduler tick kinds truncate the period, which
//! never runs them slower than asked, while per-object negotiation
//! rounds to the nearest achievable rate and reports what was obtained.

use std::error::Error;
use std::fmt;

use crate::time::{Hertz, Microsecond, Period};

/// Microseconds in one second, the pivot of every rate conversion.
const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

/// Outcome of negotiating a desired rate for a periodic object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegotiatedRate {
    /// Activation period actually granted, in simulation ticks.
    pub period: Period,
    /// Frequency this period amounts to, in hertz.
    pub obtained_hz: f64,
}

/// Rejection of a frequency request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyError {
    /// The requested frequency was zero or negative.
    NotPositive,
    /// The requested frequency is finer than the engine tick itself.
    TooHigh {
        /// The offending frequency.
        frequency: Hertz,
        /// Engine tick duration the request was checked against.
        engine_tick_duration: Microsecond,
    },
}

impl fmt::Display for FrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyError::NotPositive => {
                write!(f, "Requested frequency must be strictly positive")
            }
            FrequencyError::TooHigh {
                frequency,
                engine_tick_duration,
            } => write!(
                f,
                "Requested frequency ({frequency} Hz) cannot be honoured with a {engine_tick_duration} microsecond engine tick"
            ),
        }
    }
}

impl Error for FrequencyError {}

/// Period, in engine ticks, granting at least the requested frequency.
///
/// The division truncates, so the agreed frequency is the closest
/// achievable one not below the request. Requests finer than one engine
/// tick are refused rather than silently clamped.
pub fn period_for_frequency(
    frequency: Hertz,
    engine_tick_duration: Microsecond,
) -> Result<Period, FrequencyError> {
    debug_assert!(engine_tick_duration > 0);

    if frequency == 0 {
        return Err(FrequencyError::NotPositive);
    }

    let ticks_per_second = u64::from(frequency) * engine_tick_duration;
    if ticks_per_second > MICROSECONDS_PER_SECOND {
        return Err(FrequencyError::TooHigh {
            frequency,
            engine_tick_duration,
        });
    }

    Ok(MICROSECONDS_PER_SECOND / ticks_per_second)
}

/// Frequency a period amounts to, in hertz.
pub fn agreed_frequency(period: Period, engine_tick_duration: Microsecond) -> f64 {
    MICROSECONDS_PER_SECOND as f64 / (period * engine_tick_duration) as f64
}

/// Negotiates an activation period for an object wanting `desired_hz`.
///
/// The period is expressed in simulation ticks and rounded to the
/// nearest achievable value, halfway cases going to the slower rate. A
/// request faster than the simulation rate itself is clamped to one
/// simulation tick with a warning, as running faster is impossible.
pub fn negotiated_rate(
    desired_hz: f64,
    simulation_period: Period,
    engine_tick_duration: Microsecond,
) -> Result<NegotiatedRate, FrequencyError> {
    if !(desired_hz > 0.0) {
        return Err(FrequencyError::NotPositive);
    }

    let simulation_tick_duration = (simulation_period * engine_tick_duration) as f64;
    let exact_period = MICROSECONDS_PER_SECOND as f64 / (desired_hz * simulation_tick_duration);

    let mut period = exact_period.round() as Period;
    if period == 0 {
        log::warn!(
            "Requested frequency ({desired_hz} Hz) is higher than the simulation rate; activating every simulation tick instead."
        );
        period = 1;
    }

    let obtained_hz =
        MICROSECONDS_PER_SECOND as f64 / (period * simulation_period * engine_tick_duration) as f64;

    Ok(NegotiatedRate {
        period,
        obtained_hz,
    })
}
