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

//! Error types for scheduler configuration and execution.

use std::error::Error;
use std::fmt;

use tactus_core::activity::FrequencyError;
use tactus_core::time::{Microsecond, Period};

/// Failure configuring or running the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// A requested tick kind frequency cannot be honoured.
    Frequency(FrequencyError),
    /// The engine tick duration must be at least one microsecond.
    InvalidTickDuration,
    /// A periodic registration carried a nonsensical period.
    InvalidPeriod {
        /// The offending period.
        period: Period,
    },
    /// A registration that would never lead to any activation.
    NothingToSchedule,
    /// The OS cannot honour sub-second sleeps, so soft real-time
    /// deadlines would be overshot wholesale.
    GranularityTooCoarse {
        /// Measured scheduling granularity.
        granularity: Microsecond,
    },
    /// An operation needed a scheduler, but none exists in the context.
    NoSchedulerAvailable,
}

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingError::Frequency(e) => {
                write!(f, "Frequency request rejected: {e}")
            }
            SchedulingError::InvalidTickDuration => {
                write!(f, "Engine tick duration must be at least one microsecond")
            }
            SchedulingError::InvalidPeriod { period } => {
                write!(
                    f,
                    "Invalid activation period ({period}): it must be at least one simulation tick"
                )
            }
            SchedulingError::NothingToSchedule => {
                write!(
                    f,
                    "Registration rejected: no periodic schedule and no programmed tick, the object would never be activated"
                )
            }
            SchedulingError::GranularityTooCoarse { granularity } => {
                write!(
                    f,
                    "Soft real-time scheduling refused: OS scheduling granularity ({granularity} microseconds) cannot honour sub-second deadlines"
                )
            }
            SchedulingError::NoSchedulerAvailable => {
                write!(f, "No scheduler is available in this engine context")
            }
        }
    }
}

impl Error for SchedulingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchedulingError::Frequency(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrequencyError> for SchedulingError {
    fn from(error: FrequencyError) -> Self {
        SchedulingError::Frequency(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_errors_wrap_with_a_source() {
        let error: SchedulingError = FrequencyError::NotPositive.into();

        assert_eq!(
            error.to_string(),
            "Frequency request rejected: Requested frequency must be strictly positive"
        );
        assert!(error.source().is_some(), "The inner error must be exposed");
    }

    #[test]
    fn configuration_errors_display() {
        assert_eq!(
            SchedulingError::InvalidTickDuration.to_string(),
            "Engine tick duration must be at least one microsecond"
        );
        assert_eq!(
            SchedulingError::InvalidPeriod { period: 0 }.to_string(),
            "Invalid activation period (0): it must be at least one simulation tick"
        );
        assert_eq!(
            SchedulingError::NothingToSchedule.to_string(),
            "Registration rejected: no periodic schedule and no programmed tick, the object would never be activated"
        );
    }

    #[test]
    fn execution_errors_display() {
        assert_eq!(
            SchedulingError::GranularityTooCoarse {
                granularity: 2_000_000
            }
            .to_string(),
            "Soft real-time scheduling refused: OS scheduling granularity (2000000 microseconds) cannot honour sub-second deadlines"
        );
        assert_eq!(
            SchedulingError::NoSchedulerAvailable.to_string(),
            "No scheduler is available in this engine context"
        );
    }
}
