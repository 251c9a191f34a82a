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

//! Activation contracts for scheduled objects.
//!
//! An *active object* is anything that wants to be woken on the
//! simulation timeline, either periodically or at explicitly programmed
//! ticks. The scheduler only ever holds weak references to them, so an
//! object may be dropped at any time and will simply stop being
//! activated.

pub mod frequency;

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::time::{Period, SimulationTick};

pub use frequency::{FrequencyError, NegotiatedRate};

/// Relative cost of activating an object, used to balance sub-slots.
///
/// The unit is arbitrary; only ratios between weights matter.
pub type Weight = u32;

/// How strictly a periodic object must keep its activation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPolicy {
    /// The scheduler may shift the object to the least busy moment of
    /// its period, spreading the load more evenly.
    #[default]
    Relaxed,
    /// The object is activated at the next possible moment and keeps
    /// that exact phase afterwards.
    Strict,
}

impl fmt::Display for ActivationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationPolicy::Relaxed => write!(f, "relaxed"),
            ActivationPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Failure reported by an activation or skip callback.
///
/// The scheduler logs these and carries on; a failing object never
/// takes the loop down with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationError {
    reason: String,
}

impl ActivationError {
    /// Builds an error carrying the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason reported by the object.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activation failed: {}", self.reason)
    }
}

impl Error for ActivationError {}

/// Something the scheduler can wake on the simulation timeline.
pub trait Activatable {
    /// Called when the object's simulation tick has come.
    ///
    /// The tick is provided so objects activated less often than every
    /// simulation tick can tell how much logical time elapsed.
    fn on_activation(&mut self, tick: SimulationTick) -> Result<(), ActivationError>;

    /// Called instead of [`Activatable::on_activation`] when the
    /// scheduler had to drop this object's tick to catch up with the
    /// wall clock.
    ///
    /// The default implementation only leaves a warning in the logs.
    /// Objects needing to stay consistent should override it, for
    /// example by performing a cheaper version of their activation.
    fn on_skip(&mut self, skipped: SimulationTick) -> Result<(), ActivationError> {
        log::warn!("An active object had its simulation tick {skipped} skipped.");
        Ok(())
    }
}

/// Weak handle to a scheduled object, as stored by the scheduler.
pub type ActiveRef = Weak<RefCell<dyn Activatable>>;

/// Builds the weak handle the scheduler stores for an object.
///
/// The caller keeps the strong handle; once it is dropped, the
/// scheduler notices on the next activation attempt and detaches the
/// object.
pub fn active_link<O>(object: &Rc<RefCell<O>>) -> ActiveRef
where
    O: Activatable + 'static,
{
    let shared: Rc<RefCell<dyn Activatable>> = object.clone();
    Rc::downgrade(&shared)
}

/// Requested placement of a periodic object on the simulation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicSchedule {
    /// Activation period, in simulation ticks. Must be at least 1.
    pub period: Period,
    /// Phase placement policy inside the period.
    pub policy: ActivationPolicy,
    /// Relative activation cost, for load balancing.
    pub weight: Weight,
}

impl PeriodicSchedule {
    /// Schedule activating once every `period` simulation ticks, with
    /// the relaxed policy and a unit weight.
    pub fn every(period: Period) -> Self {
        Self {
            period,
            policy: ActivationPolicy::Relaxed,
            weight: 1,
        }
    }

    /// Overrides the placement policy.
    pub fn with_policy(mut self, policy: ActivationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the activation weight.
    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for PeriodicSchedule {
    fn default() -> Self {
        Self::every(1)
    }
}

/// How the ticks of a programmed activation list are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickOrigin {
    /// Ticks are positions on the absolute simulation timeline.
    #[default]
    Absolute,
    /// Ticks are offsets added to the simulation tick current at
    /// registration time.
    Relative,
}

/// First tick a periodic object placed in `sub_slot` will be activated
/// at, given the simulation tick current at registration time.
///
/// If the object's sub-slot has not been reached yet within the current
/// period, the activation happens in this very period; otherwise it
/// waits for the same sub-slot of the next one.
pub fn first_activation_tick(
    current: SimulationTick,
    period: Period,
    sub_slot: Period,
) -> SimulationTick {
    let last_period_begin = period * (current / period);
    if current % period < sub_slot {
        last_period_begin + sub_slot
    } else {
        last_period_begin + period + sub_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_builder_applies_overrides() {
        let schedule = PeriodicSchedule::every(7)
            .with_policy(ActivationPolicy::Strict)
            .with_weight(3);

        assert_eq!(schedule.period, 7);
        assert_eq!(schedule.policy, ActivationPolicy::Strict);
        assert_eq!(schedule.weight, 3);
    }

    #[test]
    fn default_schedule_runs_every_tick() {
        let schedule = PeriodicSchedule::default();
        assert_eq!(schedule.period, 1);
        assert_eq!(schedule.policy, ActivationPolicy::Relaxed);
        assert_eq!(schedule.weight, 1);
    }

    #[test]
    fn first_activation_lands_in_current_period_when_sub_slot_is_ahead() {
        // Tick 0 of a 10 tick period: sub-slot 3 is still ahead.
        assert_eq!(first_activation_tick(0, 10, 3), 3);
        // Tick 22: position 2 of the period starting at 20, slot 3 is ahead.
        assert_eq!(first_activation_tick(22, 10, 3), 23);
    }

    #[test]
    fn first_activation_waits_for_next_period_when_sub_slot_passed() {
        // Tick 5 of a 10 tick period: sub-slot 3 already went by.
        assert_eq!(first_activation_tick(5, 10, 3), 13);
        // Standing exactly on the sub-slot counts as missed.
        assert_eq!(first_activation_tick(23, 10, 3), 33);
    }

    #[test]
    fn first_activation_with_unit_period_is_the_next_tick() {
        assert_eq!(first_activation_tick(7, 1, 0), 8);
        assert_eq!(first_activation_tick(0, 1, 0), 1);
    }

    #[test]
    fn activation_error_keeps_its_reason() {
        let error = ActivationError::new("asset not loaded");
        assert_eq!(error.reason(), "asset not loaded");
        assert_eq!(error.to_string(), "Activation failed: asset not loaded");
    }

    #[test]
    fn policies_display_as_lowercase_words() {
        assert_eq!(ActivationPolicy::Relaxed.to_string(), "relaxed");
        assert_eq!(ActivationPolicy::Strict.to_string(), "strict");
    }
}
