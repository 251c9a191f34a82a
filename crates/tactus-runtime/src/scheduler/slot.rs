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

//! Periodic slots, the per-period containers of active objects.
//!
//! Objects sharing an activation period are gathered in one slot, which
//! splits its period into as many *sub-slots* as it has ticks. Each
//! object is pinned to one sub-slot, so the load of a period is spread
//! over its whole duration instead of bursting on its first tick.

use std::fmt;

use tactus_core::activity::{ActivationPolicy, ActiveRef, Weight};
use tactus_core::time::{Period, SimulationTick};

/// Thin pointer identifying an object allocation.
pub(crate) fn active_ptr(object: &ActiveRef) -> *const () {
    object.as_ptr() as *const ()
}

/// Activates one weakly held object, reporting whether it still exists.
///
/// Callback failures are logged and absorbed; they never interrupt the
/// tick being scheduled.
pub(crate) fn drive_activation(object: &ActiveRef, tick: SimulationTick) -> bool {
    match object.upgrade() {
        Some(object) => {
            match object.try_borrow_mut() {
                Ok(mut object) => {
                    if let Err(error) = object.on_activation(tick) {
                        log::error!("Active object failed at simulation tick {tick}: {error}");
                    }
                }
                Err(_) => {
                    log::warn!(
                        "Active object is already borrowed; dropping its activation at simulation tick {tick}."
                    );
                }
            }
            true
        }
        None => false,
    }
}

/// Skip counterpart of [`drive_activation`].
pub(crate) fn drive_skip(object: &ActiveRef, skipped: SimulationTick) -> bool {
    match object.upgrade() {
        Some(object) => {
            match object.try_borrow_mut() {
                Ok(mut object) => {
                    if let Err(error) = object.on_skip(skipped) {
                        log::error!(
                            "Active object failed its skip handler at simulation tick {skipped}: {error}"
                        );
                    }
                }
                Err(_) => {
                    log::warn!(
                        "Active object is already borrowed; dropping its skip notification for simulation tick {skipped}."
                    );
                }
            }
            true
        }
        None => false,
    }
}

struct Entry {
    object: ActiveRef,
    ptr: *const (),
    weight: Weight,
}

/// Container of all active objects sharing one activation period.
///
/// The slot tracks which sub-slot the simulation currently stands in
/// and guards against being driven twice for the same tick, which would
/// otherwise double-activate a whole sub-slot.
pub struct PeriodicSlot {
    period: Period,
    sub_slots: Vec<Vec<Entry>>,
    weights: Vec<Weight>,
    current_sub_slot: usize,
}

impl PeriodicSlot {
    /// Creates the slot for the given period, with one empty sub-slot
    /// per tick of the period. The period must be at least 1.
    pub fn new(period: Period) -> Self {
        debug_assert!(period >= 1);
        Self {
            period,
            sub_slots: (0..period).map(|_| Vec::new()).collect(),
            weights: vec![0; period as usize],
            current_sub_slot: 0,
        }
    }

    /// Activation period managed by this slot, in simulation ticks.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Places an object in a sub-slot according to its policy and
    /// returns the chosen sub-slot.
    ///
    /// Strict objects go to the sub-slot right after the current one,
    /// keeping the earliest possible phase; relaxed objects go wherever
    /// the accumulated weight is lowest.
    pub fn add(&mut self, object: ActiveRef, policy: ActivationPolicy, weight: Weight) -> Period {
        let target = match policy {
            ActivationPolicy::Strict => (self.current_sub_slot + 1) % self.period as usize,
            ActivationPolicy::Relaxed => self.least_busy_sub_slot(),
        };

        let ptr = active_ptr(&object);
        self.sub_slots[target].push(Entry {
            object,
            ptr,
            weight,
        });
        self.weights[target] += weight;
        log::debug!(
            "Object placed in sub-slot {target} of the period {} slot ({policy} policy, weight {weight}).",
            self.period
        );

        target as Period
    }

    /// Removes an object from whichever sub-slot holds it.
    ///
    /// Returns false when the object was not found, so the caller can
    /// report the double removal.
    pub fn remove(&mut self, object: &ActiveRef) -> bool {
        let target = active_ptr(object);
        for (index, sub_slot) in self.sub_slots.iter_mut().enumerate() {
            if let Some(position) = sub_slot.iter().position(|entry| entry.ptr == target) {
                let entry = sub_slot.remove(position);
                self.weights[index] -= entry.weight;
                return true;
            }
        }
        false
    }

    /// Drives the slot for a new simulation tick, activating the
    /// sub-slot that tick falls in.
    ///
    /// Being called twice for the same tick activates nothing the
    /// second time; only a warning is logged.
    pub fn on_next_tick(&mut self, tick: SimulationTick) {
        let new_sub_slot = (tick % self.period) as usize;

        if new_sub_slot != self.current_sub_slot || self.period == 1 {
            let expected = (self.current_sub_slot + 1) % self.period as usize;
            if new_sub_slot != expected {
                log::warn!(
                    "Non-sequential sub-slot progression in the period {} slot: expected sub-slot {expected}, reached {new_sub_slot} at simulation tick {tick}.",
                    self.period
                );
            }
            self.current_sub_slot = new_sub_slot;
            self.activate_sub_slot(new_sub_slot, tick);
        } else if tick != 0 {
            log::warn!(
                "The period {} slot was driven twice for simulation tick {tick}; ignoring the extra call.",
                self.period
            );
        }
    }

    /// Notifies the objects of a skipped simulation tick and realigns
    /// the slot on it.
    pub fn on_simulation_skipped(&mut self, skipped: SimulationTick) {
        let sub_slot = (skipped % self.period) as usize;
        self.current_sub_slot = sub_slot;

        let mut any_dead = false;
        for entry in &self.sub_slots[sub_slot] {
            if !drive_skip(&entry.object, skipped) {
                any_dead = true;
            }
        }
        if any_dead {
            self.drop_dead_in(sub_slot);
        }
    }

    /// Number of objects currently held, dead links included until the
    /// next activation of their sub-slot.
    pub fn object_count(&self) -> usize {
        self.sub_slots.iter().map(Vec::len).sum()
    }

    /// Sum of the weights of all held objects.
    pub fn total_weight(&self) -> Weight {
        self.weights.iter().sum()
    }

    /// Tells whether no object is held at all.
    pub fn is_empty(&self) -> bool {
        self.object_count() == 0
    }

    fn least_busy_sub_slot(&self) -> usize {
        let mut best = 0;
        for (index, weight) in self.weights.iter().enumerate() {
            if *weight < self.weights[best] {
                best = index;
            }
        }
        best
    }

    fn activate_sub_slot(&mut self, index: usize, tick: SimulationTick) {
        let mut any_dead = false;
        for entry in &self.sub_slots[index] {
            if !drive_activation(&entry.object, tick) {
                any_dead = true;
            }
        }
        if any_dead {
            self.drop_dead_in(index);
        }
    }

    fn drop_dead_in(&mut self, index: usize) {
        let mut removed_weight: Weight = 0;
        let mut removed = 0usize;
        self.sub_slots[index].retain(|entry| {
            if entry.object.strong_count() > 0 {
                true
            } else {
                removed_weight += entry.weight;
                removed += 1;
                false
            }
        });
        if removed > 0 {
            self.weights[index] -= removed_weight;
            log::warn!(
                "{removed} object(s) of the period {} slot were dropped without being unregistered; detaching them.",
                self.period
            );
        }
    }
}

impl fmt::Display for PeriodicSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Periodic slot of period {}, standing at sub-slot {}, managing {} object(s) for a total weight of {}",
            self.period,
            self.current_sub_slot,
            self.object_count(),
            self.total_weight(),
        )
    }
}
