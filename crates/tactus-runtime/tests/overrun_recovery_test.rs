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

//! Recovery from sustained overruns.
//!
//! An activation that lasts longer than the simulation period forces
//! the best-effort loop to fall behind on every simulation tick. The
//! loop must catch up by skipping, not by replaying, and the skipped
//! ticks must be announced to the object so it can compensate.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tactus_core::activity::{Activatable, ActivationError, PeriodicSchedule};
use tactus_core::time::SimulationTick;
use tactus_runtime::{Scheduler, StopHandle};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Burns two and a half simulation periods of wall time per
/// activation, then asks to stop once past its target tick.
struct Hog {
    stop_at: SimulationTick,
    handle: StopHandle,
    activated: BTreeSet<SimulationTick>,
    skipped: BTreeSet<SimulationTick>,
}

impl Activatable for Hog {
    fn on_activation(&mut self, tick: SimulationTick) -> Result<(), ActivationError> {
        thread::sleep(Duration::from_millis(25));
        self.activated.insert(tick);
        if tick >= self.stop_at {
            self.handle.request_stop();
        }
        Ok(())
    }

    fn on_skip(&mut self, skipped: SimulationTick) -> Result<(), ActivationError> {
        self.skipped.insert(skipped);
        if skipped >= self.stop_at {
            self.handle.request_stop();
        }
        Ok(())
    }
}

#[test]
fn test_overloaded_simulation_skips_instead_of_replaying() {
    init_logging();

    // --- 1. ARRANGE ---
    // Default timing gives a 10 ms simulation period; the hog holds
    // each activation for 25 ms, so roughly two ticks are lost per
    // tick performed.
    let mut scheduler = Scheduler::default();
    let hog = Rc::new(RefCell::new(Hog {
        stop_at: 25,
        handle: scheduler.stop_handle(),
        activated: BTreeSet::new(),
        skipped: BTreeSet::new(),
    }));
    scheduler
        .register_periodic(&hog, PeriodicSchedule::every(1))
        .expect("Registration must succeed");

    // --- 2. ACT ---
    let report = scheduler.run().expect("The run must complete");

    // --- 3. ASSERT ---
    let hog = hog.borrow();
    assert!(
        !hog.activated.is_empty(),
        "The hog must have been activated at least once"
    );
    assert!(
        !hog.skipped.is_empty(),
        "A 25 ms activation on a 10 ms period must produce skips"
    );

    // Every simulation tick up to the last consumed one was either
    // activated or skipped, exactly once.
    let last = report.simulation.final_tick - 1;
    for tick in 0..=last {
        let activated = hog.activated.contains(&tick);
        let skipped = hog.skipped.contains(&tick);
        assert!(
            activated ^ skipped,
            "Simulation tick {tick} was observed {} times",
            u32::from(activated) + u32::from(skipped)
        );
    }
    assert_eq!(
        hog.activated.len() + hog.skipped.len(),
        (last + 1) as usize,
        "No observation may fall outside the consumed range"
    );

    // The object on a unit period sees every skip the scheduler
    // counts.
    assert_eq!(
        report.simulation.missed,
        hog.skipped.len() as u64,
        "Report and object must agree on the number of skips"
    );
    assert!(
        report.simulation.final_tick > report.simulation.missed,
        "Some ticks must still have been performed"
    );
}
