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

//! Engine context owning the scheduler single-mindedly.
//!
//! The context is the root object an application keeps around. It
//! creates the scheduler on first use and tears it down on shutdown,
//! so callers never juggle scheduler ownership themselves.

use crate::scheduler::{Scheduler, SchedulerSettings, SchedulingError};

/// Root engine state, owner of the single scheduler instance.
#[derive(Default)]
pub struct EngineContext {
    scheduler: Option<Scheduler>,
}

impl EngineContext {
    /// Creates a context with no scheduler yet.
    pub fn new() -> Self {
        Self { scheduler: None }
    }

    /// Returns the scheduler, creating a default one on first call.
    pub fn scheduler(&mut self) -> &mut Scheduler {
        self.scheduler.get_or_insert_with(|| {
            log::debug!("Creating the scheduler with default settings.");
            Scheduler::default()
        })
    }

    /// Returns the scheduler, creating it from `settings` when none
    /// exists yet.
    ///
    /// An already existing scheduler is kept as is; the settings are
    /// then ignored with a warning.
    pub fn scheduler_with(
        &mut self,
        settings: SchedulerSettings,
    ) -> Result<&mut Scheduler, SchedulingError> {
        match self.scheduler.take() {
            Some(existing) => {
                log::warn!("A scheduler already exists; the requested settings are ignored.");
                Ok(self.scheduler.insert(existing))
            }
            None => {
                log::debug!("Creating the scheduler from explicit settings.");
                Ok(self.scheduler.insert(Scheduler::new(settings)?))
            }
        }
    }

    /// Returns the scheduler only if one has already been created.
    pub fn existing_scheduler(&mut self) -> Result<&mut Scheduler, SchedulingError> {
        self.scheduler
            .as_mut()
            .ok_or(SchedulingError::NoSchedulerAvailable)
    }

    /// Tells whether a scheduler has been created.
    pub fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Drops the scheduler and everything it owns.
    ///
    /// Registered renderers, pollers and callbacks are released; weakly
    /// held active objects survive wherever their owners keep them.
    pub fn shutdown(&mut self) {
        match self.scheduler.take() {
            Some(_) => log::debug!("Scheduler shut down."),
            None => log::debug!("Shutdown with no scheduler to release."),
        }
    }
}
