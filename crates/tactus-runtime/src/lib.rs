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

//! # Tactus Runtime
//!
//! The engine's scheduling runtime: the cooperative scheduler driving
//! input, simulation and rendering on one engine tick timeline, the
//! stop signal plumbing, and the engine context owning it all.
//!
//! The abstractions the scheduler drives (active objects, renderers,
//! input pollers) live in `tactus-core`; this crate provides the loop
//! that calls them at the right ticks.
//!
//! ## Typical session
//!
//! An application builds an [`EngineContext`], configures the
//! scheduler it hands out, registers its objects and calls
//! [`Scheduler::run`]. The run ends when some party, an activated
//! object or another thread holding a [`StopHandle`], requests a stop.

#![warn(missing_docs)]

pub mod context;
pub mod scheduler;
pub mod signal;

pub use context::EngineContext;
pub use scheduler::{
    KindStats, PeriodicRegistration, ScheduleMode, ScheduleReport, Scheduler, SchedulerSettings,
    SchedulingError,
};
pub use signal::StopHandle;
