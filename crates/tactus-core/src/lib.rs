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

//! # Tactus Core
//!
//! Foundational crate containing the time base, event propagation,
//! activation and rendering contracts that define the engine's
//! architecture.
//!
//! Everything here is single-threaded: listeners, models and renderers
//! live on the thread that drives the engine tick, and are shared
//! through `Rc<RefCell<..>>` handles.

#![warn(missing_docs)]

pub mod activity;
pub mod event;
pub mod mvc;
pub mod render;
pub mod time;

pub use activity::{active_link, Activatable, ActivationPolicy, ActiveRef, PeriodicSchedule};
pub use event::{EventSource, ListenerId, Notifiable};
pub use render::{MultimediaRenderer, Renderer};
pub use time::{EngineClock, EngineTick, Hertz, Microsecond, Period, SimulationTick};
