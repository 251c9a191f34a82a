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

//! Publish/subscribe event propagation.
//!
//! An [`EventSource`] pushes events to weakly held [`Notifiable`]
//! listeners on the engine thread. The weak links let a listener
//! disappear at any time without keeping the source alive or leaving a
//! dangling reference behind.

pub mod source;

pub use source::{EventSource, ListenerId, Notifiable};
