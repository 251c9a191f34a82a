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

//! Rendering contracts and the view based reference renderer.
//!
//! The scheduler never renders anything itself; it hands every
//! rendering tick to whatever [`Renderer`] was registered. The split
//! [`MultimediaRenderer`] variant lets video and audio be produced as
//! two distinct passes of the same tick.

pub mod error;
pub mod renderer;
pub mod view_renderer;

pub use error::FrameDumpError;
pub use renderer::{MultimediaRenderer, Renderer};
pub use view_renderer::ViewRenderer;
