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

//! View side of the MVC triad.

use std::cell::RefCell;
use std::rc::Weak;

/// Presentation of a model's state.
///
/// Views are driven from the rendering timeline, never from the
/// simulation one: when the renderer's tick comes it asks each
/// registered view to render, and the view reads whatever state its
/// model currently exposes.
pub trait View {
    /// Renders the current state of the observed model.
    fn render_model(&mut self);
}

/// Weak handle to a view, as stored by a renderer.
pub type ViewRef = Weak<RefCell<dyn View>>;
