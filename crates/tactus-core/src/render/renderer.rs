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

//! Renderer traits driven by the rendering timeline.

use std::path::Path;

use crate::render::error::FrameDumpError;
use crate::time::RenderingTick;

/// Consumer of rendering ticks.
///
/// A renderer is owned by the scheduler once registered, and is told
/// both about ticks that happen and about ticks that had to be dropped,
/// so it can keep its own accounting or interpolate over the gap.
pub trait Renderer {
    /// Produces the frame for the given rendering tick.
    fn render(&mut self, tick: RenderingTick);

    /// Called instead of [`Renderer::render`] when the scheduler had to
    /// drop this rendering tick to catch up with the wall clock.
    fn on_rendering_skipped(&mut self, skipped: RenderingTick) {
        log::debug!("Rendering tick {skipped} was skipped.");
    }

    /// Writes the latest rendered frame to the given path.
    ///
    /// Renderers without capture support keep this default, and the
    /// scheduler stops asking after the first refusal.
    fn dump_frame(&mut self, _path: &Path) -> Result<(), FrameDumpError> {
        Err(FrameDumpError::Unsupported)
    }
}

/// Renderer producing video and audio as two passes of the same tick.
///
/// When one of these is registered, the scheduler invokes
/// [`MultimediaRenderer::render_video`] then
/// [`MultimediaRenderer::render_audio`] for every rendering tick
/// instead of the single [`Renderer::render`] pass.
pub trait MultimediaRenderer: Renderer {
    /// Produces the video part of the given rendering tick.
    fn render_video(&mut self, tick: RenderingTick);

    /// Produces the audio part of the given rendering tick.
    fn render_audio(&mut self, tick: RenderingTick);
}
