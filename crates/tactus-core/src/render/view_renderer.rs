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

//! Reference renderer delegating each tick to registered views.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::mvc::view::{View, ViewRef};
use crate::render::renderer::Renderer;
use crate::time::RenderingTick;

/// Renderer that walks its registered views on every rendering tick.
///
/// Views are held weakly and visited in registration order; a view
/// dropped elsewhere is detached with a warning on the next pass. The
/// renderer keeps simple counters so end of run statistics can state
/// how many renderings were performed against how many were skipped.
pub struct ViewRenderer {
    views: Vec<ViewRef>,
    renderings_done: u64,
    renderings_skipped: u64,
    last_rendering: RenderingTick,
}

impl ViewRenderer {
    /// Creates a renderer with no view.
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            renderings_done: 0,
            renderings_skipped: 0,
            last_rendering: 0,
        }
    }

    /// Registers a view to be rendered on every rendering tick.
    ///
    /// Only a weak link is kept, so registration does not extend the
    /// view's lifetime.
    pub fn register_view<V>(&mut self, view: &Rc<RefCell<V>>)
    where
        V: View + 'static,
    {
        let link: ViewRef = {
            let rc: Rc<RefCell<dyn View>> = view.clone();
            Rc::downgrade(&rc)
        };
        self.views.push(link);
        log::trace!("View registered; renderer now manages {} view(s).", self.views.len());
    }

    /// Number of views currently registered, dead links included until
    /// the next rendering pass prunes them.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Renderings actually performed so far.
    pub fn renderings_done(&self) -> u64 {
        self.renderings_done
    }

    /// Rendering ticks dropped so far.
    pub fn renderings_skipped(&self) -> u64 {
        self.renderings_skipped
    }
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ViewRenderer {
    fn render(&mut self, tick: RenderingTick) {
        log::trace!("Rendering tick {tick}.");

        let mut any_dead = false;
        for view in &self.views {
            match view.upgrade() {
                Some(view) => view.borrow_mut().render_model(),
                None => {
                    log::warn!("A view was dropped without being detached; removing it.");
                    any_dead = true;
                }
            }
        }
        if any_dead {
            self.views.retain(|view| view.strong_count() > 0);
        }

        self.renderings_done += 1;
        self.last_rendering = tick;
    }

    fn on_rendering_skipped(&mut self, skipped: RenderingTick) {
        log::debug!("Rendering tick {skipped} was skipped.");
        self.renderings_skipped += 1;
    }
}

impl fmt::Display for ViewRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.renderings_done + self.renderings_skipped;
        let skipped_share = if total > 0 {
            100.0 * self.renderings_skipped as f64 / total as f64
        } else {
            0.0
        };
        write!(
            f,
            "View renderer managing {} view(s), last rendering at tick {}, {} rendering(s) done for {} skip(s) ({skipped_share:.1}% skipped)",
            self.views.len(),
            self.last_rendering,
            self.renderings_done,
            self.renderings_skipped,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// View recording which passes reached it.
    struct ProbeView {
        passes: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    }

    impl View for ProbeView {
        fn render_model(&mut self) {
            self.passes.borrow_mut().push(self.name);
        }
    }

    fn probe(name: &'static str, passes: &Rc<RefCell<Vec<&'static str>>>) -> Rc<RefCell<ProbeView>> {
        Rc::new(RefCell::new(ProbeView {
            passes: passes.clone(),
            name,
        }))
    }

    #[test]
    fn render_visits_views_in_registration_order() {
        let passes = Rc::new(RefCell::new(Vec::new()));
        let first = probe("first", &passes);
        let second = probe("second", &passes);
        let mut renderer = ViewRenderer::new();

        renderer.register_view(&first);
        renderer.register_view(&second);
        renderer.render(0);

        assert_eq!(passes.borrow().as_slice(), ["first", "second"]);
        assert_eq!(renderer.renderings_done(), 1);
    }

    #[test]
    fn dropped_view_is_detached_on_next_render() {
        let passes = Rc::new(RefCell::new(Vec::new()));
        let survivor = probe("survivor", &passes);
        let doomed = probe("doomed", &passes);
        let mut renderer = ViewRenderer::new();

        renderer.register_view(&doomed);
        renderer.register_view(&survivor);
        drop(doomed);
        renderer.render(0);

        assert_eq!(passes.borrow().as_slice(), ["survivor"]);
        assert_eq!(renderer.view_count(), 1, "Dead view link must be pruned");
    }

    #[test]
    fn skip_notifications_only_touch_the_counter() {
        let passes = Rc::new(RefCell::new(Vec::new()));
        let view = probe("view", &passes);
        let mut renderer = ViewRenderer::new();

        renderer.register_view(&view);
        renderer.on_rendering_skipped(4);

        assert!(passes.borrow().is_empty(), "A skip must not render views");
        assert_eq!(renderer.renderings_skipped(), 1);
    }

    #[test]
    fn display_reports_the_skip_share() {
        let mut renderer = ViewRenderer::new();
        renderer.render(0);
        renderer.render(1);
        renderer.render(2);
        renderer.on_rendering_skipped(3);

        let text = renderer.to_string();
        assert!(
            text.contains("3 rendering(s) done for 1 skip(s) (25.0% skipped)"),
            "Unexpected display: {text}"
        );
    }

    #[test]
    fn frame_capture_is_refused_by_default() {
        let mut renderer = ViewRenderer::new();
        let result = renderer.dump_frame(Path::new("frame-000000.bmp"));
        assert!(result.is_err(), "The view renderer has no capture support");
    }
}
