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

//! Model, view and controller contracts.
//!
//! The engine supports two propagation styles between these roles. In
//! the *push* style a controller broadcasts events through an
//! [`crate::event::EventSource`] as soon as input arrives. In the
//! *pull* style the downstream side asks a [`Pollable`] counterpart for
//! its current state when its own tick comes, which keeps every
//! participant on the schedule instead of reacting mid-frame.

pub mod controller;
pub mod model;
pub mod view;

use std::cell::RefCell;
use std::rc::Weak;

use crate::event::ListenerId;

pub use controller::{AxisPosition, Controller, Coordinate, InputPoller, KeyIdentifier, MouseButton};
pub use model::{Model, PeriodicalModel};
pub use view::{View, ViewRef};

/// State that can be pulled by a registered listener.
///
/// Implementors hand back an event describing their current state. A
/// pollable that has not produced anything yet is expected to answer
/// with the event type's default value, so pulling is always safe.
pub trait Pollable<E: Clone> {
    /// Event describing the current state, for the asking listener.
    fn event_for(&self, asker: ListenerId) -> E;
}

/// Weak handle to a pollable counterpart, as held by a puller.
pub type PollableRef<E> = Weak<RefCell<dyn Pollable<E>>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventSource, Notifiable};
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Direction {
        #[default]
        Idle,
        Up,
        Down,
        Left,
        Right,
    }

    /// Translates raw joystick motion into direction events.
    struct JoystickController {
        source: EventSource<Direction>,
        last: Direction,
    }

    impl JoystickController {
        fn new() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                source: EventSource::new(),
                last: Direction::Idle,
            }))
        }

        fn emit(&mut self, direction: Direction) {
            self.last = direction;
            self.source.notify_all(&direction);
        }
    }

    impl Pollable<Direction> for JoystickController {
        fn event_for(&self, _asker: ListenerId) -> Direction {
            self.last
        }
    }

    impl Controller<Direction> for JoystickController {
        fn joystick_up(&mut self, _position: AxisPosition) {
            self.emit(Direction::Up);
        }

        fn joystick_down(&mut self, _position: AxisPosition) {
            self.emit(Direction::Down);
        }

        fn joystick_left(&mut self, _position: AxisPosition) {
            self.emit(Direction::Left);
        }

        fn joystick_right(&mut self, _position: AxisPosition) {
            self.emit(Direction::Right);
        }
    }

    /// Remembers the latest direction it was told about.
    struct HeadingModel {
        heading: Direction,
    }

    impl HeadingModel {
        fn new() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                heading: Direction::default(),
            }))
        }
    }

    impl Notifiable<Direction> for HeadingModel {
        fn be_notified_of(&mut self, event: &Direction) {
            self.heading = *event;
        }
    }

    impl Pollable<Direction> for HeadingModel {
        fn event_for(&self, _asker: ListenerId) -> Direction {
            self.heading
        }
    }

    impl Model<Direction> for HeadingModel {}

    /// Renders the model's heading as a single glyph per frame.
    struct CompassView {
        model: PollableRef<Direction>,
        identity: ListenerId,
        screen: Rc<RefCell<String>>,
    }

    impl View for CompassView {
        fn render_model(&mut self) {
            let glyph = match self.model.upgrade() {
                Some(model) => match model.borrow().event_for(self.identity) {
                    Direction::Idle => '.',
                    Direction::Up => '^',
                    Direction::Down => 'v',
                    Direction::Left => '<',
                    Direction::Right => '>',
                },
                None => '?',
            };
            self.screen.borrow_mut().push(glyph);
        }
    }

    fn wire_triad() -> (
        Rc<RefCell<JoystickController>>,
        Rc<RefCell<HeadingModel>>,
        CompassView,
        Rc<RefCell<String>>,
    ) {
        let controller = JoystickController::new();
        let model = HeadingModel::new();
        let screen = Rc::new(RefCell::new(String::new()));

        let model_id = controller.borrow_mut().source.subscribe(&model);
        let pollable: PollableRef<Direction> = {
            let rc: Rc<RefCell<dyn Pollable<Direction>>> = model.clone();
            Rc::downgrade(&rc)
        };
        let view = CompassView {
            model: pollable,
            identity: model_id,
            screen: screen.clone(),
        };

        (controller, model, view, screen)
    }

    #[test]
    fn model_answers_default_before_any_event() {
        let (_controller, _model, mut view, screen) = wire_triad();

        view.render_model();

        assert_eq!(screen.borrow().as_str(), ".");
    }

    #[test]
    fn controller_event_reaches_the_view_through_the_model() {
        let (controller, _model, mut view, screen) = wire_triad();

        controller.borrow_mut().joystick_up(12_000);
        view.render_model();

        assert_eq!(screen.borrow().as_str(), "^");
    }

    #[test]
    fn rendering_twice_without_mutation_draws_the_same_glyph() {
        let (controller, _model, mut view, screen) = wire_triad();

        controller.borrow_mut().joystick_right(1);
        view.render_model();
        view.render_model();

        assert_eq!(screen.borrow().as_str(), ">>");
    }

    #[test]
    fn each_direction_renders_its_own_glyph() {
        let (controller, _model, mut view, screen) = wire_triad();

        controller.borrow_mut().joystick_up(1);
        view.render_model();
        controller.borrow_mut().joystick_down(1);
        view.render_model();
        controller.borrow_mut().joystick_left(1);
        view.render_model();
        controller.borrow_mut().joystick_right(1);
        view.render_model();

        assert_eq!(screen.borrow().as_str(), "^v<>");
    }

    #[test]
    fn view_survives_its_model_being_dropped() {
        let (controller, model, mut view, screen) = wire_triad();

        controller.borrow_mut().joystick_left(1);
        drop(model);
        view.render_model();

        assert_eq!(
            screen.borrow().as_str(),
            "?",
            "A view with a vanished model must degrade, not crash"
        );
    }

    #[test]
    fn unhandled_device_methods_are_silently_ignored() {
        let (controller, _model, mut view, screen) = wire_triad();

        // This controller does not override key or mouse handling.
        controller.borrow_mut().raw_key_pressed(42);
        controller.borrow_mut().mouse_moved(10, 20);
        controller
            .borrow_mut()
            .mouse_button_pressed(MouseButton::Left);
        view.render_model();

        assert_eq!(screen.borrow().as_str(), ".");
    }
}
