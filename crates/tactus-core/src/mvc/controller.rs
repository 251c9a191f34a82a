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

//! Controller side of the MVC triad, fed by raw input devices.

use crate::mvc::Pollable;
use crate::time::InputTick;

/// Platform identifier of a keyboard key.
pub type KeyIdentifier = u32;

/// Signed deflection of a joystick axis.
pub type AxisPosition = i16;

/// Pixel coordinate on the input surface.
pub type Coordinate = i32;

/// Button of a pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Main button.
    Left,
    /// Wheel click.
    Middle,
    /// Secondary button.
    Right,
    /// Wheel rolled away from the user.
    WheelUp,
    /// Wheel rolled toward the user.
    WheelDown,
}

/// Turns raw device input into domain events.
///
/// Every device method has an empty default body, so a concrete
/// controller only overrides the inputs it cares about. Whatever state
/// the controller distils from them is exposed to pullers through the
/// [`Pollable`] supertrait, and may additionally be pushed through an
/// [`crate::event::EventSource`] the controller owns.
pub trait Controller<E: Clone>: Pollable<E> {
    /// A keyboard key went down.
    fn raw_key_pressed(&mut self, _key: KeyIdentifier) {}

    /// A keyboard key went up.
    fn raw_key_released(&mut self, _key: KeyIdentifier) {}

    /// The pointer moved to the given surface position.
    fn mouse_moved(&mut self, _x: Coordinate, _y: Coordinate) {}

    /// A pointer button went down.
    fn mouse_button_pressed(&mut self, _button: MouseButton) {}

    /// A pointer button went up.
    fn mouse_button_released(&mut self, _button: MouseButton) {}

    /// The joystick moved up with the given deflection.
    fn joystick_up(&mut self, _position: AxisPosition) {}

    /// The joystick moved down with the given deflection.
    fn joystick_down(&mut self, _position: AxisPosition) {}

    /// The joystick moved left with the given deflection.
    fn joystick_left(&mut self, _position: AxisPosition) {}

    /// The joystick moved right with the given deflection.
    fn joystick_right(&mut self, _position: AxisPosition) {}

    /// The first joystick button went down.
    fn joystick_first_button_pressed(&mut self) {}

    /// The first joystick button went up.
    fn joystick_first_button_released(&mut self) {}

    /// The second joystick button went down.
    fn joystick_second_button_pressed(&mut self) {}

    /// The second joystick button went up.
    fn joystick_second_button_released(&mut self) {}
}

/// Input pump invoked by the scheduler on the input timeline.
///
/// A poller reads whatever pending low level input exists at that
/// moment and forwards it to the relevant [`Controller`] methods.
/// Nothing happens between two polling ticks, so input latency is
/// bounded by the input period chosen on the scheduler.
pub trait InputPoller {
    /// Drains pending device input for the given input tick.
    fn poll(&mut self, tick: InputTick);
}
