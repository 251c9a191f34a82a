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

//! Model side of the MVC triad.

use crate::activity::Activatable;
use crate::event::Notifiable;
use crate::mvc::Pollable;

/// State holder of the triad.
///
/// A model listens to controller events on its upstream side and
/// answers view pulls on its downstream side. It holds no reference to
/// its views; they find it through weak [`crate::mvc::PollableRef`]
/// links.
pub trait Model<E: Clone>: Notifiable<E> + Pollable<E> {}

/// Model whose state advances on the simulation timeline.
///
/// Rather than reacting to every event as it arrives, a periodical
/// model pulls its controller and steps its state when the scheduler
/// activates it, which keeps simulation progress independent from input
/// arrival order.
///
/// Models usually override [`Activatable::on_skip`] to run the regular
/// activation late instead of dropping the tick, so decisions carried
/// by pending input (quitting, for instance) cannot be lost to an
/// overrun.
pub trait PeriodicalModel<E: Clone>: Model<E> + Activatable {}
