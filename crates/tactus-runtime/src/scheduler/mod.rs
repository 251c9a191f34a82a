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

//! Cooperative scheduler multiplexing input, simulation and rendering.
//!
//! All three activities live on one discrete timeline counted in engine
//! ticks. Each has its own period on that timeline; whenever the engine
//! tick reaches a checkpoint, the corresponding tick kind is scheduled,
//! input first, then simulation, then rendering.
//!
//! Two execution modes share those checkpoints. The *best-effort* mode
//! anchors the engine tick to the wall clock: checkpoints are soft
//! deadlines, ticks falling behind are skipped rather than replayed,
//! and the time between deadlines is spent idling. The *no-deadline*
//! mode ignores the wall clock entirely and advances the engine tick as
//! fast as possible, which makes a run fully deterministic; it is the
//! mode of batch rendering and frame capture sessions.

pub mod error;
pub mod report;
pub mod slot;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tactus_core::activity::frequency;
use tactus_core::activity::{
    active_link, first_activation_tick, Activatable, ActiveRef, PeriodicSchedule, TickOrigin,
};
use tactus_core::mvc::InputPoller;
use tactus_core::render::{FrameDumpError, MultimediaRenderer, Renderer};
use tactus_core::time::{
    self, EngineClock, EngineTick, Hertz, InputTick, Microsecond, Period, RenderingTick,
    SimulationTick,
};

use crate::signal::{SignalBus, StopHandle};

pub use error::SchedulingError;
pub use report::{KindStats, ScheduleReport};
pub use slot::PeriodicSlot;

/// Default engine tick duration: one millisecond.
pub const DEFAULT_ENGINE_TICK_DURATION: Microsecond = 1_000;
/// Default simulation frequency.
pub const DEFAULT_SIMULATION_FREQUENCY: Hertz = 100;
/// Default rendering frequency.
pub const DEFAULT_RENDERING_FREQUENCY: Hertz = 40;
/// Default input polling frequency.
pub const DEFAULT_INPUT_FREQUENCY: Hertz = 20;
/// Default frame capture frequency, in no-deadline mode.
pub const DEFAULT_SCREENSHOT_FREQUENCY: Hertz = 25;

/// Execution mode of a scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleMode {
    /// Soft real-time: deadlines follow the wall clock, late ticks are
    /// skipped.
    #[default]
    BestEffort,
    /// Batch: the engine tick advances as fast as possible and no tick
    /// is ever skipped.
    NoDeadline,
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleMode::BestEffort => write!(f, "best-effort"),
            ScheduleMode::NoDeadline => write!(f, "no-deadline"),
        }
    }
}

/// User facing configuration of a scheduler.
///
/// Every field has a default, so a partial configuration file is
/// enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Wall-clock duration of one engine tick, in microseconds.
    pub engine_tick_duration: Microsecond,
    /// Requested simulation frequency.
    pub simulation_frequency: Hertz,
    /// Requested rendering frequency.
    pub rendering_frequency: Hertz,
    /// Requested input polling frequency.
    pub input_frequency: Hertz,
    /// Requested frame capture frequency, honoured in no-deadline mode.
    pub screenshot_frequency: Hertz,
    /// Filename prefix enabling frame capture when set.
    pub screenshot_prefix: Option<String>,
    /// Whether input checkpoints fire at all in no-deadline mode.
    pub batch_input_polling: bool,
    /// Execution mode of the next run.
    pub mode: ScheduleMode,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            engine_tick_duration: DEFAULT_ENGINE_TICK_DURATION,
            simulation_frequency: DEFAULT_SIMULATION_FREQUENCY,
            rendering_frequency: DEFAULT_RENDERING_FREQUENCY,
            input_frequency: DEFAULT_INPUT_FREQUENCY,
            screenshot_frequency: DEFAULT_SCREENSHOT_FREQUENCY,
            screenshot_prefix: None,
            batch_input_polling: true,
            mode: ScheduleMode::BestEffort,
        }
    }
}

/// Placement granted to a periodic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicRegistration {
    /// Sub-slot the object was pinned to within its period.
    pub sub_slot: Period,
    /// Simulation tick of the expected first activation.
    pub first_activation: SimulationTick,
}

enum RendererSlot {
    Single(Box<dyn Renderer>),
    Multimedia(Box<dyn MultimediaRenderer>),
}

/// The engine's cooperative scheduler.
///
/// The scheduler owns its renderer and input poller, but only holds
/// weak references to active objects; dropping an object anywhere is
/// enough to retire it. A run is driven by [`Scheduler::run`] and ends
/// when a stop is requested through a [`StopHandle`], from inside an
/// activation or from another thread.
pub struct Scheduler {
    engine_tick_duration: Microsecond,
    mode: ScheduleMode,

    requested_simulation_hz: Hertz,
    requested_rendering_hz: Hertz,
    requested_input_hz: Hertz,
    requested_screenshot_hz: Hertz,

    simulation_period: Period,
    rendering_period: Period,
    input_period: Period,
    screenshot_period: Period,

    screenshot_prefix: Option<String>,
    batch_input_polling: bool,

    current_engine_tick: EngineTick,
    current_simulation_tick: SimulationTick,
    current_rendering_tick: RenderingTick,
    current_input_tick: InputTick,

    /// Slots ordered by ascending period.
    periodic_slots: Vec<PeriodicSlot>,
    programmed: BTreeMap<SimulationTick, Vec<ActiveRef>>,

    renderer: Option<RendererSlot>,
    input_poller: Option<Box<dyn InputPoller>>,
    idle_callback: Option<Box<dyn FnMut()>>,
    idle_callback_max_duration: Microsecond,

    signals: SignalBus,

    missed_simulation: u64,
    missed_rendering: u64,
    missed_input: u64,
    idle_calls: u64,
    frames_captured: u64,
    run_started: Option<EngineClock>,
}

impl Scheduler {
    /// Builds a scheduler from the given settings.
    ///
    /// Fails when the engine tick duration is zero or when any of the
    /// four kind frequencies is finer than one engine tick.
    pub fn new(settings: SchedulerSettings) -> Result<Self, SchedulingError> {
        if settings.engine_tick_duration == 0 {
            return Err(SchedulingError::InvalidTickDuration);
        }
        let duration = settings.engine_tick_duration;
        let simulation_period =
            frequency::period_for_frequency(settings.simulation_frequency, duration)?;
        let rendering_period =
            frequency::period_for_frequency(settings.rendering_frequency, duration)?;
        let input_period = frequency::period_for_frequency(settings.input_frequency, duration)?;
        let screenshot_period =
            frequency::period_for_frequency(settings.screenshot_frequency, duration)?;

        Ok(Self::assemble(
            settings,
            simulation_period,
            rendering_period,
            input_period,
            screenshot_period,
        ))
    }

    fn assemble(
        settings: SchedulerSettings,
        simulation_period: Period,
        rendering_period: Period,
        input_period: Period,
        screenshot_period: Period,
    ) -> Self {
        Self {
            engine_tick_duration: settings.engine_tick_duration,
            mode: settings.mode,
            requested_simulation_hz: settings.simulation_frequency,
            requested_rendering_hz: settings.rendering_frequency,
            requested_input_hz: settings.input_frequency,
            requested_screenshot_hz: settings.screenshot_frequency,
            simulation_period,
            rendering_period,
            input_period,
            screenshot_period,
            screenshot_prefix: settings.screenshot_prefix,
            batch_input_polling: settings.batch_input_polling,
            current_engine_tick: 0,
            current_simulation_tick: 0,
            current_rendering_tick: 0,
            current_input_tick: 0,
            periodic_slots: Vec::new(),
            programmed: BTreeMap::new(),
            renderer: None,
            input_poller: None,
            idle_callback: None,
            idle_callback_max_duration: 0,
            signals: SignalBus::new(),
            missed_simulation: 0,
            missed_rendering: 0,
            missed_input: 0,
            idle_calls: 0,
            frames_captured: 0,
            run_started: None,
        }
    }

    /// Engine tick duration in use, in microseconds.
    pub fn engine_tick_duration(&self) -> Microsecond {
        self.engine_tick_duration
    }

    /// Execution mode of the next run.
    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    /// Changes the execution mode of the next run.
    pub fn set_mode(&mut self, mode: ScheduleMode) {
        self.mode = mode;
    }

    /// Simulation period, in engine ticks.
    pub fn simulation_period(&self) -> Period {
        self.simulation_period
    }

    /// Rendering period, in engine ticks.
    pub fn rendering_period(&self) -> Period {
        self.rendering_period
    }

    /// Input polling period, in engine ticks.
    pub fn input_period(&self) -> Period {
        self.input_period
    }

    /// Frame capture period, in engine ticks.
    pub fn screenshot_period(&self) -> Period {
        self.screenshot_period
    }

    /// Simulation tick the scheduler currently stands at.
    pub fn current_simulation_tick(&self) -> SimulationTick {
        self.current_simulation_tick
    }

    /// Engine tick the scheduler currently stands at.
    pub fn current_engine_tick(&self) -> EngineTick {
        self.current_engine_tick
    }

    /// Changes the duration of the engine tick.
    ///
    /// The four requested kind frequencies are kept and their periods
    /// re-derived against the new quantum; nothing is modified when one
    /// of them cannot be honoured anymore.
    pub fn set_engine_tick_duration(
        &mut self,
        duration: Microsecond,
    ) -> Result<(), SchedulingError> {
        if duration == 0 {
            return Err(SchedulingError::InvalidTickDuration);
        }
        let simulation_period =
            frequency::period_for_frequency(self.requested_simulation_hz, duration)?;
        let rendering_period =
            frequency::period_for_frequency(self.requested_rendering_hz, duration)?;
        let input_period = frequency::period_for_frequency(self.requested_input_hz, duration)?;
        let screenshot_period =
            frequency::period_for_frequency(self.requested_screenshot_hz, duration)?;

        self.engine_tick_duration = duration;
        self.simulation_period = simulation_period;
        self.rendering_period = rendering_period;
        self.input_period = input_period;
        self.screenshot_period = screenshot_period;
        log::info!(
            "Engine tick duration set to {duration} microsecond(s); periods re-derived to {simulation_period}/{rendering_period}/{input_period}/{screenshot_period} engine tick(s)."
        );
        Ok(())
    }

    /// Changes the requested simulation frequency.
    pub fn set_simulation_frequency(&mut self, hz: Hertz) -> Result<(), SchedulingError> {
        self.simulation_period = frequency::period_for_frequency(hz, self.engine_tick_duration)?;
        self.requested_simulation_hz = hz;
        log::debug!(
            "Simulation frequency set to {hz} Hz (period {} engine tick(s)).",
            self.simulation_period
        );
        Ok(())
    }

    /// Changes the requested rendering frequency.
    pub fn set_rendering_frequency(&mut self, hz: Hertz) -> Result<(), SchedulingError> {
        self.rendering_period = frequency::period_for_frequency(hz, self.engine_tick_duration)?;
        self.requested_rendering_hz = hz;
        log::debug!(
            "Rendering frequency set to {hz} Hz (period {} engine tick(s)).",
            self.rendering_period
        );
        Ok(())
    }

    /// Changes the requested input polling frequency.
    pub fn set_input_frequency(&mut self, hz: Hertz) -> Result<(), SchedulingError> {
        self.input_period = frequency::period_for_frequency(hz, self.engine_tick_duration)?;
        self.requested_input_hz = hz;
        log::debug!(
            "Input polling frequency set to {hz} Hz (period {} engine tick(s)).",
            self.input_period
        );
        Ok(())
    }

    /// Changes the requested frame capture frequency.
    pub fn set_screenshot_frequency(&mut self, hz: Hertz) -> Result<(), SchedulingError> {
        self.screenshot_period = frequency::period_for_frequency(hz, self.engine_tick_duration)?;
        self.requested_screenshot_hz = hz;
        log::debug!(
            "Frame capture frequency set to {hz} Hz (period {} engine tick(s)).",
            self.screenshot_period
        );
        Ok(())
    }

    /// Enables or disables frame capture by setting its filename prefix.
    ///
    /// Captured frames are numbered `<prefix>-000000.bmp` onwards.
    pub fn set_screenshot_prefix(&mut self, prefix: Option<String>) {
        self.screenshot_prefix = prefix;
    }

    /// Negotiates an activation frequency for a periodic object, as a
    /// period in simulation ticks.
    ///
    /// Convenience over [`frequency::negotiated_rate`] using this
    /// scheduler's current timing.
    pub fn negotiate_frequency(
        &self,
        desired_hz: f64,
    ) -> Result<frequency::NegotiatedRate, SchedulingError> {
        Ok(frequency::negotiated_rate(
            desired_hz,
            self.simulation_period,
            self.engine_tick_duration,
        )?)
    }

    /// Registers an object for periodic activation.
    ///
    /// The object is placed in the slot of its period; the granted
    /// placement tells which sub-slot was chosen and when the first
    /// activation is expected.
    pub fn register_periodic<O>(
        &mut self,
        object: &Rc<RefCell<O>>,
        schedule: PeriodicSchedule,
    ) -> Result<PeriodicRegistration, SchedulingError>
    where
        O: Activatable + 'static,
    {
        if schedule.period == 0 {
            return Err(SchedulingError::InvalidPeriod { period: 0 });
        }

        let index = self.slot_index_for(schedule.period);
        let sub_slot =
            self.periodic_slots[index].add(active_link(object), schedule.policy, schedule.weight);
        let first_activation =
            first_activation_tick(self.current_simulation_tick, schedule.period, sub_slot);

        log::debug!(
            "Periodic object registered: period {} simulation tick(s), sub-slot {sub_slot}, first activation expected at simulation tick {first_activation}.",
            schedule.period
        );
        Ok(PeriodicRegistration {
            sub_slot,
            first_activation,
        })
    }

    /// Registers an object for activation at an explicit list of
    /// simulation ticks.
    ///
    /// Relative ticks are offsets from the current simulation tick. An
    /// empty list is rejected, as the object would never be activated.
    pub fn register_programmed<O>(
        &mut self,
        object: &Rc<RefCell<O>>,
        ticks: &[SimulationTick],
        origin: TickOrigin,
    ) -> Result<(), SchedulingError>
    where
        O: Activatable + 'static,
    {
        if ticks.is_empty() {
            return Err(SchedulingError::NothingToSchedule);
        }

        let link = active_link(object);
        for &tick in ticks {
            let absolute = match origin {
                TickOrigin::Absolute => tick,
                TickOrigin::Relative => self.current_simulation_tick + tick,
            };
            self.programmed.entry(absolute).or_default().push(link.clone());
        }
        log::debug!(
            "Programmed object registered for {} activation tick(s).",
            ticks.len()
        );
        Ok(())
    }

    /// Withdraws an object from every registry it appears in.
    ///
    /// Unregistering an object that is not registered is harmless and
    /// only logs a warning.
    pub fn unregister<O>(&mut self, object: &Rc<RefCell<O>>)
    where
        O: Activatable + 'static,
    {
        let link = active_link(object);
        let target = slot::active_ptr(&link);
        let mut found = false;

        for slot in &mut self.periodic_slots {
            if slot.remove(&link) {
                found = true;
            }
        }
        for activations in self.programmed.values_mut() {
            let before = activations.len();
            activations.retain(|candidate| slot::active_ptr(candidate) != target);
            if activations.len() < before {
                found = true;
            }
        }
        self.programmed.retain(|_, activations| !activations.is_empty());

        if found {
            log::debug!("Object unregistered from the scheduler.");
        } else {
            log::warn!("Cannot unregister: object was not registered.");
        }
    }

    /// Hands the scheduler the renderer owning the rendering timeline.
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        if self.renderer.is_some() {
            log::debug!("Replacing the previously registered renderer.");
        }
        self.renderer = Some(RendererSlot::Single(renderer));
    }

    /// Hands the scheduler a renderer with split video and audio passes.
    pub fn set_multimedia_renderer(&mut self, renderer: Box<dyn MultimediaRenderer>) {
        if self.renderer.is_some() {
            log::debug!("Replacing the previously registered renderer.");
        }
        self.renderer = Some(RendererSlot::Multimedia(renderer));
    }

    /// Tells whether a renderer is registered.
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Hands the scheduler the pump draining device input on the input
    /// timeline.
    pub fn set_input_poller(&mut self, poller: Box<dyn InputPoller>) {
        self.input_poller = Some(poller);
    }

    /// Installs a custom idle policy for the best-effort wait phase.
    ///
    /// `expected_max_duration` is the worst case duration of one call,
    /// in microseconds. Passing 0 lets the scheduler assume one OS
    /// scheduling granularity, which is also what the default policy,
    /// an atomic sleep, costs.
    pub fn set_idle_callback(
        &mut self,
        callback: Box<dyn FnMut()>,
        expected_max_duration: Microsecond,
    ) {
        self.idle_callback = Some(callback);
        self.idle_callback_max_duration = expected_max_duration;
    }

    /// Reverts the idle policy to the default atomic sleep.
    pub fn clear_idle_callback(&mut self) {
        self.idle_callback = None;
        self.idle_callback_max_duration = 0;
    }

    /// Hands out a cloneable, thread-safe handle able to stop a run.
    pub fn stop_handle(&self) -> StopHandle {
        self.signals.stop_handle()
    }

    /// Requests the current or next run to stop at the end of an
    /// iteration.
    pub fn request_stop(&self) {
        self.signals.stop_handle().request_stop();
    }

    /// Executes a scheduling run in the configured mode.
    ///
    /// The run ends when a stop is requested; a no-deadline run without
    /// any stopper would spin forever. Tick counters restart from zero
    /// on every run; programmed activations not consumed by a previous
    /// run stay armed.
    pub fn run(&mut self) -> Result<ScheduleReport, SchedulingError> {
        match self.mode {
            ScheduleMode::BestEffort => self.run_best_effort(),
            ScheduleMode::NoDeadline => self.run_no_deadline(),
        }
    }

    fn run_best_effort(&mut self) -> Result<ScheduleReport, SchedulingError> {
        if !time::sub_second_sleep_available() {
            let granularity = time::scheduling_granularity().as_micros() as Microsecond;
            return Err(SchedulingError::GranularityTooCoarse { granularity });
        }

        self.reset_run_state();
        self.signals.discard_pending();

        let granularity = (time::scheduling_granularity().as_micros() as Microsecond).max(1);
        let idle_budget = if self.idle_callback_max_duration > 0 {
            self.idle_callback_max_duration
        } else {
            // One granularity plus a safety tenth.
            granularity + granularity / 10
        };
        let idle_margin: EngineTick = idle_budget.div_ceil(self.engine_tick_duration).max(1);

        let mut next_simulation: EngineTick = self.simulation_period;
        let mut next_rendering: EngineTick = self.rendering_period;
        let mut next_input: EngineTick = self.input_period;

        log::info!(
            "Starting best-effort scheduling: simulation every {} engine tick(s), rendering every {}, input every {}, idle margin {idle_margin} engine tick(s).",
            self.simulation_period,
            self.rendering_period,
            self.input_period,
        );

        let clock = EngineClock::start();
        self.run_started = Some(clock);

        loop {
            if self.signals.stop_requested() {
                log::info!(
                    "Stop requested; leaving the scheduling loop at engine tick {}.",
                    self.current_engine_tick
                );
                break;
            }

            // Due checkpoints, in the fixed kind order.
            if self.current_engine_tick == next_input {
                self.schedule_input();
                next_input += self.input_period;
            }
            if self.current_engine_tick == next_simulation {
                self.schedule_simulation();
                next_simulation += self.simulation_period;
            }
            if self.current_engine_tick == next_rendering {
                self.schedule_rendering();
                next_rendering += self.rendering_period;
            }

            // The work above took real time. Deadlines now at or behind
            // the clock can no longer be honoured and are consumed as
            // skips, input first, then simulation, then rendering.
            self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);

            while next_input < self.current_engine_tick + 1 {
                self.on_input_skipped();
                next_input += self.input_period;
                self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);
            }
            while next_simulation < self.current_engine_tick + 1 {
                self.on_simulation_skipped();
                next_simulation += self.simulation_period;
                self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);
            }
            while next_rendering < self.current_engine_tick + 1 {
                self.on_rendering_skipped();
                next_rendering += self.rendering_period;
                self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);
            }

            // Wait phase: idle while the next deadline is far enough,
            // then spin over the last stretch for a precise landing.
            let next_deadline = next_input.min(next_simulation).min(next_rendering);

            while self.current_engine_tick + idle_margin < next_deadline {
                self.on_idle();
                self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);
            }
            while self.current_engine_tick < next_deadline {
                std::hint::spin_loop();
                self.current_engine_tick = clock.engine_tick(self.engine_tick_duration);
            }
        }

        let runtime = clock.elapsed();
        self.run_started = None;
        let report = self.build_report(runtime);
        report.log_summary();
        Ok(report)
    }

    fn run_no_deadline(&mut self) -> Result<ScheduleReport, SchedulingError> {
        self.reset_run_state();
        self.signals.discard_pending();

        let mut next_simulation: EngineTick = self.simulation_period;
        let mut next_rendering: EngineTick = self.rendering_period;
        let mut next_input: EngineTick = self.input_period;
        let mut next_screenshot: EngineTick = self.screenshot_period;
        let mut capture_enabled = self.screenshot_prefix.is_some();

        log::info!(
            "Starting no-deadline scheduling: simulation every {} engine tick(s), rendering every {}, input every {} (polling {}), frame capture {}.",
            self.simulation_period,
            self.rendering_period,
            self.input_period,
            if self.batch_input_polling { "on" } else { "off" },
            if capture_enabled { "on" } else { "off" },
        );

        let clock = EngineClock::start();
        self.run_started = Some(clock);

        loop {
            if self.signals.stop_requested() {
                log::info!(
                    "Stop requested; leaving the scheduling loop at engine tick {}.",
                    self.current_engine_tick
                );
                break;
            }

            if self.batch_input_polling && self.current_engine_tick == next_input {
                self.schedule_input();
                next_input += self.input_period;
            }
            if self.current_engine_tick == next_simulation {
                self.schedule_simulation();
                next_simulation += self.simulation_period;
            }
            if self.current_engine_tick == next_rendering {
                self.schedule_rendering();
                next_rendering += self.rendering_period;
            }
            if self.current_engine_tick == next_screenshot {
                if capture_enabled {
                    capture_enabled = self.capture_frame();
                }
                next_screenshot += self.screenshot_period;
            }

            self.current_engine_tick += 1;
        }

        let runtime = clock.elapsed();
        self.run_started = None;
        let report = self.build_report(runtime);
        report.log_summary();
        Ok(report)
    }

    fn reset_run_state(&mut self) {
        self.current_engine_tick = 0;
        self.current_simulation_tick = 0;
        self.current_rendering_tick = 0;
        self.current_input_tick = 0;
        self.missed_simulation = 0;
        self.missed_rendering = 0;
        self.missed_input = 0;
        self.idle_calls = 0;
        self.frames_captured = 0;
    }

    fn schedule_input(&mut self) {
        let tick = self.current_input_tick;
        log::trace!("Input tick {tick}.");
        match &mut self.input_poller {
            Some(poller) => poller.poll(tick),
            None => log::trace!("No input poller registered for input tick {tick}."),
        }
        self.current_input_tick += 1;
    }

    fn schedule_simulation(&mut self) {
        let tick = self.current_simulation_tick;
        log::trace!("Simulation tick {tick}.");

        if let Some(programmed) = self.programmed.remove(&tick) {
            for object in &programmed {
                if !slot::drive_activation(object, tick) {
                    log::warn!(
                        "A programmed object was dropped before its activation at simulation tick {tick}."
                    );
                }
            }
        }
        for slot in &mut self.periodic_slots {
            slot.on_next_tick(tick);
        }
        self.current_simulation_tick += 1;
    }

    fn schedule_rendering(&mut self) {
        let tick = self.current_rendering_tick;
        log::trace!("Rendering tick {tick}.");
        match &mut self.renderer {
            Some(RendererSlot::Single(renderer)) => renderer.render(tick),
            Some(RendererSlot::Multimedia(renderer)) => {
                renderer.render_video(tick);
                renderer.render_audio(tick);
            }
            None => log::trace!("No renderer registered for rendering tick {tick}."),
        }
        self.current_rendering_tick += 1;
    }

    fn on_input_skipped(&mut self) {
        log::trace!("Input tick {} skipped.", self.current_input_tick);
        self.missed_input += 1;
        self.current_input_tick += 1;
    }

    fn on_simulation_skipped(&mut self) {
        let tick = self.current_simulation_tick;
        log::debug!("Simulation tick {tick} skipped; notifying active objects.");
        self.missed_simulation += 1;

        if let Some(programmed) = self.programmed.remove(&tick) {
            for object in &programmed {
                slot::drive_skip(object, tick);
            }
        }
        for slot in &mut self.periodic_slots {
            slot.on_simulation_skipped(tick);
        }
        self.current_simulation_tick += 1;
    }

    fn on_rendering_skipped(&mut self) {
        let tick = self.current_rendering_tick;
        self.missed_rendering += 1;
        match &mut self.renderer {
            Some(RendererSlot::Single(renderer)) => renderer.on_rendering_skipped(tick),
            Some(RendererSlot::Multimedia(renderer)) => renderer.on_rendering_skipped(tick),
            None => log::trace!("Rendering tick {tick} skipped with no renderer registered."),
        }
        self.current_rendering_tick += 1;
    }

    fn on_idle(&mut self) {
        self.idle_calls += 1;
        match &mut self.idle_callback {
            Some(callback) => callback(),
            None => time::atomic_sleep(),
        }
    }

    /// Dumps the current frame, returning false when capture must be
    /// disabled for the rest of the run.
    fn capture_frame(&mut self) -> bool {
        let prefix = match &self.screenshot_prefix {
            Some(prefix) => prefix,
            None => return false,
        };
        let path = PathBuf::from(format!("{prefix}-{:06}.bmp", self.frames_captured));

        let result = match &mut self.renderer {
            Some(RendererSlot::Single(renderer)) => renderer.dump_frame(&path),
            Some(RendererSlot::Multimedia(renderer)) => renderer.dump_frame(&path),
            None => {
                log::warn!("Frame capture requested but no renderer is registered; captures disabled.");
                return false;
            }
        };

        match result {
            Ok(()) => {
                log::trace!("Captured frame '{}'.", path.display());
                self.frames_captured += 1;
                true
            }
            Err(FrameDumpError::Unsupported) => {
                log::warn!("The registered renderer cannot capture frames; captures disabled.");
                false
            }
            Err(error) => {
                // Possibly transient, keep trying on later checkpoints.
                log::warn!("Frame capture failed: {error}.");
                true
            }
        }
    }

    fn build_report(&self, runtime: Duration) -> ScheduleReport {
        let runtime_microseconds = (runtime.as_micros() as u64).max(1);
        ScheduleReport {
            mode: self.mode,
            runtime,
            engine_tick_duration: self.engine_tick_duration,
            final_engine_tick: self.current_engine_tick,
            simulation: self.kind_stats(
                "Simulation",
                self.requested_simulation_hz,
                self.simulation_period,
                self.current_simulation_tick,
                self.missed_simulation,
                runtime_microseconds,
            ),
            rendering: self.kind_stats(
                "Rendering",
                self.requested_rendering_hz,
                self.rendering_period,
                self.current_rendering_tick,
                self.missed_rendering,
                runtime_microseconds,
            ),
            input: self.kind_stats(
                "Input",
                self.requested_input_hz,
                self.input_period,
                self.current_input_tick,
                self.missed_input,
                runtime_microseconds,
            ),
            idle_calls: self.idle_calls,
            frames_captured: self.frames_captured,
        }
    }

    fn kind_stats(
        &self,
        label: &'static str,
        requested_hz: Hertz,
        period: Period,
        final_tick: u64,
        missed: u64,
        runtime_microseconds: Microsecond,
    ) -> KindStats {
        let performed = final_tick - missed;
        KindStats {
            label,
            requested_hz,
            agreed_hz: frequency::agreed_frequency(period, self.engine_tick_duration),
            measured_hz: 1_000_000.0 * performed as f64 / runtime_microseconds as f64,
            period,
            final_tick,
            missed,
        }
    }

    fn slot_index_for(&mut self, period: Period) -> usize {
        match self
            .periodic_slots
            .binary_search_by_key(&period, PeriodicSlot::period)
        {
            Ok(index) => index,
            Err(index) => {
                self.periodic_slots.insert(index, PeriodicSlot::new(period));
                index
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        // Periods of the default settings against the 1 ms engine
        // tick: 100 Hz -> 10, 40 Hz -> 25, 20 Hz -> 50, 25 Hz -> 40.
        Self::assemble(SchedulerSettings::default(), 10, 25, 50, 40)
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine_hz = 1_000_000.0 / self.engine_tick_duration as f64;
        write!(
            f,
            "Scheduler in {} mode at {engine_hz:.2} Hz engine frequency ({} microsecond engine tick), ",
            self.mode, self.engine_tick_duration,
        )?;
        match self.run_started {
            Some(clock) => write!(f, "running for {:.1} s, ", clock.elapsed().as_secs_f64())?,
            None => write!(f, "stopped, ")?,
        }
        write!(
            f,
            "at engine tick {}, simulation tick {}, rendering tick {}, input tick {}; {} periodic slot(s), {} programmed tick(s); renderer: {}; input poller: {}; idle policy: {}",
            self.current_engine_tick,
            self.current_simulation_tick,
            self.current_rendering_tick,
            self.current_input_tick,
            self.periodic_slots.len(),
            self.programmed.len(),
            match &self.renderer {
                Some(RendererSlot::Single(_)) => "single",
                Some(RendererSlot::Multimedia(_)) => "multimedia",
                None => "none",
            },
            if self.input_poller.is_some() { "yes" } else { "no" },
            if self.idle_callback.is_some() {
                "custom callback"
            } else {
                "atomic sleep"
            },
        )
    }
}
