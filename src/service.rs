//! The regulator service — the cooperative real-time loop.
//!
//! [`Regulator`] owns the device state, both sensor filters, the
//! cascade chain, the PWM generator, and the touch machine, plus one
//! [`TaskTimer`] per periodic task.  The host runtime calls
//! [`poll`](Regulator::poll) repeatedly; each call is a single
//! non-blocking scheduler pass:
//!
//! ```text
//!  clock ──▶ poll ─┬─ sensor task   (5 s)   filters + readiness
//!                  ├─ outer task    (16 s)  solution PID → plate goal
//!                  ├─ inner task    (5 s)   plate PID → duty + log
//!                  ├─ PWM task      (16 ms) heater output
//!                  ├─ touch task    (15 ms) gesture machine
//!                  └─ screen task   (50 ms) redraw
//! ```
//!
//! All I/O flows through port traits passed in at the call site
//! (`hw` satisfies every driven port at once — one mutable borrow,
//! explicit boundary), so the whole service runs against mocks in
//! tests.  The only intentional stall is alert-tone playback, which
//! blocks on the audio device's completion signal.

use log::{info, warn};

use crate::config::RegulatorConfig;
use crate::control::{CascadeChain, ReadinessMonitor};
use crate::filter::SmoothingFilter;
use crate::ports::{
    AudioPort, CalibrationPort, Controller, DisplayPort, LogStore, OutputPort, Probe, ProbePort,
    Tone, TouchPanel,
};
use crate::pwm::SoftPwm;
use crate::scheduler::TaskTimer;
use crate::state::DeviceState;
use crate::touch::{TouchAction, TouchInput};

/// The application service orchestrating the regulation loop.
pub struct Regulator {
    config: RegulatorConfig,
    state: DeviceState,

    plate_filter: SmoothingFilter,
    solution_filter: SmoothingFilter,
    chain: CascadeChain,
    readiness: ReadinessMonitor,
    pwm: SoftPwm,
    touch: TouchInput,

    sensor_timer: TaskTimer,
    outer_timer: TaskTimer,
    inner_timer: TaskTimer,
    pwm_timer: TaskTimer,
    touch_timer: TaskTimer,
    screen_timer: TaskTimer,
}

impl Regulator {
    pub fn new(config: RegulatorConfig) -> Self {
        Self {
            state: DeviceState::new(&config),
            plate_filter: SmoothingFilter::new(config.plate_floor),
            solution_filter: SmoothingFilter::new(config.solution_floor),
            chain: CascadeChain::new(&config),
            readiness: ReadinessMonitor::new(),
            pwm: SoftPwm::new(),
            touch: TouchInput::new(&config),
            sensor_timer: TaskTimer::new(config.sensor_interval_ms),
            outer_timer: TaskTimer::new(config.outer_interval_ms),
            inner_timer: TaskTimer::new(config.inner_interval_ms),
            pwm_timer: TaskTimer::new(config.pwm_tick_ms),
            touch_timer: TaskTimer::new(config.touch_interval_ms),
            screen_timer: TaskTimer::new(config.screen_interval_ms),
            config,
        }
    }

    /// Shared device record (render-side view).
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn config(&self) -> &RegulatorConfig {
        &self.config
    }

    /// Current PWM duty threshold (for diagnostics/tests).
    pub fn duty(&self) -> u8 {
        self.pwm.duty()
    }

    /// One-time startup: seed the filters from unfiltered probe reads,
    /// constrain the outer stage to the safe band, draw the first frame.
    ///
    /// The first read per probe is a throwaway that triggers a fresh
    /// conversion; the probes need roughly a second after power-on
    /// before conversions are trustworthy, and the host owns that wait.
    pub fn start(
        &mut self,
        hw: &mut (impl ProbePort + DisplayPort),
        outer: &mut impl Controller,
    ) {
        let _ = hw.read_probe(Probe::Plate);
        let _ = hw.read_probe(Probe::Solution);

        self.plate_filter.seed(hw.read_probe(Probe::Plate));
        self.solution_filter.seed(hw.read_probe(Probe::Solution));
        self.state.set_plate_temp(self.plate_filter.value());
        self.state.set_solution_temp(self.solution_filter.value());

        outer.set_output_range(
            self.state.solution_goal.raw(),
            self.config.plate_goal_max.raw(),
        );

        info!(
            "regulator: start, plate {} solution {} goal {}",
            self.state.plate_text, self.state.solution_text, self.state.goal_text
        );
        hw.redraw(&self.state);
    }

    /// One scheduler pass.  Non-blocking except for alert playback,
    /// which is bounded by the audio device's completion signal.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ProbePort
                  + OutputPort
                  + DisplayPort
                  + TouchPanel
                  + AudioPort
                  + LogStore
                  + CalibrationPort),
        outer: &mut impl Controller,
        inner: &mut impl Controller,
    ) {
        if self.sensor_timer.due(now_ms) {
            self.sensor_task(hw);
        }

        // Control stages run only while activated.  Gating before the
        // timer check leaves the timers expired during deactivation,
        // so the stages fire on the first pass after re-activation.
        if self.state.activated && self.outer_timer.due(now_ms) {
            self.chain.outer_step(&mut self.state, outer, &self.config);
        }

        if self.state.activated && self.inner_timer.due(now_ms) {
            let duty = self.chain.inner_step(&self.state, inner, hw);
            self.pwm.set_duty(duty);
        }

        if self.state.activated && self.pwm_timer.due(now_ms) {
            self.pwm.tick(&mut self.state, hw);
        }

        if self.touch_timer.due(now_ms) {
            if let Some(action) = self.touch.poll(now_ms, hw) {
                self.apply_touch(action, hw, outer, inner);
            }
        }

        if self.screen_timer.due(now_ms) {
            hw.redraw(&self.state);
        }
    }

    // ── Tasks ─────────────────────────────────────────────────

    fn sensor_task(&mut self, hw: &mut (impl ProbePort + AudioPort)) {
        let plate = self.plate_filter.update(hw.read_probe(Probe::Plate));
        self.state.set_plate_temp(plate);

        let solution = self.solution_filter.update(hw.read_probe(Probe::Solution));
        self.state.set_solution_temp(solution);

        if let Some(tone) = self.readiness.evaluate(&mut self.state, &self.config) {
            play_blocking(hw, tone);
        }
    }

    fn apply_touch(
        &mut self,
        action: TouchAction,
        hw: &mut (impl OutputPort + DisplayPort + CalibrationPort),
        outer: &mut impl Controller,
        inner: &mut impl Controller,
    ) {
        match action {
            TouchAction::ToggleActivation => {
                if self.state.activated {
                    self.state.activated = false;
                    // Same-pass shutdown: duty and pin die right here,
                    // not on the next control cycle.
                    self.pwm.force_off(&mut self.state, hw);
                    info!("regulator: deactivated, heater off");
                } else {
                    self.chain.rearm(outer, inner);
                    self.state.activated = true;
                    info!("regulator: activated");
                }
            }

            TouchAction::DialChanged(goal) => {
                self.state.set_solution_goal(goal, &self.config);
                outer.set_output_range(
                    self.state.solution_goal.raw(),
                    self.config.plate_goal_max.raw(),
                );
                // The dial must follow the finger, so the drag forces
                // redraws ahead of the screen task's own cadence.
                hw.redraw(&self.state);
            }

            TouchAction::Redraw => hw.redraw(&self.state),

            TouchAction::Calibrate => {
                // Calibration pattern needs the natural orientation.
                hw.set_rotation(false);
                match hw.run_manual() {
                    Ok(transform) => {
                        if let Err(e) = hw.persist(&transform) {
                            warn!("regulator: calibration persist failed: {e}");
                        }
                    }
                    Err(e) => warn!("regulator: calibration failed: {e}"),
                }
                hw.set_rotation(true);
            }
        }
    }
}

/// Play a tone and hold until the device reports completion — an
/// intentional, hardware-bounded stall.
fn play_blocking(audio: &mut impl AudioPort, tone: Tone) {
    audio.play(tone);
    while audio.is_playing() {
        core::hint::spin_loop();
    }
}
