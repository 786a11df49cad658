//! Cascaded control chain, readiness monitor, and sample logging.
//!
//! Two feedback stages, independently clocked:
//!
//! ```text
//!  solution goal ──▶ outer stage ──▶ plate goal ──▶ inner stage ──▶ duty
//!                    (every 16 s)                   (every 5 s)      0–255
//! ```
//!
//! The numerical steppers live behind the [`Controller`] port; the
//! chain sequences them, clamps their outputs into the safe band, and
//! runs only while the device is activated.
//!
//! Alongside the control stages the readiness monitor classifies the
//! solution error into UNREADY / READY / OVER TEMP and hands back an
//! alert tone exactly once per transition into an alerting band.

use core::fmt::Write as _;

use log::{debug, info};

use crate::config::RegulatorConfig;
use crate::ports::{Controller, LogStore, Tone};
use crate::state::{DeviceState, ReadyLabel};
use crate::units::Deci;

// ───────────────────────────────────────────────────────────────
// Cascade chain
// ───────────────────────────────────────────────────────────────

/// The two-stage cascade plus its activation sample log.
pub struct CascadeChain {
    /// Inner-stage cycles logged since the last activation.
    sample_count: u16,
    sample_limit: u16,
}

impl CascadeChain {
    pub fn new(config: &RegulatorConfig) -> Self {
        Self {
            sample_count: 0,
            sample_limit: config.log_sample_limit,
        }
    }

    /// Prepare for a fresh activation: clear wound-up controller state
    /// and restart the sample log window.
    pub fn rearm(&mut self, outer: &mut impl Controller, inner: &mut impl Controller) {
        outer.reset();
        inner.reset();
        self.sample_count = 0;
        info!("control: chain re-armed");
    }

    /// Outer stage: solution error → plate-goal demand, clamped into
    /// the safe band before it is applied.
    pub fn outer_step(
        &mut self,
        state: &mut DeviceState,
        outer: &mut impl Controller,
        config: &RegulatorConfig,
    ) {
        let demand = outer.step(state.solution_goal, state.solution_temp);
        state.set_plate_goal(Deci::new(demand), config);
    }

    /// Inner stage: plate error → heater duty (0–255).  Also appends
    /// one temperature pair to the sample log while the window is open.
    pub fn inner_step(
        &mut self,
        state: &DeviceState,
        inner: &mut impl Controller,
        store: &mut impl LogStore,
    ) -> u8 {
        let duty = inner.step(state.plate_goal, state.plate_temp).clamp(0, 255) as u8;
        self.log_sample(state, store);
        duty
    }

    /// Cycles logged since the last re-arm (for tests/diagnostics).
    pub fn sample_count(&self) -> u16 {
        self.sample_count
    }

    fn log_sample(&mut self, state: &DeviceState, store: &mut impl LogStore) {
        if self.sample_count >= self.sample_limit {
            return; // window exhausted until the next activation
        }
        self.sample_count += 1;

        let mut line: heapless::String<24> = heapless::String::new();
        if writeln!(
            line,
            "{},{}",
            state.plate_temp.raw(),
            state.solution_temp.raw()
        )
        .is_err()
        {
            return;
        }
        // A missing or full store must never stall the control loop.
        if let Err(e) = store.append(line.as_bytes()) {
            debug!("control: sample log append failed: {e}");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Readiness monitor
// ───────────────────────────────────────────────────────────────

/// Classifies the solution error band and emits one tone per
/// transition into READY or OVER TEMP.
pub struct ReadinessMonitor {
    last: ReadyLabel,
}

impl Default for ReadinessMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessMonitor {
    pub fn new() -> Self {
        Self {
            last: ReadyLabel::NotReady,
        }
    }

    /// Evaluate the band, update the displayed label, and return the
    /// alert tone to play if the band just changed to an alerting one.
    pub fn evaluate(
        &mut self,
        state: &mut DeviceState,
        config: &RegulatorConfig,
    ) -> Option<Tone> {
        let goal = state.solution_goal.raw();
        let temp = state.solution_temp.raw();

        let label = if temp >= goal - config.ready_band.raw() {
            if temp > goal + config.overtemp_band.raw() {
                ReadyLabel::OverTemp
            } else {
                ReadyLabel::Ready
            }
        } else {
            ReadyLabel::NotReady
        };

        state.set_readiness(label);

        let tone = if label != self.last {
            match label {
                ReadyLabel::Ready => {
                    info!("control: solution ready at {}", state.solution_text);
                    Some(Tone::Ready)
                }
                ReadyLabel::OverTemp => {
                    info!("control: solution over temperature");
                    Some(Tone::OverTemp)
                }
                ReadyLabel::NotReady => None,
            }
        } else {
            None
        };
        self.last = label;
        tone
    }
}
