//! Software PWM generator for the heater output.
//!
//! A free-running 8-bit counter advances once per PWM tick.  At
//! wraparound (start of a new base period) the output asserts; once the
//! counter reaches the duty threshold it deasserts.  With a 16 ms tick
//! the base period is 256 × 16 ms ≈ 4.1 s, giving 256 duty levels.
//!
//! ## Single-writer invariant
//!
//! The heater pin and `DeviceState.heater_on` are written from this
//! module only — [`tick`](SoftPwm::tick) during normal operation and
//! [`force_off`](SoftPwm::force_off) when the chain deactivates.  No
//! other component may touch the output.

use crate::ports::OutputPort;
use crate::state::DeviceState;

/// The software PWM channel driving the heater.
#[derive(Debug, Clone, Copy)]
pub struct SoftPwm {
    /// Position within the current base period.  Wraps at 256.
    count: u8,
    /// On-time threshold for the current period (0–255).
    duty: u8,
}

impl Default for SoftPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftPwm {
    pub fn new() -> Self {
        Self { count: 0, duty: 0 }
    }

    /// Set the duty threshold.  Takes effect within the current period.
    pub fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Advance one PWM tick and drive the output.
    ///
    /// Called only while the chain is activated; the counter freezes
    /// otherwise, with the output already forced off.
    pub fn tick(&mut self, state: &mut DeviceState, out: &mut impl OutputPort) {
        self.count = self.count.wrapping_add(1);

        if self.count == 0 {
            // Start of a new base period — the heater tries to turn on.
            state.heater_on = true;
            out.set_heater(true);
        }

        if self.count >= self.duty {
            state.heater_on = false;
            out.set_heater(false);
        }
    }

    /// Zero the duty and drive the output off immediately.  Used on
    /// deactivation so the heater dies in the same scheduler pass.
    pub fn force_off(&mut self, state: &mut DeviceState, out: &mut impl OutputPort) {
        self.duty = 0;
        state.heater_on = false;
        out.set_heater(false);
    }
}
