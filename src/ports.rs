//! Port traits — the boundary between the regulator core and hardware.
//!
//! ```text
//!   ProbePort ──▶ ┌─────────────────────────┐ ──▶ OutputPort
//!  TouchPanel ──▶ │        Regulator        │ ──▶ DisplayPort
//!                 │ filter · cascade · PWM  │ ──▶ AudioPort
//!  Controller ◀──▶│       touch FSM         │ ──▶ LogStore
//!                 └─────────────────────────┘ ──▶ CalibrationPort
//! ```
//!
//! Driven adapters (display coprocessor, one-wire probes, PID library,
//! flash store) implement these traits.  The [`Regulator`] consumes
//! them via generics, so the core never touches hardware directly and
//! every test runs against mocks.
//!
//! [`Regulator`]: crate::service::Regulator

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, StorageError};
use crate::state::DeviceState;
use crate::units::Deci;

// ───────────────────────────────────────────────────────────────
// Probe port (driven adapter: hardware → core)
// ───────────────────────────────────────────────────────────────

/// The two temperature probes on the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Probe bonded to the heater plate.
    Plate,
    /// Probe immersed in the solution vessel.
    Solution,
}

/// Read-side port for the temperature probes.
pub trait ProbePort {
    /// Return the latest conversion for `probe` in raw half-degree
    /// counts (×2 Celsius) and trigger the next conversion.
    ///
    /// The count scale matters: the smoothing filter adds the raw value
    /// directly into its ×10 accumulator, using the ×2/×10 ratio as the
    /// implicit 1/5 averaging weight.
    fn read_probe(&mut self, probe: Probe) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Controller port (the opaque PID stepper)
// ───────────────────────────────────────────────────────────────

/// One feedback-control stage.  The cascade owns two of these: the
/// outer stage maps solution error to a plate-goal demand, the inner
/// stage maps plate error to a heater duty (0–255).
///
/// The numerical implementation lives behind this trait on purpose —
/// the core only sequences and clamps it.
pub trait Controller {
    /// Advance the loop one step and return the next output value.
    fn step(&mut self, goal: Deci, measured: Deci) -> i32;

    /// Discard accumulated state (integral wind-up, history).
    fn reset(&mut self);

    /// Constrain the output to `[low, high]`.
    fn set_output_range(&mut self, low: i32, high: i32);
}

// ───────────────────────────────────────────────────────────────
// Output port (core → heater pin)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the heater control pin.
///
/// Only the PWM generator calls this — see the single-writer invariant
/// in [`pwm`](crate::pwm).
pub trait OutputPort {
    fn set_heater(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (core → renderer)
// ───────────────────────────────────────────────────────────────

/// The display-command renderer.  `redraw` is idempotent and
/// non-blocking from the core's perspective.
pub trait DisplayPort {
    /// Rebuild the main screen from the current device state.
    fn redraw(&mut self, state: &DeviceState);

    /// Rotate the panel.  `rotated = false` restores the natural
    /// orientation required while the calibration pattern is shown.
    fn set_rotation(&mut self, rotated: bool);
}

// ───────────────────────────────────────────────────────────────
// Touch panel port (hardware → core)
// ───────────────────────────────────────────────────────────────

/// A raw touch coordinate pair from the panel controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// One read of the panel's drag tracker register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerReading {
    /// Tag of the control under the finger (0 = none).
    pub tag: u8,
    /// Tracked position, full-scale 0–65535 across the control.
    pub value: u16,
}

/// Read-side port for the touch controller.
pub trait TouchPanel {
    /// Raw panel sample; `None` means no finger detected.
    fn raw_sample(&mut self) -> Option<TouchPoint>;

    /// Tag of the touched UI control, 0 when nothing tagged is touched.
    /// The panel reserves some values (notably 255) for "no valid tag".
    fn tag(&mut self) -> u8;

    /// Current drag-tracker state for dial interactions.
    fn tracker(&mut self) -> TrackerReading;
}

// ───────────────────────────────────────────────────────────────
// Audio port (core → tone generator)
// ───────────────────────────────────────────────────────────────

/// Alert tones the readiness monitor can play.  The codes are the
/// synthesizer register values for the built-in instrument set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Xylophone C3 — solution has reached the goal band.
    Ready,
    /// Xylophone E3 — solution overshot the goal.
    OverTemp,
}

impl Tone {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ready => 0x4841,
            Self::OverTemp => 0x4845,
        }
    }
}

/// Tone generator with a device-reported completion signal.
pub trait AudioPort {
    /// Start playing `tone`.  Returns immediately.
    fn play(&mut self, tone: Tone);

    /// True while the device is still sounding the last tone.
    fn is_playing(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Log store port (core → persistent sample log)
// ───────────────────────────────────────────────────────────────

/// Append-only store for the activation sample log.
pub trait LogStore {
    /// Append raw bytes.  The core tolerates any error here — a
    /// missing card must never stall the control loop.
    fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Calibration port (core → touch calibration sequence)
// ───────────────────────────────────────────────────────────────

/// The 6-term affine transform produced by panel calibration, in the
/// touch controller's fixed-point matrix layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchTransform {
    pub coeff: [i32; 6],
}

/// Runs the interactive calibration pattern and persists the result.
pub trait CalibrationPort {
    /// Present the calibration pattern and collect the operator's taps.
    fn run_manual(&mut self) -> Result<TouchTransform, CalibrationError>;

    /// Write the transform to non-volatile storage.
    fn persist(&mut self, transform: &TouchTransform) -> Result<(), CalibrationError>;
}
