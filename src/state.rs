//! Shared device state threaded through every component.
//!
//! `DeviceState` is the single record that the filter, control chain,
//! PWM generator, and touch machine mutate and the display renderer
//! reads.  Everything runs on one thread, so there is no locking —
//! component boundaries are kept by convention instead:
//!
//! - `heater_on` is written only by the PWM generator.
//! - `activated` is written only by the touch machine's tap action
//!   (applied in the service).
//! - `ready` and its label are derived each sensor cycle.
//!
//! The formatted text fields are caches: regenerated whenever the
//! underlying numeric value changes so the renderer never formats.

use crate::config::RegulatorConfig;
use crate::units::{Deci, DisplayText};

/// Status label shown in the readiness indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyLabel {
    #[default]
    NotReady,
    Ready,
    OverTemp,
}

impl ReadyLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotReady => "UNREADY",
            Self::Ready => "READY",
            Self::OverTemp => "OVER TEMP",
        }
    }
}

/// The shared device record.
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Filtered plate temperature (×10).
    pub plate_temp: Deci,
    /// Heater setpoint produced by the outer control stage (×10).
    pub plate_goal: Deci,
    /// Filtered solution temperature (×10).
    pub solution_temp: Deci,
    /// Operator-selected solution target (×10).
    pub solution_goal: Deci,

    /// Physical heater output state.  Written only by the PWM generator.
    pub heater_on: bool,
    /// Whether the control chain is enabled.  Toggled only by the
    /// activate/deactivate tap action.
    pub activated: bool,
    /// Solution is inside the readiness band.
    pub ready: bool,
    /// Readiness indicator label.
    pub ready_label: ReadyLabel,

    /// Display-text caches for the numeric fields.
    pub plate_text: DisplayText,
    pub solution_text: DisplayText,
    pub goal_text: DisplayText,
}

impl DeviceState {
    pub fn new(config: &RegulatorConfig) -> Self {
        let mut s = Self {
            plate_temp: config.plate_floor,
            plate_goal: config.initial_plate_goal,
            solution_temp: config.solution_floor,
            solution_goal: config.initial_solution_goal,
            heater_on: false,
            activated: false,
            ready: false,
            ready_label: ReadyLabel::NotReady,
            plate_text: DisplayText::new(),
            solution_text: DisplayText::new(),
            goal_text: DisplayText::new(),
        };
        s.plate_text = s.plate_temp.format();
        s.solution_text = s.solution_temp.format();
        s.goal_text = s.solution_goal.format();
        s
    }

    /// Label for the activation button, derived from `activated`.
    pub const fn button_label(&self) -> &'static str {
        if self.activated { "Deactivate" } else { "Activate" }
    }

    /// Store a filtered plate reading and refresh its text cache.
    pub fn set_plate_temp(&mut self, value: Deci) {
        self.plate_temp = value;
        self.plate_text = value.format();
    }

    /// Store a filtered solution reading and refresh its text cache.
    pub fn set_solution_temp(&mut self, value: Deci) {
        self.solution_temp = value;
        self.solution_text = value.format();
    }

    /// Apply an operator goal selection, clamped to the dial range.
    pub fn set_solution_goal(&mut self, value: Deci, config: &RegulatorConfig) {
        self.solution_goal = value.clamp(config.solution_floor, config.goal_max());
        self.goal_text = self.solution_goal.format();
    }

    /// Apply an outer-stage demand, clamped into the safe band.  The
    /// low end tracks the solution goal so the plate never targets
    /// below the solution it is meant to warm.
    pub fn set_plate_goal(&mut self, value: Deci, config: &RegulatorConfig) {
        self.plate_goal = value.clamp(self.solution_goal, config.plate_goal_max);
    }

    /// Set the readiness flags in one place.
    pub fn set_readiness(&mut self, label: ReadyLabel) {
        self.ready_label = label;
        self.ready = matches!(label, ReadyLabel::Ready);
    }
}
