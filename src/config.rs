//! System configuration parameters.
//!
//! All tunable parameters for the regulator: task cadences, the safe
//! temperature band, readiness tolerances, and touch gesture
//! thresholds.  Values can be overridden by whatever configuration
//! layer the host firmware provides; the core only consumes the struct.
//!
//! Temperatures are tenths of a degree (×10) throughout — see
//! [`units`](crate::units).

use serde::{Deserialize, Serialize};

use crate::units::Deci;

/// Core regulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatorConfig {
    // --- Task cadences (milliseconds) ---
    /// Probe sampling / filter update interval.
    pub sensor_interval_ms: u32,
    /// Outer (solution → plate goal) control loop interval.
    pub outer_interval_ms: u32,
    /// Inner (plate → heater duty) control loop interval.
    pub inner_interval_ms: u32,
    /// Touch panel poll interval.
    pub touch_interval_ms: u32,
    /// PWM tick interval.  Base period = 256 ticks.
    pub pwm_tick_ms: u32,
    /// Screen refresh interval.
    pub screen_interval_ms: u32,

    // --- Touch interaction timing (milliseconds) ---
    /// Hard limit on any single press interaction (forced liveness).
    pub press_timeout_ms: u32,
    /// Re-poll spacing while a tap is held.
    pub tap_poll_ms: u32,
    /// Re-poll spacing while the goal dial is dragged.
    pub drag_poll_ms: u32,
    /// Settle delay between finger-down and the tag read.
    pub tag_settle_ms: u32,

    // --- Temperatures (×10) ---
    /// Lowest displayable plate reading; filter output is pegged here.
    pub plate_floor: Deci,
    /// Lowest displayable solution reading; also the goal-range low end.
    pub solution_floor: Deci,
    /// Width of the selectable solution-goal range above the floor.
    pub goal_span: Deci,
    /// Ceiling for the outer stage's plate-goal output (safe band).
    pub plate_goal_max: Deci,
    /// Plate goal at power-on, before the outer loop first runs.
    pub initial_plate_goal: Deci,
    /// Solution goal at power-on.
    pub initial_solution_goal: Deci,
    /// Solution within this many tenths below goal counts as ready.
    pub ready_band: Deci,
    /// Solution this many tenths above goal raises the over-temp alert.
    pub overtemp_band: Deci,

    // --- Touch gesture thresholds (raw panel units) ---
    /// Minimum horizontal displacement for a swipe.
    pub swipe_min_dx: u16,
    /// Minimum vertical displacement for a swipe.
    pub swipe_min_dy: u16,

    // --- Data logging ---
    /// Control cycles logged to the store after each activation.
    pub log_sample_limit: u16,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            // Cadences
            sensor_interval_ms: 5000,
            outer_interval_ms: 16000,
            inner_interval_ms: 5000,
            touch_interval_ms: 15,
            pwm_tick_ms: 16, // base period 256 * 16 = 4096 ms
            screen_interval_ms: 50,

            // Touch timing
            press_timeout_ms: 4000,
            tap_poll_ms: 50,
            drag_poll_ms: 30,
            tag_settle_ms: 15,

            // Temperatures
            plate_floor: Deci::new(100),        // 10.0 C
            solution_floor: Deci::new(200),     // 20.0 C
            goal_span: Deci::new(200),          // dial selects 20.0-40.0 C
            plate_goal_max: Deci::new(600),     // 60.0 C
            initial_plate_goal: Deci::new(450), // 45.0 C
            initial_solution_goal: Deci::new(375), // 37.5 C
            ready_band: Deci::new(5),           // 0.5 C
            overtemp_band: Deci::new(10),       // 1.0 C

            // Gestures
            swipe_min_dx: 0x200,
            swipe_min_dy: 0x100,

            // Logging
            log_sample_limit: 1000,
        }
    }
}

impl RegulatorConfig {
    /// Upper end of the selectable solution-goal range.
    pub fn goal_max(&self) -> Deci {
        Deci::new(self.solution_floor.raw() + self.goal_span.raw())
    }
}
