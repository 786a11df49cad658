//! End-to-end scenarios: the full scheduler loop driven against mock
//! hardware, millisecond by millisecond.

use thermobath::config::RegulatorConfig;
use thermobath::ports::{
    AudioPort, CalibrationPort, Controller, DisplayPort, LogStore, OutputPort, Probe, ProbePort,
    Tone, TouchPanel, TouchPoint, TouchTransform, TrackerReading,
};
use thermobath::service::Regulator;
use thermobath::touch::{TAG_ACTIVATE, TAG_GOAL_DIAL};
use thermobath::units::Deci;
use thermobath::{CalibrationError, StorageError};

// ───────────────────────────────────────────────────────────────
// Mock hardware implementing every driven port
// ───────────────────────────────────────────────────────────────

struct MockHw {
    plate_raw: i32,
    solution_raw: i32,

    pin: bool,
    pin_high_seen: bool,

    redraws: usize,
    rotations: Vec<bool>,

    sample: Option<TouchPoint>,
    tag: u8,
    tracker: TrackerReading,

    tones: Vec<Tone>,
    log: Vec<u8>,

    calibrations: usize,
    persisted: usize,
}

impl MockHw {
    fn new(plate_raw: i32, solution_raw: i32) -> Self {
        Self {
            plate_raw,
            solution_raw,
            pin: false,
            pin_high_seen: false,
            redraws: 0,
            rotations: Vec::new(),
            sample: None,
            tag: 0,
            tracker: TrackerReading { tag: 0, value: 0 },
            tones: Vec::new(),
            log: Vec::new(),
            calibrations: 0,
            persisted: 0,
        }
    }
}

impl ProbePort for MockHw {
    fn read_probe(&mut self, probe: Probe) -> i32 {
        match probe {
            Probe::Plate => self.plate_raw,
            Probe::Solution => self.solution_raw,
        }
    }
}

impl OutputPort for MockHw {
    fn set_heater(&mut self, on: bool) {
        self.pin = on;
        if on {
            self.pin_high_seen = true;
        }
    }
}

impl DisplayPort for MockHw {
    fn redraw(&mut self, _state: &thermobath::state::DeviceState) {
        self.redraws += 1;
    }

    fn set_rotation(&mut self, rotated: bool) {
        self.rotations.push(rotated);
    }
}

impl TouchPanel for MockHw {
    fn raw_sample(&mut self) -> Option<TouchPoint> {
        self.sample
    }

    fn tag(&mut self) -> u8 {
        self.tag
    }

    fn tracker(&mut self) -> TrackerReading {
        self.tracker
    }
}

impl AudioPort for MockHw {
    fn play(&mut self, tone: Tone) {
        self.tones.push(tone);
    }

    fn is_playing(&self) -> bool {
        false // completion is immediate in simulation
    }
}

impl LogStore for MockHw {
    fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.log.extend_from_slice(bytes);
        Ok(())
    }
}

impl CalibrationPort for MockHw {
    fn run_manual(&mut self) -> Result<TouchTransform, CalibrationError> {
        self.calibrations += 1;
        Ok(TouchTransform {
            coeff: [0x10000, 0, 0, 0, 0x10000, 0],
        })
    }

    fn persist(&mut self, _transform: &TouchTransform) -> Result<(), CalibrationError> {
        self.persisted += 1;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Scripted controller (the opaque PID stepper stand-in)
// ───────────────────────────────────────────────────────────────

struct ScriptController {
    output: i32,
    range: Option<(i32, i32)>,
    resets: usize,
}

impl ScriptController {
    fn new(output: i32) -> Self {
        Self {
            output,
            range: None,
            resets: 0,
        }
    }
}

impl Controller for ScriptController {
    fn step(&mut self, _goal: Deci, _measured: Deci) -> i32 {
        self.output
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn set_output_range(&mut self, low: i32, high: i32) {
        self.range = Some((low, high));
    }
}

// ───────────────────────────────────────────────────────────────
// Harness
// ───────────────────────────────────────────────────────────────

struct Rig {
    reg: Regulator,
    hw: MockHw,
    outer: ScriptController,
    inner: ScriptController,
    now: u64,
}

impl Rig {
    fn new(plate_raw: i32, solution_raw: i32) -> Self {
        let mut rig = Self {
            reg: Regulator::new(RegulatorConfig::default()),
            hw: MockHw::new(plate_raw, solution_raw),
            outer: ScriptController::new(450),
            inner: ScriptController::new(0),
            now: 0,
        };
        rig.reg.start(&mut rig.hw, &mut rig.outer);
        rig
    }

    /// Advance simulated time, polling once per millisecond.
    fn run(&mut self, dur_ms: u64) {
        let end = self.now + dur_ms;
        while self.now < end {
            self.now += 1;
            self.reg
                .poll(self.now, &mut self.hw, &mut self.outer, &mut self.inner);
        }
    }

    /// A full press-and-release on a tagged control.
    fn press(&mut self, tag: u8) {
        self.hw.tag = tag;
        self.hw.sample = Some(TouchPoint { x: 10, y: 10 });
        self.run(80); // finger-down + settle + dispatch
        self.hw.tag = 0;
        self.hw.sample = None;
        self.run(80); // release observed by the re-poll
    }
}

// ───────────────────────────────────────────────────────────────
// Scenarios
// ───────────────────────────────────────────────────────────────

#[test]
fn startup_seeds_filters_and_draws() {
    let rig = Rig::new(100, 200);
    // Raw half-degree counts promote ×5 onto the display scale.
    assert_eq!(rig.reg.state().plate_temp, Deci::new(500));
    assert_eq!(rig.reg.state().solution_temp, Deci::new(1000));
    assert_eq!(rig.reg.state().plate_text.as_str(), "50.0");
    assert!(rig.hw.redraws >= 1);
    assert_eq!(rig.outer.range, Some((375, 600)));
}

#[test]
fn filtered_values_hold_floor_and_steady_state() {
    let mut rig = Rig::new(60, 70); // 30.0 / 35.0 C steady
    rig.run(60_000); // a dozen sensor cycles
    assert_eq!(rig.reg.state().plate_temp, Deci::new(300));
    assert_eq!(rig.reg.state().solution_temp, Deci::new(350));

    // Probes glitch to zero: gauges peg at their floors, no lower.
    rig.hw.plate_raw = 0;
    rig.hw.solution_raw = 0;
    rig.run(300_000);
    assert_eq!(rig.reg.state().plate_temp, Deci::new(100));
    assert_eq!(rig.reg.state().solution_temp, Deci::new(200));
}

#[test]
fn activation_starts_the_chain_and_pwm() {
    let mut rig = Rig::new(60, 70);
    rig.inner.output = 200;
    assert!(!rig.reg.state().activated);

    rig.press(TAG_ACTIVATE);
    assert!(rig.reg.state().activated);
    // Re-arm cleared both controllers.
    assert_eq!(rig.outer.resets, 1);
    assert_eq!(rig.inner.resets, 1);

    // One full PWM base period (256 × 16 ms) brings the first wraparound.
    rig.run(4200);
    assert_eq!(rig.reg.duty(), 200);
    assert!(rig.hw.pin_high_seen);
    // Sample log collected one CSV pair per inner cycle.
    assert!(!rig.hw.log.is_empty());
    let text = core::str::from_utf8(&rig.hw.log).unwrap();
    assert!(text.lines().all(|l| l == "300,350"));
}

#[test]
fn deactivation_kills_heater_in_the_same_pass() {
    let mut rig = Rig::new(60, 70);
    rig.inner.output = 255;
    rig.press(TAG_ACTIVATE);
    rig.run(4200);
    assert!(rig.hw.pin_high_seen);

    // Second physical press toggles off.  Walk millisecond by
    // millisecond: the poll that flips `activated` must leave the
    // heater already dead — no window where the output lingers.
    rig.hw.tag = TAG_ACTIVATE;
    rig.hw.sample = Some(TouchPoint { x: 10, y: 10 });
    let mut budget = 200;
    while rig.reg.state().activated {
        assert!(budget > 0, "toggle never dispatched");
        budget -= 1;
        rig.run(1);
    }
    assert!(!rig.reg.state().heater_on);
    assert!(!rig.hw.pin);
    assert_eq!(rig.reg.duty(), 0);
}

#[test]
fn second_activation_reopens_the_log_window() {
    let mut rig = Rig::new(60, 70);
    rig.press(TAG_ACTIVATE);
    rig.run(11_000);
    let first_len = rig.hw.log.len();
    assert!(first_len > 0);

    rig.press(TAG_ACTIVATE); // off
    rig.press(TAG_ACTIVATE); // on again — counter reset
    assert_eq!(rig.inner.resets, 2);
    rig.run(11_000);
    assert!(rig.hw.log.len() > first_len);
}

#[test]
fn dial_drag_maps_goal_and_retargets_outer_stage() {
    let mut rig = Rig::new(60, 70);
    rig.hw.tag = TAG_GOAL_DIAL;
    rig.hw.tracker = TrackerReading {
        tag: TAG_GOAL_DIAL,
        value: 32768,
    };
    rig.hw.sample = Some(TouchPoint { x: 400, y: 200 });
    let redraws_before = rig.hw.redraws;
    rig.run(200);

    assert_eq!(rig.reg.state().solution_goal, Deci::new(300));
    assert_eq!(rig.reg.state().goal_text.as_str(), "30.0");
    assert_eq!(rig.outer.range, Some((300, 600)));
    // Drag forces redraws ahead of the screen task cadence.
    assert!(rig.hw.redraws > redraws_before);

    rig.hw.tag = 0;
    rig.hw.sample = None;
    rig.run(100);

    // Full-scale drag stays inside the dial range.
    rig.hw.tag = TAG_GOAL_DIAL;
    rig.hw.tracker.value = 65535;
    rig.hw.sample = Some(TouchPoint { x: 400, y: 200 });
    rig.run(200);
    assert_eq!(rig.reg.state().solution_goal, Deci::new(399));
}

#[test]
fn swipe_runs_exactly_one_calibration_sequence() {
    let mut rig = Rig::new(60, 70);
    rig.hw.sample = Some(TouchPoint { x: 100, y: 100 });
    rig.run(40);
    rig.hw.sample = Some(TouchPoint { x: 700, y: 500 });
    rig.run(40);
    rig.hw.sample = None;
    rig.run(40);

    assert_eq!(rig.hw.calibrations, 1);
    assert_eq!(rig.hw.persisted, 1);
    // Natural orientation for the pattern, then restored.
    assert_eq!(rig.hw.rotations, vec![false, true]);
}

#[test]
fn one_axis_swipe_is_ignored() {
    let mut rig = Rig::new(60, 70);
    rig.hw.sample = Some(TouchPoint { x: 100, y: 100 });
    rig.run(40);
    rig.hw.sample = Some(TouchPoint { x: 900, y: 120 });
    rig.run(40);
    rig.hw.sample = None;
    rig.run(40);
    assert_eq!(rig.hw.calibrations, 0);
}

#[test]
fn readiness_tones_fire_once_per_transition() {
    // Solution seeded right at the goal: first sensor cycle is READY.
    let mut rig = Rig::new(60, 75);
    rig.run(30_000);
    assert_eq!(rig.hw.tones, vec![Tone::Ready]);
    assert!(rig.reg.state().ready);

    // Drift upwards past the over-temperature band: one more tone.
    rig.hw.solution_raw = 78; // steady state 390 > 375 + 10
    rig.run(120_000);
    assert_eq!(rig.hw.tones, vec![Tone::Ready, Tone::OverTemp]);
    assert!(!rig.reg.state().ready);
    assert_eq!(rig.reg.state().ready_label.as_str(), "OVER TEMP");
}

#[test]
fn screen_refresh_runs_while_idle() {
    let mut rig = Rig::new(60, 70);
    let before = rig.hw.redraws;
    rig.run(1000);
    // 50 ms cadence — about twenty refreshes in a second.
    assert!(rig.hw.redraws - before >= 15);
}
