//! Touch-input state machine.
//!
//! Classifies the raw touch stream into discrete commands: a tap on
//! the activation button, a drag on the goal dial, or a diagonal swipe
//! that triggers panel recalibration.
//!
//! ```text
//!              finger down                    settle elapsed, tag?
//!  IDLE ───────────────────────▶ SETTLE ──┬─[activate]─▶ TAP_HOLD ──┐
//!    ▲                                    ├─[dial]─────▶ DIAL_DRAG ─┤
//!    │                                    └─[none/other]▶ TRACKING  │
//!    │  finger up: swipe check ◀──────────────────────────┘         │
//!    └──────────────── release or press timeout ────────────────────┘
//! ```
//!
//! Each wait step is one state advanced by the scheduler's touch
//! poll, so the machine is a non-blocking participant of the
//! cooperative loop while keeping fixed re-poll spacing and a hard
//! press-timeout bound.  A stuck panel that reports a tag forever is
//! therefore still bounded: the timeout exits the interaction
//! unconditionally.

use log::{debug, info};

use crate::config::RegulatorConfig;
use crate::ports::{TouchPanel, TouchPoint};
use crate::units::Deci;

/// Tag of the activate/deactivate button.
pub const TAG_ACTIVATE: u8 = 1;
/// Tag of the solution-goal dial.
pub const TAG_GOAL_DIAL: u8 = 11;

/// Commands the machine emits for the service to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// The activation button was pressed.
    ToggleActivation,
    /// The goal dial moved; carries the mapped goal temperature.
    DialChanged(Deci),
    /// A drag poll ran without a valid tracker fix; the screen still
    /// needs a refresh so the dial follows the finger.
    Redraw,
    /// A qualifying swipe completed; run the calibration sequence.
    Calibrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TouchState {
    /// No finger, nothing pending.
    Idle,
    /// Finger just landed; waiting out the settle delay before the tag
    /// register holds a fresh sample (the raw read consumed the last one).
    SettleWait { until_ms: u64, at: TouchPoint },
    /// Finger down on no recognized control; candidate swipe.
    TrackingCandidateGesture { first: TouchPoint, last: TouchPoint },
    /// Activation tap committed; holding until release or timeout.
    TapActionInProgress { deadline_ms: u64, next_poll_ms: u64 },
    /// Dial drag committed; updating the goal until release or timeout.
    DialDragInProgress { deadline_ms: u64, next_poll_ms: u64 },
}

/// The touch-input state machine.  Owns the gesture session state
/// exclusively; nothing here is shared with other components.
pub struct TouchInput {
    state: TouchState,
    press_timeout_ms: u64,
    tap_poll_ms: u64,
    drag_poll_ms: u64,
    settle_ms: u64,
    swipe_min_dx: u16,
    swipe_min_dy: u16,
    /// Dial mapping: goal = base + value * span / 65536.
    goal_base: i32,
    goal_span: i32,
}

impl TouchInput {
    pub fn new(config: &RegulatorConfig) -> Self {
        Self {
            state: TouchState::Idle,
            press_timeout_ms: u64::from(config.press_timeout_ms),
            tap_poll_ms: u64::from(config.tap_poll_ms),
            drag_poll_ms: u64::from(config.drag_poll_ms),
            settle_ms: u64::from(config.tag_settle_ms),
            swipe_min_dx: config.swipe_min_dx,
            swipe_min_dy: config.swipe_min_dy,
            goal_base: config.solution_floor.raw(),
            goal_span: config.goal_span.raw(),
        }
    }

    /// True while a tap or drag interaction holds the input focus.
    pub fn interaction_active(&self) -> bool {
        matches!(
            self.state,
            TouchState::TapActionInProgress { .. } | TouchState::DialDragInProgress { .. }
        )
    }

    /// Advance the machine by one touch poll.
    ///
    /// Call at the touch task cadence with the current monotonic time.
    /// Returns at most one action for the service to apply.
    pub fn poll<P: TouchPanel>(&mut self, now_ms: u64, panel: &mut P) -> Option<TouchAction> {
        match self.state {
            TouchState::Idle => {
                if let Some(at) = panel.raw_sample() {
                    self.state = TouchState::SettleWait {
                        until_ms: now_ms + self.settle_ms,
                        at,
                    };
                }
                // Finger up with nothing pending: no-op.
                None
            }

            TouchState::SettleWait { until_ms, at } => {
                if now_ms < until_ms {
                    return None;
                }
                let tag = panel.tag();
                debug!("touch: tag {tag} after settle");
                match tag {
                    TAG_ACTIVATE => {
                        self.state = TouchState::TapActionInProgress {
                            deadline_ms: now_ms + self.press_timeout_ms,
                            next_poll_ms: now_ms + self.tap_poll_ms,
                        };
                        Some(TouchAction::ToggleActivation)
                    }
                    TAG_GOAL_DIAL => {
                        self.state = TouchState::DialDragInProgress {
                            deadline_ms: now_ms + self.press_timeout_ms,
                            next_poll_ms: now_ms + self.drag_poll_ms,
                        };
                        None
                    }
                    // No tag, or a reserved/unrecognized value (255
                    // included): begin swipe-candidate tracking.
                    _ => {
                        self.state = TouchState::TrackingCandidateGesture {
                            first: at,
                            last: at,
                        };
                        None
                    }
                }
            }

            TouchState::TrackingCandidateGesture { first, last } => {
                match panel.raw_sample() {
                    Some(pt) => {
                        self.state = TouchState::TrackingCandidateGesture { first, last: pt };
                        None
                    }
                    None => {
                        // Finger lifted: evaluate the displacement now,
                        // never mid-gesture.
                        self.state = TouchState::Idle;
                        if self.is_swipe(first, last) {
                            info!(
                                "touch: swipe ({},{}) -> ({},{}), recalibrating",
                                first.x, first.y, last.x, last.y
                            );
                            Some(TouchAction::Calibrate)
                        } else {
                            None
                        }
                    }
                }
            }

            TouchState::TapActionInProgress {
                deadline_ms,
                next_poll_ms,
            } => {
                if now_ms >= deadline_ms {
                    // Forced liveness: a stuck tag cannot hold the
                    // interaction past the press timeout.
                    debug!("touch: tap press timeout");
                    self.state = TouchState::Idle;
                    return None;
                }
                if now_ms < next_poll_ms {
                    return None;
                }
                if panel.tag() == 0 {
                    self.state = TouchState::Idle;
                } else {
                    self.state = TouchState::TapActionInProgress {
                        deadline_ms,
                        next_poll_ms: now_ms + self.tap_poll_ms,
                    };
                }
                None
            }

            TouchState::DialDragInProgress {
                deadline_ms,
                next_poll_ms,
            } => {
                if now_ms >= deadline_ms {
                    debug!("touch: drag press timeout");
                    self.state = TouchState::Idle;
                    return None;
                }
                if now_ms < next_poll_ms {
                    return None;
                }

                let tracker = panel.tracker();
                let action = if tracker.tag == TAG_GOAL_DIAL {
                    let goal =
                        self.goal_base + (i32::from(tracker.value) * self.goal_span) / 65536;
                    Some(TouchAction::DialChanged(Deci::new(goal)))
                } else {
                    Some(TouchAction::Redraw)
                };

                if panel.tag() == 0 {
                    self.state = TouchState::Idle;
                } else {
                    self.state = TouchState::DialDragInProgress {
                        deadline_ms,
                        next_poll_ms: now_ms + self.drag_poll_ms,
                    };
                }
                action
            }
        }
    }

    /// Swipe requires a large displacement on **both** axes.
    fn is_swipe(&self, first: TouchPoint, last: TouchPoint) -> bool {
        let dx = first.x.abs_diff(last.x);
        let dy = first.y.abs_diff(last.y);
        dx > self.swipe_min_dx && dy > self.swipe_min_dy
    }
}
