//! Thermobath regulator application core.
//!
//! The control brain of a single-vessel, touch-screen solution heater:
//! two one-wire probes feed a cascaded control strategy driving a
//! software-PWM heater output, while a gesture state machine turns the
//! touch panel into the instrument's only input device.  Everything
//! hardware-specific — display coprocessor, probe bus, PID arithmetic,
//! flash storage — sits behind the port traits in [`ports`], so the
//! entire core runs and tests on the host.

#![deny(unused_must_use)]

pub mod config;
pub mod control;
pub mod filter;
pub mod ports;
pub mod pwm;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod touch;
pub mod units;

mod error;

pub use error::{CalibrationError, Error, Result, StorageError};
