//! Unified error types for the regulator core.
//!
//! Follows embedded best practice: a single `Error` enum that every
//! collaborator port can convert into, keeping the control loop's error
//! handling uniform.  All variants are `Copy` so they can be passed
//! around without allocation.
//!
//! Note that the control path itself never propagates errors across a
//! component boundary — sensor-floor violations are clamped, ambiguous
//! touch tags fall back to gesture tracking, and stuck inputs are
//! resolved by timeout.  Only the storage-flavoured ports (sample log,
//! calibration persistence) surface typed errors, and the core
//! tolerates those with a log line and keeps scheduling.

use core::fmt;

/// Every fallible port operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sample log store rejected an append.
    Storage(StorageError),
    /// The touch calibration sequence failed.
    Calibration(CalibrationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Calibration(e) => write!(f, "calibration: {e}"),
        }
    }
}

/// Errors from the sample log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Backing medium not present or not mounted.
    NotReady,
    /// Storage medium is full.
    Full,
    /// Generic I/O failure from the backend.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "store not ready"),
            Self::Full => write!(f, "store full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Errors from the manual touch calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The operator never completed the on-screen calibration taps.
    Aborted,
    /// The resulting transform could not be written to flash.
    PersistFailed,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted => write!(f, "aborted by operator"),
            Self::PersistFailed => write!(f, "persist failed"),
        }
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
