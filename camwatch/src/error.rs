//! # Core error taxonomy

use thiserror::Error;

/// Errors raised by the capture and detection core.
///
/// Only [`MonitorError::DeviceUnavailable`] and [`MonitorError::DeviceLost`] are fatal to the
/// monitor loop. Everything else is absorbed by skipping the current cycle.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("camera device {index} is not available")]
    DeviceUnavailable { index: usize },

    #[error("capture returned no data")]
    CaptureEmpty,

    #[error("camera device lost: {0}")]
    DeviceLost(String),

    #[error("frame is {found:?}, reference is {expected:?}")]
    ResolutionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl MonitorError {
    /// Whether the monitor loop must stop on this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceUnavailable { .. } | Self::DeviceLost(_))
    }
}
