//! Error types for the hand pose core.

use serde::{Deserialize, Serialize};

use crate::joint::Axis;

/// Errors surfaced by rig construction, manual posing and preset dispatch.
///
/// None of these are transient: every operation is synchronous and in-memory, so
/// callers should report the error instead of retrying.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HandError {
    /// Dispatch of a trigger name the pose library does not know
    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },

    /// The joint exists but does not animate this axis
    #[error("Joint '{joint}' does not animate axis {axis}")]
    InvalidAxis { joint: String, axis: Axis },

    /// No joint with this path exists in the rig
    #[error("Unknown joint: {path}")]
    UnknownJoint { path: String },

    /// NaN or infinite rotation value
    #[error("Non-finite rotation {value} for {joint}.{axis}")]
    NonFiniteRotation {
        joint: String,
        axis: Axis,
        value: f32,
    },

    /// NaN or infinite clock value passed to dispatch, start or tick
    #[error("Non-finite time {value} ms")]
    NonFiniteTime { value: f64 },

    /// Rejected rig or controller configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl HandError {
    /// Short label for log lines.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownPreset { .. } => "preset",
            Self::InvalidAxis { .. } | Self::UnknownJoint { .. } => "axis",
            Self::NonFiniteRotation { .. } => "value",
            Self::NonFiniteTime { .. } => "time",
            Self::InvalidConfig { .. } => "config",
        }
    }

    /// Reject a clock value that would leave a run without a finite start or end.
    pub(crate) fn check_time(now_ms: f64) -> Result<f64> {
        if now_ms.is_finite() {
            Ok(now_ms)
        } else {
            Err(Self::NonFiniteTime { value: now_ms })
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, HandError>;
