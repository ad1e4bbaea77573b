//! Rig and controller configuration.

use serde::{Deserialize, Serialize};

use crate::error::{HandError, Result};

/// Static pivot of the thumb-palm sub-part, relative to the palm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThumbConfig {
    pub offset: [f32; 3],
    /// Euler XYZ rotation of the thumb palm; never animated.
    pub rotation: [f32; 3],
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            offset: [-1.05, -0.2, 0.1],
            rotation: [0.0, 0.0, 0.9],
        }
    }
}

/// Geometry and topology of one hand rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Number of finger chains, 4 or 5.
    pub finger_count: usize,
    pub segment_length: f32,
    pub segment_width: f32,
    /// Distance between neighbouring finger groups along the palm's x axis.
    pub finger_spacing: f32,
    /// Adds side-to-side (z) rotation to every finger base.
    pub knuckles: bool,
    /// Symmetric limit of the whole-finger spread (group z) in radians.
    pub spread_limit: f32,
    pub thumb: Option<ThumbConfig>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            finger_count: 4,
            segment_length: 0.8,
            segment_width: 0.15,
            finger_spacing: 0.4,
            knuckles: true,
            spread_limit: 0.02,
            thumb: Some(ThumbConfig::default()),
        }
    }
}

impl RigConfig {
    /// Five plain finger chains and no thumb sub-part.
    pub fn five_finger() -> Self {
        Self {
            finger_count: 5,
            knuckles: false,
            thumb: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(4..=5).contains(&self.finger_count) {
            return Err(HandError::config(format!(
                "finger_count must be 4 or 5, got {}",
                self.finger_count
            )));
        }
        let dims = [
            ("segment_length", self.segment_length),
            ("segment_width", self.segment_width),
            ("finger_spacing", self.finger_spacing),
        ];
        for (name, v) in dims {
            if !v.is_finite() || v <= 0.0 {
                return Err(HandError::config(format!(
                    "{name} must be positive and finite, got {v}"
                )));
            }
        }
        if !self.spread_limit.is_finite() || self.spread_limit < 0.0 {
            return Err(HandError::config(format!(
                "spread_limit must be non-negative and finite, got {}",
                self.spread_limit
            )));
        }
        if let Some(thumb) = &self.thumb {
            let all_finite = thumb
                .offset
                .iter()
                .chain(thumb.rotation.iter())
                .all(|v| v.is_finite());
            if !all_finite {
                return Err(HandError::config("thumb offset/rotation must be finite"));
            }
        }
        Ok(())
    }
}

/// Configuration for a [`HandController`](crate::HandController).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub rig: RigConfig,
    /// Drop queued (delayed) preset stages when another preset is dispatched.
    pub cancel_pending_on_dispatch: bool,
    /// Maximum events retained per tick; older events are dropped first.
    pub max_events_per_tick: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            rig: RigConfig::default(),
            cancel_pending_on_dispatch: false,
            max_events_per_tick: 256,
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| HandError::config(format!("config parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_events_per_tick == 0 {
            return Err(HandError::config("max_events_per_tick must be greater than 0"));
        }
        self.rig.validate()
    }
}
