//! Pose library: named hand-pose presets resolved against a rig.
//!
//! Every preset resolves to an immediate [`Stage`] and, for the two-stage gesture, a
//! [`DelayedStage`] whose delay counts from the moment the preset is issued. A stage's
//! `primary` pose drives fingers and thumb; its optional `secondary` pose drives the palm
//! as an independently timed run.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HandError, Result};
use crate::pose::{Curl, Pose, PoseBuilder, TimedPose};
use crate::rig::Rig;

pub const DEFAULT_DURATION_MS: f64 = 500.0;
pub const SLOW_DURATION_MS: f64 = 8000.0;

const ALIEN_YAW: f32 = 3.04;
const ALIEN_PITCH: f32 = -0.67;
const ALIEN_PALM_TURN_MS: f64 = 1000.0;
const ALIEN_DELAY_MS: f64 = 1200.0;
const ALIEN_POINT_MS: f64 = 2000.0;

/// Stage-B finger curls of the alien point, index finger first. Fingers beyond this
/// table reuse the last row.
const ALIEN_POINT_CURLS: [Curl; 4] = [
    Curl::new(0.3, 0.47, 0.24),
    Curl::new(0.64, 0.88, 0.61),
    Curl::new(1.05, 0.82, 0.66),
    Curl::new(1.05, FRAC_PI_2, 1.4),
];

/// Named presets exposed to the input layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Open,
    Fist,
    Peace,
    Rock,
    MiddleFinger,
    SlowMiddleFinger,
    AlienPoint,
    Reset,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::Open,
        Preset::Fist,
        Preset::Peace,
        Preset::Rock,
        Preset::MiddleFinger,
        Preset::SlowMiddleFinger,
        Preset::AlienPoint,
        Preset::Reset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Open => "open",
            Preset::Fist => "fist",
            Preset::Peace => "peace",
            Preset::Rock => "rock",
            Preset::MiddleFinger => "middle-finger",
            Preset::SlowMiddleFinger => "slow-middle-finger",
            Preset::AlienPoint => "alien-point",
            Preset::Reset => "reset",
        }
    }

    /// Case-insensitive lookup; `_` and spaces are read as `-`.
    pub fn parse(name: &str) -> Result<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| HandError::UnknownPreset {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::parse(s)
    }
}

/// Runs issued together.
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub primary: TimedPose,
    /// Palm reorientation, run independently of `primary`.
    pub secondary: Option<TimedPose>,
}

/// A stage started `delay_ms` after the preset was issued.
#[derive(Clone, Debug, PartialEq)]
pub struct DelayedStage {
    pub delay_ms: f64,
    pub stage: Stage,
}

/// Everything needed to play one preset.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetPlan {
    pub preset: Preset,
    pub immediate: Stage,
    pub delayed: Option<DelayedStage>,
}

/// Resolve a trigger name into a plan for `rig`.
pub fn resolve_preset(rig: &Rig, name: &str) -> Result<PresetPlan> {
    Ok(plan(rig, Preset::parse(name)?))
}

fn hand_pose(
    rig: &Rig,
    name: &str,
    curl_for: impl Fn(usize) -> Curl,
    (thumb_base, thumb_tip): (f32, f32),
) -> Pose {
    PoseBuilder::new(rig, name)
        .fingers(curl_for)
        .thumb(thumb_base, thumb_tip)
        .build()
}

fn single(pose: Pose, duration_ms: f64) -> Stage {
    Stage {
        primary: TimedPose::new(pose, duration_ms),
        secondary: None,
    }
}

fn open_or_closed(open: bool) -> Curl {
    if open {
        Curl::OPEN
    } else {
        Curl::CLOSED
    }
}

/// Build the plan of a known preset for `rig`.
pub fn plan(rig: &Rig, preset: Preset) -> PresetPlan {
    let name = preset.name();
    let immediate_only = |immediate| PresetPlan {
        preset,
        immediate,
        delayed: None,
    };

    match preset {
        Preset::Open => immediate_only(single(
            hand_pose(rig, name, |_| Curl::OPEN, (0.0, 0.0)),
            DEFAULT_DURATION_MS,
        )),
        Preset::Fist => immediate_only(single(
            hand_pose(rig, name, |_| Curl::CLOSED, (0.0, -1.35)),
            DEFAULT_DURATION_MS,
        )),
        Preset::Peace => immediate_only(single(
            hand_pose(rig, name, |i| open_or_closed(i < 2), (-0.3, -1.3)),
            DEFAULT_DURATION_MS,
        )),
        Preset::Rock => immediate_only(single(
            hand_pose(rig, name, |i| open_or_closed(i == 0 || i == 3), (0.0, 0.0)),
            DEFAULT_DURATION_MS,
        )),
        Preset::MiddleFinger => immediate_only(single(
            hand_pose(rig, name, |i| open_or_closed(i == 1), (0.0, 0.0)),
            DEFAULT_DURATION_MS,
        )),
        Preset::SlowMiddleFinger => immediate_only(single(
            hand_pose(rig, name, |i| open_or_closed(i == 1), (0.0, 0.0)),
            SLOW_DURATION_MS,
        )),
        Preset::AlienPoint => {
            let turn = PoseBuilder::new(rig, name).palm_yaw(ALIEN_YAW).build();
            let point = PoseBuilder::new(rig, name)
                .fingers(|i| ALIEN_POINT_CURLS[i.min(ALIEN_POINT_CURLS.len() - 1)])
                .thumb(-0.41, -1.14)
                .build();
            let tilt = PoseBuilder::new(rig, name)
                .palm_pitch(ALIEN_PITCH)
                .palm_yaw(ALIEN_YAW)
                .build();
            PresetPlan {
                preset,
                immediate: Stage {
                    primary: TimedPose::new(
                        hand_pose(rig, name, |_| Curl::OPEN, (0.0, 0.0)),
                        DEFAULT_DURATION_MS,
                    ),
                    secondary: Some(TimedPose::new(turn, ALIEN_PALM_TURN_MS)),
                },
                delayed: Some(DelayedStage {
                    delay_ms: ALIEN_DELAY_MS,
                    stage: Stage {
                        primary: TimedPose::new(point, ALIEN_POINT_MS),
                        secondary: Some(TimedPose::new(tilt, ALIEN_POINT_MS)),
                    },
                }),
            }
        }
        Preset::Reset => {
            let joints = PoseBuilder::new(rig, name).all_joints(0.0).build();
            let palm = PoseBuilder::new(rig, name)
                .palm_pitch(0.0)
                .palm_yaw(0.0)
                .build();
            PresetPlan {
                preset,
                immediate: Stage {
                    primary: TimedPose::new(joints, DEFAULT_DURATION_MS),
                    secondary: Some(TimedPose::new(palm, DEFAULT_DURATION_MS)),
                },
                delayed: None,
            }
        }
    }
}
