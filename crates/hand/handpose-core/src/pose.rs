//! Poses: named target assignments over some or all animatable axes.

use std::f32::consts::FRAC_PI_2;

use indexmap::IndexMap;

use crate::ids::AxisKey;
use crate::rig::{Rig, PALM_PITCH, PALM_YAW};

/// Target values keyed by axis. Axes not listed keep their current value when the pose
/// is played. Insertion order is preserved; setting an axis twice keeps the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    name: String,
    targets: IndexMap<AxisKey, f32>,
}

impl Pose {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: IndexMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn with(mut self, key: AxisKey, value: f32) -> Self {
        self.set(key, value);
        self
    }

    #[inline]
    pub fn set(&mut self, key: AxisKey, value: f32) {
        self.targets.insert(key, value);
    }

    #[inline]
    pub fn get(&self, key: AxisKey) -> Option<f32> {
        self.targets.get(&key).copied()
    }

    #[inline]
    pub fn contains(&self, key: AxisKey) -> bool {
        self.targets.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisKey, f32)> + '_ {
        self.targets.iter().map(|(k, v)| (*k, *v))
    }
}

/// Per-finger curl triple (base, middle, tip) in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Curl {
    pub base: f32,
    pub middle: f32,
    pub tip: f32,
}

impl Curl {
    pub const OPEN: Curl = Curl::new(0.0, 0.0, 0.0);
    pub const CLOSED: Curl = Curl::new(1.05, FRAC_PI_2, FRAC_PI_2);

    pub const fn new(base: f32, middle: f32, tip: f32) -> Self {
        Self { base, middle, tip }
    }
}

/// Builds poses against a concrete rig. Thumb targets are skipped on rigs without a thumb.
pub struct PoseBuilder<'r> {
    rig: &'r Rig,
    pose: Pose,
}

impl<'r> PoseBuilder<'r> {
    pub fn new(rig: &'r Rig, name: impl Into<String>) -> Self {
        Self {
            rig,
            pose: Pose::new(name),
        }
    }

    pub fn finger(mut self, index: usize, curl: Curl) -> Self {
        if let Some(f) = self.rig.finger(index) {
            use crate::joint::Axis::X;
            self.pose.set(AxisKey::new(f.base, X), curl.base);
            self.pose.set(AxisKey::new(f.middle, X), curl.middle);
            self.pose.set(AxisKey::new(f.tip, X), curl.tip);
        }
        self
    }

    /// Curl every finger by index.
    pub fn fingers(mut self, curl_for: impl Fn(usize) -> Curl) -> Self {
        for i in 0..self.rig.finger_count() {
            self = self.finger(i, curl_for(i));
        }
        self
    }

    pub fn thumb(mut self, base: f32, tip: f32) -> Self {
        if let Some(t) = self.rig.thumb() {
            use crate::joint::Axis::X;
            self.pose.set(AxisKey::new(t.base, X), base);
            self.pose.set(AxisKey::new(t.tip, X), tip);
        }
        self
    }

    pub fn palm_yaw(mut self, yaw: f32) -> Self {
        self.pose.set(AxisKey::new(self.rig.palm(), PALM_YAW), yaw);
        self
    }

    pub fn palm_pitch(mut self, pitch: f32) -> Self {
        self.pose.set(AxisKey::new(self.rig.palm(), PALM_PITCH), pitch);
        self
    }

    /// Target every animatable axis except the palm's.
    pub fn all_joints(mut self, value: f32) -> Self {
        let palm = self.rig.palm();
        for key in self.rig.axes().into_iter().filter(|k| k.joint != palm) {
            self.pose.set(key, value);
        }
        self
    }

    pub fn build(self) -> Pose {
        self.pose
    }
}

/// A pose together with how long it takes to reach it.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedPose {
    pub pose: Pose,
    pub duration_ms: f64,
}

impl TimedPose {
    pub fn new(pose: Pose, duration_ms: f64) -> Self {
        Self { pose, duration_ms }
    }
}
