//! The fixed joint hierarchy of one hand.
//!
//! Layout (parent first):
//! - `palm` (x = pitch, y = yaw)
//! - per finger `i`: `finger[i].group` (z spread) → `finger[i].base` (x curl, optional z
//!   knuckle spread) → `finger[i].middle` (x) → `finger[i].tip` (x)
//! - optional thumb: `thumb.palm` (static pivot) → `thumb.base` (x) → `thumb.tip` (x)
//!
//! Topology and ranges are fixed at construction; only rotation values change afterwards.

use std::f32::consts::{FRAC_PI_2, PI};

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::config::RigConfig;
use crate::error::{HandError, Result};
use crate::ids::{AxisKey, JointId};
use crate::joint::{Axis, AxisRange, Joint, JointRole};

/// Finger curl limit shared by base, middle and tip joints.
pub const CURL_RANGE: AxisRange = AxisRange::new(0.0, FRAC_PI_2);
/// Thumb joints curl toward the palm, i.e. negative x.
pub const THUMB_CURL_RANGE: AxisRange = AxisRange::new(-FRAC_PI_2, 0.0);
pub const PALM_PITCH_RANGE: AxisRange = AxisRange::symmetric(FRAC_PI_2);
pub const PALM_YAW_RANGE: AxisRange = AxisRange::symmetric(PI);
pub const KNUCKLE_SPREAD_RANGE: AxisRange = AxisRange::symmetric(0.35);

/// Palm axis driven for pitch.
pub const PALM_PITCH: Axis = Axis::X;
/// Palm axis driven for yaw.
pub const PALM_YAW: Axis = Axis::Y;

/// Joint ids of one finger chain, root first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FingerChain {
    pub group: JointId,
    pub base: JointId,
    pub middle: JointId,
    pub tip: JointId,
}

/// Joint ids of the thumb sub-part, root first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThumbChain {
    pub palm: JointId,
    pub base: JointId,
    pub tip: JointId,
}

/// A fully built hand rig.
#[derive(Clone, Debug)]
pub struct Rig {
    config: RigConfig,
    joints: Vec<Joint>,
    by_path: HashMap<String, JointId>,
    palm: JointId,
    fingers: Vec<FingerChain>,
    thumb: Option<ThumbChain>,
}

/// Build a rig from a validated config. Deterministic: equal configs give equal rigs.
pub fn build_rig(config: &RigConfig) -> Result<Rig> {
    config.validate()?;
    let mut b = RigBuilder::default();
    let len = config.segment_length;

    let palm = b.push(
        Joint::new(
            b.next_id(),
            "palm".into(),
            JointRole::Palm,
            None,
            [0.0, -2.0, 0.0],
        )
        .with_axis(PALM_PITCH, PALM_PITCH_RANGE)
        .with_axis(PALM_YAW, PALM_YAW_RANGE),
    );

    let center = (config.finger_count as f32 - 1.0) / 2.0;
    let mut fingers = Vec::with_capacity(config.finger_count);
    for i in 0..config.finger_count {
        let x = (i as f32 - center) * config.finger_spacing;
        let group = b.push(
            Joint::new(
                b.next_id(),
                format!("finger[{i}].group"),
                JointRole::FingerGroup,
                Some(palm),
                [x, 0.0, 0.0],
            )
            .with_axis(Axis::Z, AxisRange::symmetric(config.spread_limit)),
        );
        let mut base_joint = Joint::new(
            b.next_id(),
            format!("finger[{i}].base"),
            JointRole::FingerBase,
            Some(group),
            [0.0, len, 0.0],
        )
        .with_axis(Axis::X, CURL_RANGE);
        if config.knuckles {
            base_joint = base_joint.with_axis(Axis::Z, KNUCKLE_SPREAD_RANGE);
        }
        let base = b.push(base_joint);
        let middle = b.push(
            Joint::new(
                b.next_id(),
                format!("finger[{i}].middle"),
                JointRole::FingerMiddle,
                Some(base),
                [0.0, len, 0.0],
            )
            .with_axis(Axis::X, CURL_RANGE),
        );
        let tip = b.push(
            Joint::new(
                b.next_id(),
                format!("finger[{i}].tip"),
                JointRole::FingerTip,
                Some(middle),
                [0.0, len, 0.0],
            )
            .with_axis(Axis::X, CURL_RANGE),
        );
        fingers.push(FingerChain {
            group,
            base,
            middle,
            tip,
        });
    }

    let thumb = config.thumb.map(|tc| {
        let thumb_palm = b.push(
            Joint::new(
                b.next_id(),
                "thumb.palm".into(),
                JointRole::ThumbPalm,
                Some(palm),
                tc.offset,
            )
            .with_rest_rotation(tc.rotation),
        );
        let base = b.push(
            Joint::new(
                b.next_id(),
                "thumb.base".into(),
                JointRole::ThumbBase,
                Some(thumb_palm),
                [0.0, len * 0.5, 0.0],
            )
            .with_axis(Axis::X, THUMB_CURL_RANGE),
        );
        let tip = b.push(
            Joint::new(
                b.next_id(),
                "thumb.tip".into(),
                JointRole::ThumbTip,
                Some(base),
                [0.0, len, 0.0],
            )
            .with_axis(Axis::X, THUMB_CURL_RANGE),
        );
        ThumbChain {
            palm: thumb_palm,
            base,
            tip,
        }
    });

    Ok(Rig {
        config: config.clone(),
        joints: b.joints,
        by_path: b.by_path,
        palm,
        fingers,
        thumb,
    })
}

#[derive(Default)]
struct RigBuilder {
    joints: Vec<Joint>,
    by_path: HashMap<String, JointId>,
}

impl RigBuilder {
    fn next_id(&self) -> JointId {
        JointId(self.joints.len() as u32)
    }

    fn push(&mut self, joint: Joint) -> JointId {
        let id = joint.id();
        self.by_path.insert(joint.path().to_string(), id);
        self.joints.push(joint);
        id
    }
}

impl Rig {
    pub fn new(config: &RigConfig) -> Result<Self> {
        build_rig(config)
    }

    #[inline]
    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// All joints in construction order (parents before children).
    #[inline]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    pub fn joint_by_path(&self, path: &str) -> Option<&Joint> {
        self.by_path.get(path).and_then(|id| self.joint(*id))
    }

    #[inline]
    pub fn palm(&self) -> JointId {
        self.palm
    }

    #[inline]
    pub fn fingers(&self) -> &[FingerChain] {
        &self.fingers
    }

    #[inline]
    pub fn finger(&self, index: usize) -> Option<&FingerChain> {
        self.fingers.get(index)
    }

    #[inline]
    pub fn finger_count(&self) -> usize {
        self.fingers.len()
    }

    #[inline]
    pub fn thumb(&self) -> Option<&ThumbChain> {
        self.thumb.as_ref()
    }

    /// Every animatable axis, in joint order then x, y, z.
    pub fn axes(&self) -> Vec<AxisKey> {
        self.joints
            .iter()
            .flat_map(|j| j.axes().map(move |a| AxisKey::new(j.id(), a)))
            .collect()
    }

    /// Canonical path of an axis, e.g. `finger[2].tip.x`.
    pub fn axis_path(&self, key: AxisKey) -> Option<String> {
        self.joint(key.joint)
            .map(|j| format!("{}.{}", j.path(), key.axis))
    }

    /// Resolve `"<joint path>.<axis>"` to a key. The axis must be animated by the joint.
    pub fn resolve_axis(&self, path: &str) -> Result<AxisKey> {
        let unknown = || HandError::UnknownJoint {
            path: path.to_string(),
        };
        let (joint_path, axis_name) = path.rsplit_once('.').ok_or_else(unknown)?;
        let axis = Axis::parse(axis_name).ok_or_else(unknown)?;
        let joint = self.joint_by_path(joint_path).ok_or_else(unknown)?;
        joint.get_range(axis)?;
        Ok(AxisKey::new(joint.id(), axis))
    }

    fn joint_for(&self, key: AxisKey) -> Result<&Joint> {
        self.joint(key.joint).ok_or_else(|| HandError::UnknownJoint {
            path: format!("#{}", key.joint.0),
        })
    }

    pub fn get_rotation(&self, key: AxisKey) -> Result<f32> {
        self.joint_for(key)?.get_rotation(key.axis)
    }

    pub fn get_range(&self, key: AxisKey) -> Result<AxisRange> {
        self.joint_for(key)?.get_range(key.axis)
    }

    /// Write one axis, clamped to its range. Returns the stored value.
    pub fn set_rotation(&mut self, key: AxisKey, value: f32) -> Result<f32> {
        let joint = self
            .joints
            .get_mut(key.joint.index())
            .ok_or_else(|| HandError::UnknownJoint {
                path: format!("#{}", key.joint.0),
            })?;
        joint.set_rotation(key.axis, value)
    }

    /// Current value of every animatable axis keyed by axis path.
    pub fn snapshot(&self) -> IndexMap<String, f32> {
        let mut out = IndexMap::new();
        for joint in &self.joints {
            for axis in joint.axes() {
                if let Ok(v) = joint.get_rotation(axis) {
                    out.insert(format!("{}.{}", joint.path(), axis), v);
                }
            }
        }
        out
    }
}
