//! Joint model: a named rig node holding a local rotation per animatable axis.
//!
//! A joint only stores its own local values. Composing parent rotation and offset into a
//! world transform is left to the renderer; `parent` is kept for ordering and tooling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HandError, Result};
use crate::ids::JointId;

/// Local rotation axis (Euler XYZ).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive [min, max] limit of one animated axis, in radians.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    /// `min` must not exceed `max`.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Symmetric range around zero.
    pub const fn symmetric(limit: f32) -> Self {
        Self::new(-limit, limit)
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Anatomical role of a joint; decides which axes animate and their limits.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum JointRole {
    Palm,
    FingerGroup,
    FingerBase,
    FingerMiddle,
    FingerTip,
    ThumbPalm,
    ThumbBase,
    ThumbTip,
}

/// One node of the hand rig.
#[derive(Clone, Debug)]
pub struct Joint {
    id: JointId,
    path: String,
    role: JointRole,
    parent: Option<JointId>,
    offset: [f32; 3],
    rest_rotation: [f32; 3],
    limits: [Option<AxisRange>; 3],
    rotation: [f32; 3],
}

impl Joint {
    pub(crate) fn new(
        id: JointId,
        path: String,
        role: JointRole,
        parent: Option<JointId>,
        offset: [f32; 3],
    ) -> Self {
        Self {
            id,
            path,
            role,
            parent,
            offset,
            rest_rotation: [0.0; 3],
            limits: [None; 3],
            rotation: [0.0; 3],
        }
    }

    pub(crate) fn with_axis(mut self, axis: Axis, range: AxisRange) -> Self {
        self.limits[axis.index()] = Some(range);
        self.rotation[axis.index()] = range.clamp(0.0);
        self
    }

    pub(crate) fn with_rest_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rest_rotation = rotation;
        self
    }

    #[inline]
    pub fn id(&self) -> JointId {
        self.id
    }

    /// Stable path within the rig, e.g. `finger[2].tip`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn role(&self) -> JointRole {
        self.role
    }

    #[inline]
    pub fn parent(&self) -> Option<JointId> {
        self.parent
    }

    /// Static translation relative to the parent.
    #[inline]
    pub fn offset(&self) -> [f32; 3] {
        self.offset
    }

    #[inline]
    pub fn animates(&self, axis: Axis) -> bool {
        self.limits[axis.index()].is_some()
    }

    /// Axes this joint animates, in x, y, z order.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|a| self.animates(*a))
    }

    pub fn get_range(&self, axis: Axis) -> Result<AxisRange> {
        self.limits[axis.index()].ok_or_else(|| self.invalid_axis(axis))
    }

    pub fn get_rotation(&self, axis: Axis) -> Result<f32> {
        self.get_range(axis)?;
        Ok(self.rotation[axis.index()])
    }

    /// Store a new value for one axis, clamped to its range. Returns the stored value.
    pub fn set_rotation(&mut self, axis: Axis, value: f32) -> Result<f32> {
        let range = self.get_range(axis)?;
        if !value.is_finite() {
            return Err(HandError::NonFiniteRotation {
                joint: self.path.clone(),
                axis,
                value,
            });
        }
        let clamped = range.clamp(value);
        self.rotation[axis.index()] = clamped;
        Ok(clamped)
    }

    /// Full local Euler XYZ rotation: static rest rotation plus animated values.
    pub fn euler(&self) -> [f32; 3] {
        [
            self.rest_rotation[0] + self.rotation[0],
            self.rest_rotation[1] + self.rotation[1],
            self.rest_rotation[2] + self.rotation[2],
        ]
    }

    fn invalid_axis(&self, axis: Axis) -> HandError {
        HandError::InvalidAxis {
            joint: self.path.clone(),
            axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn curl_joint() -> Joint {
        Joint::new(
            JointId(3),
            "finger[0].middle".into(),
            JointRole::FingerMiddle,
            Some(JointId(2)),
            [0.0, 0.8, 0.0],
        )
        .with_axis(Axis::X, AxisRange::new(0.0, FRAC_PI_2))
    }

    #[test]
    fn set_rotation_clamps_into_range() {
        let mut j = curl_joint();
        assert_eq!(j.set_rotation(Axis::X, 3.0).unwrap(), FRAC_PI_2);
        assert_eq!(j.get_rotation(Axis::X).unwrap(), FRAC_PI_2);
        assert_eq!(j.set_rotation(Axis::X, -1.0).unwrap(), 0.0);
    }

    #[test]
    fn unsupported_axis_is_rejected_without_mutation() {
        let mut j = curl_joint();
        j.set_rotation(Axis::X, 0.5).unwrap();
        let err = j.set_rotation(Axis::Z, 0.1).unwrap_err();
        assert!(matches!(err, HandError::InvalidAxis { axis: Axis::Z, .. }));
        assert!(j.get_rotation(Axis::Y).is_err());
        assert_eq!(j.euler(), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn non_finite_values_never_stored() {
        let mut j = curl_joint();
        assert!(j.set_rotation(Axis::X, f32::NAN).is_err());
        assert!(j.set_rotation(Axis::X, f32::INFINITY).is_err());
        assert_eq!(j.get_rotation(Axis::X).unwrap(), 0.0);
    }

    #[test]
    fn initial_value_lies_inside_negative_only_range() {
        let j = Joint::new(
            JointId(0),
            "thumb.tip".into(),
            JointRole::ThumbTip,
            None,
            [0.0; 3],
        )
        .with_axis(Axis::X, AxisRange::new(-FRAC_PI_2, -0.1));
        assert_eq!(j.get_rotation(Axis::X).unwrap(), -0.1);
        assert_eq!(j.axes().collect::<Vec<_>>(), vec![Axis::X]);
    }
}
