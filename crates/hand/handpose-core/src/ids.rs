//! Identifiers and simple allocators for rig joints and interpolation runs.

use serde::{Deserialize, Serialize};

use crate::joint::Axis;

/// Dense index of a joint inside its rig.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct JointId(pub u32);

impl JointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of one in-flight interpolation run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RunId(pub u32);

/// One animatable scalar: a single axis of a single joint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AxisKey {
    pub joint: JointId,
    pub axis: Axis,
}

impl AxisKey {
    #[inline]
    pub const fn new(joint: JointId, axis: Axis) -> Self {
        Self { joint, axis }
    }
}

/// Monotonic allocator for RunId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_run: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_run(&mut self) -> RunId {
        let id = RunId(self.next_run);
        self.next_run = self.next_run.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_run(), RunId(0));
        assert_eq!(alloc.alloc_run(), RunId(1));
    }

    #[test]
    fn axis_keys_order_by_joint_then_axis() {
        let a = AxisKey::new(JointId(1), Axis::Z);
        let b = AxisKey::new(JointId(2), Axis::X);
        let c = AxisKey::new(JointId(2), Axis::Y);
        assert!(a < b);
        assert!(b < c);
    }
}
