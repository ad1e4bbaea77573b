use bevy::prelude::*;
use handpose_core::JointId;

/// Marker on the entity the spawned hand hierarchy hangs from.
#[derive(Component, Debug, Default)]
pub struct HandRoot;

/// Links an entity to the rig joint whose rotation drives its Transform.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandJoint(pub JointId);

/// Box extents of the finger or thumb segment a joint carries, from the rig config.
/// Renderers size their meshes from this; the plugin itself spawns no meshes.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HandSegment {
    pub length: f32,
    pub width: f32,
}
