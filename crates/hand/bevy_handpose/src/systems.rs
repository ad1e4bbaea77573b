use bevy::prelude::*;
use tracing::{debug, trace, warn};

use crate::components::{HandJoint, HandRoot, HandSegment};
use crate::resources::{ClockMode, HandClock, HandKeyBindings, HandOutputs, HandPoseController};
use crate::{HandPoseEvent, PresetRejected, PresetRequest};
use handpose_core::{Joint, JointRole, RigConfig};

fn joint_transform(joint: &Joint) -> Transform {
    let [x, y, z] = joint.euler();
    Transform::from_translation(Vec3::from_array(joint.offset()))
        .with_rotation(Quat::from_euler(EulerRot::XYZ, x, y, z))
}

fn segment_for(joint: &Joint, config: &RigConfig) -> Option<HandSegment> {
    let length = match joint.role() {
        JointRole::FingerBase | JointRole::FingerMiddle | JointRole::FingerTip => {
            config.segment_length
        }
        JointRole::ThumbBase => config.segment_length * 0.5,
        JointRole::ThumbTip => config.segment_length,
        JointRole::Palm | JointRole::FingerGroup | JointRole::ThumbPalm => return None,
    };
    Some(HandSegment {
        length,
        width: config.segment_width,
    })
}

/// Spawns one entity per rig joint under a [`HandRoot`], named by joint path.
pub fn spawn_hand_rig(mut commands: Commands, ctl: Res<HandPoseController>) {
    let rig = ctl.0.rig();
    let root = commands
        .spawn((HandRoot, Name::new("hand"), TransformBundle::default()))
        .id();

    // Joints are stored parents first, so every parent entity exists before its children.
    let mut entities: Vec<Entity> = Vec::with_capacity(rig.joints().len());
    for joint in rig.joints() {
        let entity = commands
            .spawn((
                Name::new(joint.path().to_string()),
                HandJoint(joint.id()),
                TransformBundle::from_transform(joint_transform(joint)),
            ))
            .id();
        let parent = joint
            .parent()
            .and_then(|p| entities.get(p.index()).copied())
            .unwrap_or(root);
        if let Some(segment) = segment_for(joint, rig.config()) {
            commands.entity(entity).insert(segment);
        }
        commands.entity(parent).add_child(entity);
        entities.push(entity);
    }
    debug!("spawned hand rig with {} joints", entities.len());
}

/// Turns bound key presses into preset requests.
pub fn keyboard_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<HandKeyBindings>,
    mut requests: EventWriter<PresetRequest>,
) {
    let Some(keys) = keys else {
        return;
    };
    for key in keys.get_just_pressed() {
        if let Some(preset) = bindings.preset_for(*key) {
            requests.send(PresetRequest(preset.name().to_string()));
        }
    }
}

/// Dispatches queued preset requests at the current clock time.
pub fn dispatch_requests_system(
    mut requests: EventReader<PresetRequest>,
    mut ctl: ResMut<HandPoseController>,
    clock: Res<HandClock>,
    mut rejected: EventWriter<PresetRejected>,
) {
    for PresetRequest(name) in requests.read() {
        match ctl.0.dispatch_preset(name, clock.now_ms()) {
            Ok(receipts) => {
                debug!(
                    "preset {} started {} run(s) at {} ms",
                    receipts.preset,
                    receipts.immediate.len(),
                    clock.now_ms()
                );
            }
            Err(error) => {
                warn!("preset request '{}' rejected: {}", name, error);
                rejected.send(PresetRejected {
                    name: name.clone(),
                    error,
                });
            }
        }
    }
}

pub fn advance_clock_system(time: Res<Time>, mut clock: ResMut<HandClock>) {
    if clock.mode == ClockMode::Driven {
        clock.advance(time.delta_seconds_f64() * 1000.0);
    }
}

/// Advances the controller to the clock and republishes its outputs.
pub fn tick_controller_system(
    mut ctl: ResMut<HandPoseController>,
    clock: Res<HandClock>,
    mut outputs: ResMut<HandOutputs>,
    mut events: EventWriter<HandPoseEvent>,
) {
    let out = match ctl.0.tick(clock.now_ms()) {
        Ok(out) => out,
        Err(e) => {
            warn!("tick skipped: {e}");
            return;
        }
    };
    outputs.changes.clear();
    outputs.changes.extend(out.changes.iter().cloned());
    outputs.events.clear();
    outputs.events.extend(out.events.iter().cloned());
    if !out.changes.is_empty() {
        trace!(
            "tick at {} ms wrote {} axis value(s)",
            clock.now_ms(),
            out.changes.len()
        );
    }
    events.send_batch(out.events.iter().cloned().map(HandPoseEvent));
}

/// Copies joint rotations into Transforms whenever the controller changed.
pub fn apply_transforms_system(
    ctl: Res<HandPoseController>,
    mut joints: Query<(&HandJoint, &mut Transform)>,
) {
    if !ctl.is_changed() {
        return;
    }
    let rig = ctl.0.rig();
    for (HandJoint(id), mut tf) in joints.iter_mut() {
        if let Some(joint) = rig.joint(*id) {
            *tf = joint_transform(joint);
        }
    }
}
