//! Bevy adapter for the hand pose core.
//!
//! Input arrives as [`PresetRequest`] events (sent by the keyboard system or by app code),
//! the controller is ticked once per `Update` against [`HandClock`], and joint rotations
//! are copied onto the entities spawned by [`spawn_hand_rig`].

use bevy::prelude::*;
use handpose_core::{ControllerConfig, HandController, HandError, HandEvent};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{HandJoint, HandRoot, HandSegment};
pub use resources::{ClockMode, HandClock, HandKeyBindings, HandOutputs, HandPoseController};
pub use systems::spawn_hand_rig;

/// Request to play a preset by name at the current clock time.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PresetRequest(pub String);

/// A [`PresetRequest`] that did not resolve to a preset.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PresetRejected {
    pub name: String,
    pub error: HandError,
}

/// Core scheduler events, forwarded after each tick.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HandPoseEvent(pub HandEvent);

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandPoseSet {
    Input,
    Dispatch,
    Clock,
    Tick,
    Apply,
}

pub struct HandPosePlugin {
    pub config: ControllerConfig,
    pub clock: ClockMode,
}

impl Default for HandPosePlugin {
    fn default() -> Self {
        Self {
            config: ControllerConfig::default(),
            clock: ClockMode::Driven,
        }
    }
}

impl HandPosePlugin {
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }
}

impl Plugin for HandPosePlugin {
    fn build(&self, app: &mut App) {
        let controller = match HandController::new(self.config.clone()) {
            Ok(controller) => controller,
            Err(e) => {
                tracing::error!("hand pose plugin not installed: {e}");
                return;
            }
        };

        app.insert_resource(HandPoseController(controller))
            .insert_resource(HandClock::new(self.clock))
            .init_resource::<HandKeyBindings>()
            .init_resource::<HandOutputs>()
            .add_event::<PresetRequest>()
            .add_event::<PresetRejected>()
            .add_event::<HandPoseEvent>()
            .configure_sets(
                Update,
                (
                    HandPoseSet::Input,
                    HandPoseSet::Dispatch,
                    HandPoseSet::Clock,
                    HandPoseSet::Tick,
                    HandPoseSet::Apply,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_hand_rig)
            .add_systems(
                Update,
                (
                    systems::keyboard_input_system.in_set(HandPoseSet::Input),
                    systems::dispatch_requests_system.in_set(HandPoseSet::Dispatch),
                    systems::advance_clock_system.in_set(HandPoseSet::Clock),
                    systems::tick_controller_system.in_set(HandPoseSet::Tick),
                    systems::apply_transforms_system.in_set(HandPoseSet::Apply),
                ),
            );
    }
}
