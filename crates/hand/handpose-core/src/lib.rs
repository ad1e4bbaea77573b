//! Hand pose core (engine-agnostic)
//!
//! A fixed hand rig (palm, finger chains, optional thumb), a pose library of named
//! gestures, and a frame-driven scheduler that interpolates joint rotations from their
//! live values toward pose targets. Rendering and input are left to adapters
//! (`bevy_handpose`, `handpose-wasm`), which call [`HandController::dispatch_preset`] on
//! input and [`HandController::tick`] once per frame.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ids;
pub mod joint;
pub mod outputs;
pub mod pose;
pub mod presets;
pub mod rig;

// Re-exports for consumers (adapters)
pub use config::{ControllerConfig, RigConfig, ThumbConfig};
pub use controller::{HandController, RunReceipts};
pub use engine::{AnimationScheduler, Run, RunReceipt};
pub use error::{HandError, Result};
pub use ids::{AxisKey, JointId, RunId};
pub use joint::{Axis, AxisRange, Joint, JointRole};
pub use outputs::{Change, HandEvent, Outputs};
pub use pose::{Curl, Pose, PoseBuilder, TimedPose};
pub use presets::{resolve_preset, DelayedStage, Preset, PresetPlan, Stage};
pub use rig::{build_rig, FingerChain, Rig, ThumbChain};
