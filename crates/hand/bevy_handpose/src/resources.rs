use bevy::prelude::*;
use handpose_core::{Change, HandController, HandEvent, Preset};

/// The controller shared by input, clock and apply systems.
#[derive(Resource)]
pub struct HandPoseController(pub HandController);

/// How [`HandClock`] advances.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClockMode {
    /// Follows Bevy's `Time` delta every frame.
    #[default]
    Driven,
    /// Only moves when set explicitly; used for deterministic tests and replays.
    Manual,
}

/// Monotonic animation clock in milliseconds.
#[derive(Resource, Debug, Default, Clone)]
pub struct HandClock {
    pub mode: ClockMode,
    now_ms: f64,
}

impl HandClock {
    pub fn new(mode: ClockMode) -> Self {
        Self { mode, now_ms: 0.0 }
    }

    pub fn manual(now_ms: f64) -> Self {
        Self {
            mode: ClockMode::Manual,
            now_ms,
        }
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Jump to `now_ms`. Moving backwards is ignored.
    pub fn set(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
    }
}

/// Keyboard shortcuts that request presets.
#[derive(Resource, Debug, Clone)]
pub struct HandKeyBindings {
    pub bindings: Vec<(KeyCode, Preset)>,
}

impl Default for HandKeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::Digit1, Preset::Open),
                (KeyCode::Digit2, Preset::Fist),
                (KeyCode::Digit3, Preset::Peace),
                (KeyCode::Digit4, Preset::Rock),
                (KeyCode::Digit5, Preset::MiddleFinger),
                (KeyCode::Digit6, Preset::SlowMiddleFinger),
                (KeyCode::Digit7, Preset::AlienPoint),
                (KeyCode::Digit0, Preset::Reset),
                (KeyCode::KeyR, Preset::Reset),
            ],
        }
    }
}

impl HandKeyBindings {
    pub fn preset_for(&self, key: KeyCode) -> Option<Preset> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| *p)
    }
}

/// Outputs of the most recent controller tick, kept for inspection by other systems.
#[derive(Resource, Default, Debug)]
pub struct HandOutputs {
    pub changes: Vec<Change>,
    pub events: Vec<HandEvent>,
}
