//! Output contracts from the scheduler and controller.
//!
//! Outputs carry the axis values written this tick plus a separate list of semantic
//! events. Adapters (Bevy/WASM) copy the changes onto their scene and forward events.

use serde::{Deserialize, Serialize};

use crate::ids::{AxisKey, RunId};

/// One axis written during this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub key: AxisKey,
    /// Canonical axis path, e.g. `finger[0].base.x`.
    pub path: String,
    pub value: f32,
}

/// Discrete signals emitted while dispatching and stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HandEvent {
    PresetDispatched {
        preset: String,
    },
    /// A delayed preset stage was started.
    StageActivated {
        preset: String,
        stage: usize,
    },
    RunStarted {
        run: RunId,
        axes: usize,
        duration_ms: f64,
    },
    /// A newer run took `axes` from this run; it keeps driving `remaining` axes.
    RunSuperseded {
        run: RunId,
        axes: usize,
        remaining: usize,
    },
    RunCompleted {
        run: RunId,
    },
}

/// Outputs of one tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<HandEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Append an event, dropping the oldest ones beyond `limit`.
    pub fn push_event(&mut self, event: HandEvent, limit: usize) {
        self.events.push(event);
        if self.events.len() > limit {
            let excess = self.events.len() - limit;
            self.events.drain(..excess);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_limit_drops_oldest() {
        let mut out = Outputs::default();
        for i in 0..5 {
            out.push_event(HandEvent::RunCompleted { run: RunId(i) }, 3);
        }
        assert_eq!(
            out.events,
            vec![
                HandEvent::RunCompleted { run: RunId(2) },
                HandEvent::RunCompleted { run: RunId(3) },
                HandEvent::RunCompleted { run: RunId(4) },
            ]
        );
        out.clear();
        assert!(out.is_empty());
    }
}
