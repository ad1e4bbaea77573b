//! HandController: the owned rig + scheduler pair the frame loop and input layer share.
//!
//! Methods:
//! - new, dispatch_preset (input layer), tick (frame loop), get/set_rotation (manual sliders)

use log::{debug, warn};

use crate::config::ControllerConfig;
use crate::engine::{AnimationScheduler, RunReceipt};
use crate::error::{HandError, Result};
use crate::ids::AxisKey;
use crate::joint::AxisRange;
use crate::outputs::{HandEvent, Outputs};
use crate::presets::{plan, Preset, Stage};
use crate::rig::{build_rig, Rig};

/// A preset stage waiting for its start time.
#[derive(Clone, Debug)]
struct QueuedStage {
    preset: Preset,
    index: usize,
    due_ms: f64,
    stage: Stage,
}

/// What a dispatch started.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReceipts {
    pub preset: Preset,
    /// Receipts of the runs started immediately (primary first).
    pub immediate: Vec<RunReceipt>,
    /// Start time of the queued follow-up stage, if the preset has one.
    pub delayed_until_ms: Option<f64>,
}

/// Owns one rig, its scheduler and the queue of delayed preset stages.
#[derive(Debug)]
pub struct HandController {
    cfg: ControllerConfig,
    rig: Rig,
    scheduler: AnimationScheduler,
    queued: Vec<QueuedStage>,
}

impl HandController {
    pub fn new(cfg: ControllerConfig) -> Result<Self> {
        cfg.validate()?;
        let rig = build_rig(&cfg.rig)?;
        Ok(Self {
            scheduler: AnimationScheduler::with_event_limit(cfg.max_events_per_tick),
            cfg,
            rig,
            queued: Vec::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    #[inline]
    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    #[inline]
    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// Resolve `name` and start its runs at `now_ms`. An unknown name or a non-finite
    /// time changes nothing.
    ///
    /// A follow-up stage is queued for `now_ms + delay`, measured from this call rather than
    /// from the end of the first stage.
    pub fn dispatch_preset(&mut self, name: &str, now_ms: f64) -> Result<RunReceipts> {
        let preset = Preset::parse(name).map_err(|e| {
            warn!("dispatch rejected: {e}");
            e
        })?;
        self.dispatch(preset, now_ms)
    }

    /// Start a known preset at `now_ms`.
    pub fn dispatch(&mut self, preset: Preset, now_ms: f64) -> Result<RunReceipts> {
        let now_ms = HandError::check_time(now_ms).map_err(|e| {
            warn!("dispatch of {preset} rejected: {e}");
            e
        })?;
        if self.cfg.cancel_pending_on_dispatch && !self.queued.is_empty() {
            debug!("dropping {} queued stage(s)", self.queued.len());
            self.queued.clear();
        }

        let plan = plan(&self.rig, preset);
        debug!("dispatch {} at {} ms", preset, now_ms);
        self.scheduler.queue_event(HandEvent::PresetDispatched {
            preset: preset.name().to_string(),
        });

        let immediate = self.start_stage(&plan.immediate, now_ms)?;
        let delayed_until_ms = plan.delayed.map(|delayed| {
            let due_ms = now_ms + delayed.delay_ms.max(0.0);
            self.queued.push(QueuedStage {
                preset,
                index: 1,
                due_ms,
                stage: delayed.stage,
            });
            due_ms
        });

        Ok(RunReceipts {
            preset,
            immediate,
            delayed_until_ms,
        })
    }

    fn start_stage(&mut self, stage: &Stage, start_ms: f64) -> Result<Vec<RunReceipt>> {
        let mut receipts = Vec::with_capacity(2);
        receipts.push(self.scheduler.start_pose(
            &self.rig,
            &stage.primary.pose,
            stage.primary.duration_ms,
            start_ms,
        )?);
        if let Some(secondary) = &stage.secondary {
            receipts.push(self.scheduler.start_pose(
                &self.rig,
                &secondary.pose,
                secondary.duration_ms,
                start_ms,
            )?);
        }
        Ok(receipts)
    }

    /// Start due stages, then advance every run to `now_ms`. A non-finite `now_ms` is
    /// rejected and leaves queued stages and runs untouched.
    pub fn tick(&mut self, now_ms: f64) -> Result<&Outputs> {
        let now_ms = HandError::check_time(now_ms)?;
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.queued.len() {
            if self.queued[i].due_ms <= now_ms {
                due.push(self.queued.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        for queued in due {
            debug!(
                "stage {} of {} activated (due {} ms, now {} ms)",
                queued.index, queued.preset, queued.due_ms, now_ms
            );
            self.scheduler.queue_event(HandEvent::StageActivated {
                preset: queued.preset.name().to_string(),
                stage: queued.index,
            });
            self.start_stage(&queued.stage, queued.due_ms)?;
        }

        self.scheduler.tick(&mut self.rig, now_ms)
    }

    pub fn get_rotation(&self, key: AxisKey) -> Result<f32> {
        self.rig.get_rotation(key)
    }

    pub fn get_range(&self, key: AxisKey) -> Result<AxisRange> {
        self.rig.get_range(key)
    }

    /// Manual override. The axis is released from any in-flight run so the value sticks;
    /// the next preset starts from it.
    pub fn set_rotation(&mut self, key: AxisKey, value: f32) -> Result<f32> {
        let stored = self.rig.set_rotation(key, value)?;
        if self.scheduler.release_axis(key) {
            debug!("manual override released {:?} from its run", key);
        }
        Ok(stored)
    }

    /// Path-based variants for GUI bindings.
    pub fn get_rotation_at(&self, path: &str) -> Result<f32> {
        self.rig.get_rotation(self.rig.resolve_axis(path)?)
    }

    pub fn get_range_at(&self, path: &str) -> Result<AxisRange> {
        self.rig.get_range(self.rig.resolve_axis(path)?)
    }

    pub fn set_rotation_at(&mut self, path: &str, value: f32) -> Result<f32> {
        let key = self.rig.resolve_axis(path)?;
        self.set_rotation(key, value)
    }

    /// Number of queued follow-up stages.
    #[inline]
    pub fn queued_stages(&self) -> usize {
        self.queued.len()
    }

    /// No run in flight and nothing queued.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle() && self.queued.is_empty()
    }
}
