//! Interpolation scheduler: drives many axes from their live values toward targets.
//!
//! The scheduler owns the list of active runs and advances all of them once per external
//! frame tick. Runs never re-arm themselves. Starting a run takes its axes away from any
//! older run that still drives them, so at most one run writes a given axis.
//!
//! Timing: `t = clamp((now - start) / duration, 0, 1)`, linear, never decreasing within a
//! run. At `t == 1` the exact target is written and the run is dropped. Durations of zero
//! (or anything shorter than one frame) still write the target once.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use crate::error::{HandError, Result};
use crate::ids::{AxisKey, IdAllocator, RunId};
use crate::outputs::{Change, HandEvent, Outputs};
use crate::pose::Pose;
use crate::rig::Rig;

const DEFAULT_EVENT_LIMIT: usize = 256;

/// One axis driven by a run.
#[derive(Clone, Debug, PartialEq)]
struct Channel {
    key: AxisKey,
    path: String,
    from: f32,
    to: f32,
}

impl Channel {
    #[inline]
    fn value_at(&self, t: f32) -> f32 {
        if t >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * t
        }
    }
}

/// An in-flight interpolation.
#[derive(Clone, Debug)]
pub struct Run {
    id: RunId,
    start_ms: f64,
    duration_ms: f64,
    channels: Vec<Channel>,
    progress: f32,
}

impl Run {
    #[inline]
    pub fn id(&self) -> RunId {
        self.id
    }

    #[inline]
    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Interpolation factor reached at the last tick.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Axes this run still drives.
    pub fn axes(&self) -> impl Iterator<Item = AxisKey> + '_ {
        self.channels.iter().map(|c| c.key)
    }

    /// Captured (from, to) values of one axis, if this run drives it.
    pub fn endpoints(&self, key: AxisKey) -> Option<(f32, f32)> {
        self.channels
            .iter()
            .find(|c| c.key == key)
            .map(|c| (c.from, c.to))
    }

    fn factor_at(&self, now_ms: f64) -> f32 {
        let raw = if self.duration_ms > 0.0 && self.duration_ms.is_finite() {
            ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        raw.max(self.progress)
    }
}

/// Returned by [`AnimationScheduler::start_interpolation`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunReceipt {
    pub run: RunId,
    /// Number of axes the run drives.
    pub axes: usize,
    /// Targets rejected at the joint boundary; the rest of the run still animates.
    pub rejected: Vec<HandError>,
}

/// Owns active runs and advances them on every frame tick.
#[derive(Debug)]
pub struct AnimationScheduler {
    ids: IdAllocator,
    runs: Vec<Run>,
    pending_events: Vec<HandEvent>,
    outputs: Outputs,
    max_events: usize,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_event_limit(DEFAULT_EVENT_LIMIT)
    }

    pub fn with_event_limit(max_events: usize) -> Self {
        Self {
            ids: IdAllocator::new(),
            runs: Vec::new(),
            pending_events: Vec::new(),
            outputs: Outputs::default(),
            max_events: max_events.max(1),
        }
    }

    /// Start driving `targets` from their current rig values over `duration_ms`.
    ///
    /// The "from" value of every axis is read from the rig now, so a run started while
    /// another is mid-flight continues from wherever that axis currently is. Targets are
    /// clamped to the joint's range. Unsupported axes and non-finite targets are reported
    /// in the receipt and skipped. When an axis is listed twice the last valid target wins.
    ///
    /// Fails with [`HandError::NonFiniteTime`] when `now_ms` is NaN or infinite; nothing
    /// is started in that case.
    pub fn start_interpolation<I>(
        &mut self,
        rig: &Rig,
        targets: I,
        duration_ms: f64,
        now_ms: f64,
    ) -> Result<RunReceipt>
    where
        I: IntoIterator<Item = (AxisKey, f32)>,
    {
        let now_ms = HandError::check_time(now_ms)?;
        let id = self.ids.alloc_run();
        let mut rejected = Vec::new();
        let mut resolved: IndexMap<AxisKey, Channel> = IndexMap::new();

        for (key, target) in targets {
            match capture(rig, key, target) {
                Ok(channel) => {
                    resolved.insert(key, channel);
                }
                Err(err) => {
                    warn!(
                        "run {:?}: skipping target ({}): {}",
                        id,
                        err.category(),
                        err
                    );
                    rejected.push(err);
                }
            }
        }

        self.supersede(|key| resolved.contains_key(&key));

        let channels: Vec<Channel> = resolved.into_values().collect();
        let axes = channels.len();
        debug!(
            "run {:?} started: {} axes over {} ms at {} ms",
            id, axes, duration_ms, now_ms
        );
        self.pending_events.push(HandEvent::RunStarted {
            run: id,
            axes,
            duration_ms,
        });
        self.runs.push(Run {
            id,
            start_ms: now_ms,
            duration_ms,
            channels,
            progress: 0.0,
        });

        Ok(RunReceipt {
            run: id,
            axes,
            rejected,
        })
    }

    /// Start a run toward every target in `pose`.
    pub fn start_pose(
        &mut self,
        rig: &Rig,
        pose: &Pose,
        duration_ms: f64,
        now_ms: f64,
    ) -> Result<RunReceipt> {
        self.start_interpolation(rig, pose.iter(), duration_ms, now_ms)
    }

    /// Queue an event for the next tick's outputs.
    pub fn queue_event(&mut self, event: HandEvent) {
        self.pending_events.push(event);
    }

    /// Stop any run from writing `key`. Returns whether a run was driving it.
    pub fn release_axis(&mut self, key: AxisKey) -> bool {
        self.supersede(|k| k == key) > 0
    }

    /// Advance every active run to `now_ms`, writing interpolated values into `rig`.
    ///
    /// A non-finite `now_ms` is rejected before anything is written or drained.
    pub fn tick(&mut self, rig: &mut Rig, now_ms: f64) -> Result<&Outputs> {
        let now_ms = HandError::check_time(now_ms)?;
        self.outputs.clear();
        for event in self.pending_events.drain(..) {
            self.outputs.push_event(event, self.max_events);
        }

        let mut completed = Vec::new();
        for run in &mut self.runs {
            let t = run.factor_at(now_ms);
            run.progress = t;
            trace!("run {:?} t={:.4}", run.id, t);

            let mut failed = Vec::new();
            for channel in &run.channels {
                let value = channel.value_at(t);
                match rig.set_rotation(channel.key, value) {
                    Ok(stored) => {
                        self.outputs.push_change(Change {
                            key: channel.key,
                            path: channel.path.clone(),
                            value: stored,
                        });
                    }
                    Err(err) => {
                        warn!("run {:?}: dropping axis: {}", run.id, err);
                        failed.push(channel.key);
                    }
                }
            }
            if !failed.is_empty() {
                run.channels.retain(|c| !failed.contains(&c.key));
            }

            if t >= 1.0 {
                completed.push(run.id);
            }
        }

        if !completed.is_empty() {
            self.runs.retain(|r| !completed.contains(&r.id));
            for run in completed {
                debug!("run {:?} completed", run);
                self.outputs
                    .push_event(HandEvent::RunCompleted { run }, self.max_events);
            }
        }

        Ok(&self.outputs)
    }

    #[inline]
    pub fn active_runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.iter().find(|r| r.id == id)
    }

    #[inline]
    pub fn is_active(&self, id: RunId) -> bool {
        self.run(id).is_some()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    /// The run currently driving `key`, if any.
    pub fn owner_of(&self, key: AxisKey) -> Option<RunId> {
        self.runs
            .iter()
            .find(|r| r.channels.iter().any(|c| c.key == key))
            .map(|r| r.id)
    }

    /// Remove every axis matching `taken` from older runs. Runs left with nothing to
    /// drive are dropped. Returns how many axes were taken.
    fn supersede(&mut self, taken: impl Fn(AxisKey) -> bool) -> usize {
        let mut total = 0;
        let mut emptied = Vec::new();
        for run in &mut self.runs {
            let before = run.channels.len();
            run.channels.retain(|c| !taken(c.key));
            let removed = before - run.channels.len();
            if removed > 0 {
                total += removed;
                debug!(
                    "run {:?} superseded on {} axes ({} remaining)",
                    run.id,
                    removed,
                    run.channels.len()
                );
                self.pending_events.push(HandEvent::RunSuperseded {
                    run: run.id,
                    axes: removed,
                    remaining: run.channels.len(),
                });
                if run.channels.is_empty() {
                    emptied.push(run.id);
                }
            }
        }
        if !emptied.is_empty() {
            self.runs.retain(|r| !emptied.contains(&r.id));
        }
        total
    }
}

fn capture(rig: &Rig, key: AxisKey, target: f32) -> Result<Channel> {
    let range = rig.get_range(key)?;
    let from = rig.get_rotation(key)?;
    let joint = rig
        .joint(key.joint)
        .map(|j| j.path().to_string())
        .unwrap_or_default();
    if !target.is_finite() {
        return Err(HandError::NonFiniteRotation {
            joint,
            axis: key.axis,
            value: target,
        });
    }
    if !range.contains(target) {
        debug!(
            "clamping target {} for {}.{} to [{}, {}]",
            target, joint, key.axis, range.min, range.max
        );
    }
    Ok(Channel {
        key,
        path: format!("{}.{}", joint, key.axis),
        from,
        to: range.clamp(target),
    })
}
