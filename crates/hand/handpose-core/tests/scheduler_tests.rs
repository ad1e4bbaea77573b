use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use approx::assert_abs_diff_eq;
use handpose_core::{
    build_rig, AnimationScheduler, Axis, AxisKey, HandError, HandEvent, JointId, Pose, Rig,
    RigConfig,
};

fn rig() -> Rig {
    build_rig(&RigConfig::default()).unwrap()
}

fn curl(rig: &Rig, finger: usize) -> AxisKey {
    AxisKey::new(rig.finger(finger).unwrap().base, Axis::X)
}

/// Tick every `step_ms` from `from_ms` up to and including `to_ms`.
fn run_frames(
    sched: &mut AnimationScheduler,
    rig: &mut Rig,
    from_ms: f64,
    to_ms: f64,
    step_ms: f64,
) {
    let mut now = from_ms;
    while now < to_ms {
        sched.tick(rig, now).unwrap();
        now += step_ms;
    }
    sched.tick(rig, to_ms).unwrap();
}

/// it should land every targeted axis exactly on its target once the duration has elapsed
#[test]
fn converges_exactly_after_duration() {
    let mut rig = rig();
    let mut sched = AnimationScheduler::new();
    let targets: Vec<(AxisKey, f32)> = (0..4)
        .map(|i| (curl(&rig, i), 0.1 + 0.3 * i as f32))
        .collect();
    sched.start_interpolation(&rig, targets.clone(), 500.0, 0.0).unwrap();

    run_frames(&mut sched, &mut rig, 0.0, 517.0, 16.7);

    for (key, target) in targets {
        assert_eq!(rig.get_rotation(key).unwrap(), target);
    }
    assert!(sched.is_idle());
}

/// it should report a non-decreasing factor capped at 1, even if the clock steps back
#[test]
fn factor_is_monotonic_and_capped() {
    let mut rig = rig();
    let mut sched = AnimationScheduler::new();
    let receipt = sched.start_interpolation(&rig, [(curl(&rig, 0), 1.0)], 1000.0, 0.0).unwrap();

    let mut last = 0.0;
    for now in [100.0, 250.0, 200.0, 600.0, 999.0] {
        sched.tick(&mut rig, now).unwrap();
        let t = sched.run(receipt.run).unwrap().progress();
        assert!(t >= last, "t went backwards: {t} < {last}");
        assert!(t <= 1.0);
        last = t;
    }
    sched.tick(&mut rig, 5000.0).unwrap();
    assert!(!sched.is_active(receipt.run));
    assert_eq!(rig.get_rotation(curl(&rig, 0)).unwrap(), 1.0);
}

/// it should interpolate linearly between captured from and target
#[test]
fn linear_without_easing() {
    let mut rig = rig();
    let key = curl(&rig, 1);
    rig.set_rotation(key, 0.2).unwrap();
    let mut sched = AnimationScheduler::new();
    sched.start_interpolation(&rig, [(key, 1.2)], 400.0, 1000.0).unwrap();

    sched.tick(&mut rig, 1100.0).unwrap();
    assert_abs_diff_eq!(rig.get_rotation(key).unwrap(), 0.45, epsilon = 1e-6);
    sched.tick(&mut rig, 1300.0).unwrap();
    assert_abs_diff_eq!(rig.get_rotation(key).unwrap(), 0.95, epsilon = 1e-6);
}

/// it should blend from the mid-flight value when a new run retargets an axis
#[test]
fn mid_flight_retarget_continues_from_current_value() {
    let mut rig = rig();
    let x = curl(&rig, 0);
    let mut sched = AnimationScheduler::new();

    let a = sched.start_interpolation(&rig, [(x, FRAC_PI_2)], 500.0, 0.0).unwrap();
    sched.tick(&mut rig, 250.0).unwrap();
    let mid = rig.get_rotation(x).unwrap();
    assert_abs_diff_eq!(mid, FRAC_PI_4, epsilon = 1e-5);

    let b = sched.start_interpolation(&rig, [(x, 0.0)], 500.0, 250.0).unwrap();
    assert!(!sched.is_active(a.run), "fully superseded run is dropped");
    assert_eq!(sched.owner_of(x), Some(b.run));
    assert_eq!(sched.run(b.run).unwrap().endpoints(x), Some((mid, 0.0)));

    let mut prev = mid;
    let mut now: f64 = 250.0;
    while now < 750.0 {
        now += 10.0;
        sched.tick(&mut rig, now.min(750.0)).unwrap();
        let v = rig.get_rotation(x).unwrap();
        assert!(v <= prev + 1e-6, "axis moved away from target: {v} > {prev}");
        assert!(v < FRAC_PI_2);
        // no instantaneous snap to the target on the first tick
        if now == 260.0 {
            assert!(v > 0.7, "snapped to {v}");
        }
        prev = v;
    }
    assert_eq!(rig.get_rotation(x).unwrap(), 0.0);
}

/// it should let runs on disjoint axes finish on their own schedules
#[test]
fn disjoint_runs_are_independent() {
    let mut rig = rig();
    let fingers = curl(&rig, 2);
    let yaw = AxisKey::new(rig.palm(), Axis::Y);
    let mut sched = AnimationScheduler::new();

    let short = sched.start_interpolation(&rig, [(fingers, 1.0)], 200.0, 0.0).unwrap();
    let long = sched.start_interpolation(&rig, [(yaw, 2.0)], 1000.0, 100.0).unwrap();

    sched.tick(&mut rig, 200.0).unwrap();
    assert_eq!(rig.get_rotation(fingers).unwrap(), 1.0);
    assert!(!sched.is_active(short.run));
    assert!(sched.is_active(long.run));
    assert_abs_diff_eq!(rig.get_rotation(yaw).unwrap(), 0.2, epsilon = 1e-6);

    sched.tick(&mut rig, 600.0).unwrap();
    assert_abs_diff_eq!(rig.get_rotation(yaw).unwrap(), 1.0, epsilon = 1e-6);
    sched.tick(&mut rig, 1100.0).unwrap();
    assert_eq!(rig.get_rotation(yaw).unwrap(), 2.0);
    assert!(sched.is_idle());
}

/// it should split a run when a newer run takes only some of its axes
#[test]
fn partial_supersede_keeps_remaining_axes() {
    let mut rig = rig();
    let a0 = curl(&rig, 0);
    let a1 = curl(&rig, 1);
    let mut sched = AnimationScheduler::new();

    let first = sched.start_interpolation(&rig, [(a0, 1.0), (a1, 1.0)], 1000.0, 0.0).unwrap();
    sched.tick(&mut rig, 500.0).unwrap();
    let second = sched.start_interpolation(&rig, [(a0, 0.0)], 100.0, 500.0).unwrap();

    let out = sched.tick(&mut rig, 600.0).unwrap();
    assert!(out.events.contains(&HandEvent::RunSuperseded {
        run: first.run,
        axes: 1,
        remaining: 1,
    }));
    assert!(out.events.contains(&HandEvent::RunCompleted { run: second.run }));
    assert_eq!(rig.get_rotation(a0).unwrap(), 0.0);
    assert_abs_diff_eq!(rig.get_rotation(a1).unwrap(), 0.6, epsilon = 1e-6);
    assert_eq!(sched.owner_of(a1), Some(first.run));
}

/// it should apply the target once for zero or sub-frame durations
#[test]
fn degenerate_duration_applies_target_once() {
    let mut rig = rig();
    let key = curl(&rig, 3);
    let mut sched = AnimationScheduler::new();

    let r = sched.start_interpolation(&rig, [(key, 0.8)], 0.0, 10.0).unwrap();
    let out = sched.tick(&mut rig, 10.0).unwrap();
    assert_eq!(out.changes.len(), 1);
    assert_eq!(out.changes[0].value, 0.8);
    assert_eq!(out.changes[0].path, "finger[3].base.x");
    assert!(!sched.is_active(r.run));

    sched.start_interpolation(&rig, [(key, 0.2)], 4.0, 20.0).unwrap();
    sched.tick(&mut rig, 36.0).unwrap();
    assert_eq!(rig.get_rotation(key).unwrap(), 0.2);

    let out = sched.tick(&mut rig, 52.0).unwrap();
    assert!(out.changes.is_empty());
}

/// it should never touch axes a pose leaves out
#[test]
fn partial_pose_leaves_other_axes_alone() {
    let mut rig = rig();
    let driven = curl(&rig, 0);
    let untouched = curl(&rig, 1);
    rig.set_rotation(untouched, 0.33).unwrap();

    let mut sched = AnimationScheduler::new();
    let pose = Pose::new("one finger").with(driven, 1.0);
    sched.start_pose(&rig, &pose, 300.0, 0.0).unwrap();

    for now in [0.0, 100.0, 200.0, 300.0, 400.0] {
        let out = sched.tick(&mut rig, now).unwrap();
        assert!(out.changes.iter().all(|c| c.key == driven));
        assert_eq!(rig.get_rotation(untouched).unwrap(), 0.33);
    }
}

/// it should clamp out-of-range targets and converge to the clamped value
#[test]
fn out_of_range_targets_are_clamped() {
    let mut rig = rig();
    let over = curl(&rig, 0);
    let thumb_tip = AxisKey::new(rig.thumb().unwrap().tip, Axis::X);
    let mut sched = AnimationScheduler::new();

    let receipt = sched
        .start_interpolation(&rig, [(over, 5.0), (thumb_tip, 1.0)], 100.0, 0.0)
        .unwrap();
    assert!(receipt.rejected.is_empty());
    assert_eq!(receipt.axes, 2);

    sched.tick(&mut rig, 50.0).unwrap();
    assert!(rig.get_rotation(over).unwrap() <= FRAC_PI_2);
    sched.tick(&mut rig, 100.0).unwrap();
    assert_eq!(rig.get_rotation(over).unwrap(), FRAC_PI_2);
    assert_eq!(rig.get_rotation(thumb_tip).unwrap(), 0.0);
}

/// it should reject unsupported axes but still animate the rest of the run
#[test]
fn invalid_axis_does_not_abort_run() {
    let mut rig = rig();
    let good = curl(&rig, 0);
    let tip_z = AxisKey::new(rig.finger(0).unwrap().tip, Axis::Z);
    let missing = AxisKey::new(JointId(999), Axis::X);
    let mut sched = AnimationScheduler::new();

    let receipt = sched
        .start_interpolation(
            &rig,
            [(tip_z, 0.1), (good, 1.0), (missing, 0.5), (good, f32::NAN)],
            100.0,
            0.0,
        )
        .unwrap();
    assert_eq!(receipt.axes, 1);
    assert_eq!(receipt.rejected.len(), 3);
    assert!(matches!(receipt.rejected[0], HandError::InvalidAxis { axis: Axis::Z, .. }));
    assert!(matches!(receipt.rejected[1], HandError::UnknownJoint { .. }));
    assert!(matches!(receipt.rejected[2], HandError::NonFiniteRotation { .. }));

    let receipt = sched
        .start_interpolation(&rig, [(tip_z, 0.1), (good, 1.0)], 100.0, 0.0)
        .unwrap();
    assert_eq!(receipt.axes, 1);
    sched.tick(&mut rig, 100.0).unwrap();
    assert_eq!(rig.get_rotation(good).unwrap(), 1.0);
}

/// it should emit a started event for a run on the next tick, then completion
#[test]
fn events_follow_run_lifecycle() {
    let mut rig = rig();
    let mut sched = AnimationScheduler::new();
    let r = sched.start_interpolation(&rig, [(curl(&rig, 0), 1.0)], 100.0, 0.0).unwrap();

    let out = sched.tick(&mut rig, 50.0).unwrap();
    assert_eq!(
        out.events,
        vec![HandEvent::RunStarted {
            run: r.run,
            axes: 1,
            duration_ms: 100.0
        }]
    );
    let out = sched.tick(&mut rig, 100.0).unwrap();
    assert_eq!(out.events, vec![HandEvent::RunCompleted { run: r.run }]);
}

/// it should stop writing an axis released for manual control
#[test]
fn released_axis_is_no_longer_driven() {
    let mut rig = rig();
    let key = curl(&rig, 0);
    let mut sched = AnimationScheduler::new();
    sched.start_interpolation(&rig, [(key, 1.0)], 100.0, 0.0).unwrap();
    sched.tick(&mut rig, 50.0).unwrap();

    assert!(sched.release_axis(key));
    assert!(!sched.release_axis(key));
    rig.set_rotation(key, 0.1).unwrap();
    sched.tick(&mut rig, 100.0).unwrap();
    assert_eq!(rig.get_rotation(key).unwrap(), 0.1);
    assert!(sched.is_idle());
}

/// it should keep the earlier valid target when a later duplicate for the same axis is rejected
#[test]
fn rejected_duplicate_keeps_valid_target() {
    let mut rig = rig();
    let key = curl(&rig, 2);
    let mut sched = AnimationScheduler::new();

    let receipt = sched
        .start_interpolation(&rig, [(key, 1.0), (key, f32::NAN)], 100.0, 0.0)
        .unwrap();
    assert_eq!(receipt.axes, 1);
    assert_eq!(receipt.rejected.len(), 1);
    assert!(matches!(receipt.rejected[0], HandError::NonFiniteRotation { .. }));

    run_frames(&mut sched, &mut rig, 0.0, 100.0, 16.0);
    assert_eq!(rig.get_rotation(key).unwrap(), 1.0);
    assert!(sched.is_idle());
}

/// it should refuse to start or tick with a non-finite clock and leave state untouched
#[test]
fn non_finite_time_is_rejected() {
    let mut rig = rig();
    let key = curl(&rig, 0);
    let mut sched = AnimationScheduler::new();

    let err = sched
        .start_interpolation(&rig, [(key, 1.0)], 100.0, f64::NAN)
        .unwrap_err();
    assert!(matches!(err, HandError::NonFiniteTime { .. }));
    assert!(sched.is_idle());

    sched.start_interpolation(&rig, [(key, 1.0)], 100.0, 0.0).unwrap();
    let err = sched.tick(&mut rig, f64::INFINITY).unwrap_err();
    assert_eq!(err.category(), "time");
    assert_eq!(rig.get_rotation(key).unwrap(), 0.0);
    assert_eq!(sched.active_runs().len(), 1);

    sched.tick(&mut rig, 100.0).unwrap();
    assert_eq!(rig.get_rotation(key).unwrap(), 1.0);
    assert!(sched.is_idle());
}
