use criterion::{black_box, criterion_group, criterion_main, Criterion};
use handpose_core::{build_rig, AnimationScheduler, RigConfig};

fn bench_scheduler_tick(c: &mut Criterion) {
    let mut rig = build_rig(&RigConfig::five_finger()).expect("rig");
    let targets: Vec<_> = rig.axes().into_iter().map(|k| (k, 1.0)).collect();

    c.bench_function("tick_all_axes_in_flight", |b| {
        let mut sched = AnimationScheduler::new();
        sched
            .start_interpolation(&rig, targets.clone(), 1.0e12, 0.0)
            .expect("finite time");
        let mut now: f64 = 0.0;
        b.iter(|| {
            now += 16.0;
            let out = sched.tick(&mut rig, black_box(now)).expect("finite time");
            black_box(out.changes.len());
        })
    });

    c.bench_function("retarget_all_axes", |b| {
        let mut sched = AnimationScheduler::new();
        let mut now: f64 = 0.0;
        b.iter(|| {
            now += 16.0;
            let receipt = sched
                .start_interpolation(&rig, targets.iter().copied(), 500.0, now)
                .expect("finite time");
            black_box(receipt.axes);
        })
    });
}

criterion_group!(benches, bench_scheduler_tick);
criterion_main!(benches);
