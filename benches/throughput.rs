use std::time::Instant;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use sortviz::{
    core::sink::VisualSink,
    engine::registry::{Algorithm, compile},
    playback::scheduler::{Scheduler, Tick},
    types::{Delay, Value},
};

fn scrambled(n: usize) -> Vec<Value> {
    // Fixed pseudo-shuffled input so every run compiles the same log.
    (0..n as Value).map(|i| (i * 7919) % 1009 + 1).collect()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_1k");
    let input = scrambled(1_000);
    for algo in Algorithm::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(algo.name()), &input, |b, input| {
            b.iter(|| compile(algo, input).expect("compile"));
        });
    }
    group.finish();
}

fn bench_playback(c: &mut Criterion) {
    let input = scrambled(300);
    let log = compile(Algorithm::Insertion, &input).expect("compile");

    c.bench_function("headless_playback_insertion_300", |b| {
        b.iter(|| {
            let mut sink = VisualSink::new(input.clone());
            let mut sched = Scheduler::new(Delay::DEFAULT);
            sched
                .start(log.clone(), Delay::DEFAULT, &mut sink, Instant::now())
                .expect("start");
            while !matches!(sched.tick(&mut sink).expect("tick"), Tick::Completed { .. }) {}
        });
    });
}

criterion_group!(benches, bench_compile, bench_playback);
criterion_main!(benches);
