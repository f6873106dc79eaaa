use criterion::{Criterion, criterion_group, criterion_main};
use file_converter::ui::bridge;
use file_converter::{JobEvent, JobId, JobMetrics};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn emit_and_drain(c: &mut Criterion) {
    let (notifier, mut receiver) = bridge::channel(Arc::new(JobMetrics::new()));

    c.bench_function("emit 1000 ticks then drain", |b| {
        b.iter(|| {
            for ms in 0..1000u64 {
                notifier.emit(
                    JobId(1),
                    JobEvent::StillRunning {
                        elapsed: Duration::from_millis(ms),
                    },
                );
            }
            black_box(receiver.drain())
        })
    });

    c.bench_function("drain empty bridge", |b| b.iter(|| black_box(receiver.drain())));
}

criterion_group!(benches, emit_and_drain);
criterion_main!(benches);
