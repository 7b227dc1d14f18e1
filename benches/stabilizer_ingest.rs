use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gesto::gesture::{GestureLabel, RawClassification};
use gesto::stabilizer::{Stabilizer, StabilizerConfig};
use std::time::Duration;

/// A flickery frame trace: held labels with transition noise, the shape
/// the stabilizer sees from a live classifier.
fn synthetic_frames(count: usize) -> Vec<RawClassification> {
    let pattern = [
        GestureLabel::Loop,
        GestureLabel::Loop,
        GestureLabel::Loop,
        GestureLabel::If,
        GestureLabel::Loop,
        GestureLabel::NoGesture,
        GestureLabel::Function,
        GestureLabel::Function,
    ];

    (0..count)
        .map(|i| {
            let label = pattern[i % pattern.len()];
            let confidence = 0.5 + (i % 50) as f32 / 100.0;
            RawClassification::new(label, confidence)
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let frames = synthetic_frames(1024);

    let mut group = c.benchmark_group("stabilizer_ingest");
    group.sample_size(60);
    group.measurement_time(Duration::from_secs(5));

    for window in [5usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(window),
            &window,
            |b, &window| {
                let config = StabilizerConfig {
                    history_window: window,
                    ..Default::default()
                };

                b.iter(|| {
                    let mut stabilizer = Stabilizer::new(config);
                    for raw in &frames {
                        let _ = black_box(stabilizer.ingest(*raw, "javascript"));
                    }
                    stabilizer.sequence().len()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
