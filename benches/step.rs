//! Benchmarks for per-frame stepping and compositing.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nocturne::scene::Scene;
use nocturne::theme::Theme;

fn bench_step_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_frame");
    group.sample_size(20);

    for name in Theme::names() {
        group.bench_function(name, |b| {
            let mut scene = Scene::builder(800, 600)
                .with_theme(name)
                .with_seed(42)
                .build()
                .unwrap();
            b.iter(|| {
                scene.step_frame();
                black_box(scene.tick())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step_frame);
criterion_main!(benches);
