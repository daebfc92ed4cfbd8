use ai_nav::gradient;
use ai_nav::{FlowField, FlowSource, GradientMemory, TileCoord, Vec2};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_gradient(c: &mut Criterion) {
    let field = FlowField::from_sources(
        256,
        256,
        1.0,
        &[TileCoord::new(10, 10), TileCoord::new(200, 180)],
    );

    let mut group = c.benchmark_group("ai-nav/gradient");

    group.bench_function("choose_step", |b| {
        let mut memory = GradientMemory::default();
        b.iter(|| {
            let step = gradient::choose_step(&field, TileCoord::new(128, 128), 0, &mut memory);
            black_box(step);
        })
    });

    group.bench_function("descend_to_source", |b| {
        b.iter(|| {
            let mut memory = GradientMemory::default();
            let mut tile = field.tile_of(Vec2::new(128.5, 128.5));
            while let Some(step) = gradient::choose_step(&field, tile, 0, &mut memory) {
                tile = step.tile;
            }
            black_box(tile);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_gradient);
criterion_main!(benches);
