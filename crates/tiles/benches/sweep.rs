use std::sync::Arc;

use bevy::prelude::*;
use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use se_test_utils::scatter_points;
use se_tiles::{AttributeLayer, TileRegistrationMgr};
use se_types::rect::{TileRect, WorldRect};

const LEVEL_SIZE: i32 = 2000;

#[derive(Resource)]
struct Queries {
    rects: Vec<TileRect>,
    segments: Vec<(Vec2, Vec2)>,
}

fn setup_world(world: &mut World, num_entities: usize, query_size: f32) {
    let mut mgr = TileRegistrationMgr::default();
    mgr.set_level_layer(Arc::new(AttributeLayer::new(IVec2::splat(LEVEL_SIZE))));

    let points = scatter_points(0, num_entities, LEVEL_SIZE as f32);
    for (i, point) in points.iter().enumerate() {
        let rect = WorldRect::from_center_size(*point, Vec2::splat(3.)).to_tile_rect();
        mgr.register_entity_handle(&rect, Entity::from_raw(i as u32));
    }

    let centers = scatter_points(1, 1000, LEVEL_SIZE as f32);
    let ends = scatter_points(2, 1000, LEVEL_SIZE as f32);
    let rects = centers
        .iter()
        .map(|&center| {
            WorldRect::from_center_size(center, Vec2::splat(query_size)).to_tile_rect()
        })
        .collect();
    let segments = centers
        .iter()
        .zip(ends.iter())
        .map(|(&start, &end)| {
            let dir = (end - start).normalize_or_zero();
            (start, start + query_size * dir)
        })
        .collect();

    world.insert_resource(mgr);
    world.insert_resource(Queries { rects, segments });
}

fn sweep_rects(mgr: Res<TileRegistrationMgr>, queries: Res<Queries>) {
    for rect in queries.rects.iter() {
        criterion::black_box(mgr.entities_in_rect(rect));
    }
}

fn sweep_segments(mgr: Res<TileRegistrationMgr>, queries: Res<Queries>) {
    for &(start, end) in queries.segments.iter() {
        criterion::black_box(mgr.entities_along_segment(start, end));
    }
}

fn sweep_benchmark(c: &mut Criterion) {
    for query_size in [1., 10., 100., 1000.] {
        for (name, segments) in [("Rect", false), ("Segment", true)] {
            let mut group = c.benchmark_group(format!("{name} Sweep - Size {query_size} tiles"));
            let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
            group.plot_config(plot_config);

            for num_entities in [100, 1000, 10_000, 100_000] {
                let mut app = App::new();
                if segments {
                    app.add_systems(Update, sweep_segments);
                } else {
                    app.add_systems(Update, sweep_rects);
                }
                setup_world(&mut app.world, num_entities, query_size);

                group.throughput(Throughput::Elements(1));
                group.bench_function(BenchmarkId::from_parameter(num_entities), |b| {
                    b.iter(|| app.update());
                });
            }

            group.finish();
        }
    }
}

criterion_group!(benches, sweep_benchmark);
criterion_main!(benches);
