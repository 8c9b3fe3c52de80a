//! Benchmarks for cubebox-render quad batching and transform math.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cubebox_render::gpu::GpuBackend;
use cubebox_render::texture::PixelFormat;
use cubebox_render::transform::{quad_corners, Mat4};
use cubebox_render::vertex::{Quad, UvRect, Vertex, WHITE};
use cubebox_render::{HeadlessBackend, QuadBatch};

/// Generate `n` quads spread over a 1080p viewport.
fn make_quads(n: usize) -> Vec<Quad> {
    (0..n)
        .map(|i| {
            let fi = i as f32;
            Quad::axis_aligned(
                (fi * 7.3) % 1920.0,
                (fi * 13.7) % 1080.0,
                8.0 + (fi * 3.1) % 32.0,
                8.0 + (fi * 5.7) % 32.0,
                UvRect::FULL,
                WHITE,
            )
        })
        .collect()
}

fn bench_submit_single_texture(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_single_texture");
    for &count in &[100, 1_000, 10_000] {
        let quads = make_quads(count);
        let mut gpu = HeadlessBackend::new(1920, 1080);
        let tex = gpu
            .create_texture(16, 16, PixelFormat::Rgba8, None)
            .expect("texture");
        let mut batch = QuadBatch::with_capacity(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &quads, |b, quads| {
            b.iter(|| {
                batch.start((1920, 1080)).expect("start");
                for quad in quads {
                    batch.submit(&mut gpu, tex.handle, black_box(quad)).expect("submit");
                }
                black_box(batch.stop(&mut gpu).expect("stop"));
                gpu.take_draw_calls();
            });
        });
    }
    group.finish();
}

fn bench_submit_alternating_textures(c: &mut Criterion) {
    let quads = make_quads(1_000);
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let a = gpu.create_texture(16, 16, PixelFormat::Rgba8, None).expect("texture");
    let b_tex = gpu.create_texture(16, 16, PixelFormat::Rgba8, None).expect("texture");
    let mut batch = QuadBatch::new();

    c.bench_function("submit_alternating_1k", |b| {
        b.iter(|| {
            batch.start((1920, 1080)).expect("start");
            for (i, quad) in quads.iter().enumerate() {
                let tex = if i % 2 == 0 { a.handle } else { b_tex.handle };
                batch.submit(&mut gpu, tex, black_box(quad)).expect("submit");
            }
            black_box(batch.stop(&mut gpu).expect("stop"));
            gpu.take_draw_calls();
        });
    });
}

fn bench_quad_corners(c: &mut Criterion) {
    c.bench_function("quad_corners_rotated", |b| {
        b.iter(|| {
            black_box(quad_corners(
                black_box(100.0),
                black_box(200.0),
                black_box(64.0),
                black_box(32.0),
                black_box(0.7),
                black_box(0.5),
                black_box(0.5),
            ));
        });
    });
}

fn bench_orthographic(c: &mut Criterion) {
    c.bench_function("Mat4::orthographic", |b| {
        b.iter(|| {
            black_box(Mat4::orthographic(black_box(1920.0), black_box(1080.0)));
        });
    });
}

fn bench_bytemuck_cast(c: &mut Criterion) {
    let vertices: Vec<Vertex> = (0..6_000)
        .map(|i| Vertex::new([i as f32, 0.0], [0.0, 0.0], WHITE))
        .collect();

    c.bench_function("bytemuck_cast_6k_vertices", |b| {
        b.iter(|| {
            let bytes: &[u8] = bytemuck::cast_slice(black_box(&vertices));
            black_box(bytes.len());
        });
    });
}

criterion_group!(
    benches,
    bench_submit_single_texture,
    bench_submit_alternating_textures,
    bench_quad_corners,
    bench_orthographic,
    bench_bytemuck_cast,
);
criterion_main!(benches);
