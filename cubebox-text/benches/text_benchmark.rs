use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cubebox_render::HeadlessBackend;
use cubebox_text::{
    decode, layout_text, FontRegistry, LineMetrics, OutlineRasterizer, RasterizedGlyph, Skyline,
};

/// Fixed-size boxes for every printable ASCII codepoint.
struct Boxes;

impl OutlineRasterizer for Boxes {
    fn rasterize(&self, codepoint: u32, pixel_size: f32) -> Option<RasterizedGlyph> {
        if !(0x21..0x7F).contains(&codepoint) {
            return None;
        }
        let w = (pixel_size * 0.6) as u32;
        let h = pixel_size as u32;
        Some(RasterizedGlyph {
            width: w,
            height: h,
            bitmap: vec![255; (w * h) as usize],
            advance: pixel_size * 0.6,
            bearing_x: 0.0,
            bearing_y: -pixel_size,
        })
    }

    fn line_metrics(&self, pixel_size: f32) -> LineMetrics {
        LineMetrics {
            ascent: pixel_size * 0.8,
            descent: -pixel_size * 0.2,
            line_gap: 0.0,
        }
    }
}

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. \
    Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

fn bench_utf8_decode(c: &mut Criterion) {
    let mixed = "héllo wörld — 世界 🌍 ".repeat(64);
    c.bench_function("utf8_decode_mixed", |b| {
        b.iter(|| black_box(decode(black_box(mixed.as_bytes())).count()));
    });
}

fn bench_skyline_pack(c: &mut Criterion) {
    c.bench_function("skyline_pack_500", |b| {
        b.iter(|| {
            let mut sky = Skyline::new(1024);
            for i in 0..500u32 {
                black_box(sky.pack(5 + i % 23, 8 + i % 17));
            }
        });
    });
}

fn bench_layout_cached(c: &mut Criterion) {
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let mut fonts = FontRegistry::default();
    let font = fonts.load_with(Box::new(Boxes), 16.0).expect("font");
    // Warm the cache so the loop measures layout only.
    layout_text(&mut fonts, &mut gpu, font, PARAGRAPH.as_bytes(), 0.0, 0.0).expect("layout");

    c.bench_function("layout_paragraph_cached", |b| {
        b.iter(|| {
            black_box(
                layout_text(&mut fonts, &mut gpu, font, black_box(PARAGRAPH.as_bytes()), 0.0, 20.0)
                    .expect("layout"),
            )
        });
    });
}

fn bench_layout_cold(c: &mut Criterion) {
    c.bench_function("layout_paragraph_cold", |b| {
        b.iter(|| {
            let mut gpu = HeadlessBackend::new(1920, 1080);
            let mut fonts = FontRegistry::default();
            let font = fonts.load_with(Box::new(Boxes), 16.0).expect("font");
            black_box(
                layout_text(&mut fonts, &mut gpu, font, PARAGRAPH.as_bytes(), 0.0, 20.0)
                    .expect("layout"),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_utf8_decode,
    bench_skyline_pack,
    bench_layout_cached,
    bench_layout_cold,
);
criterion_main!(benches);
