use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gp_core::Image;
use gp_pyr::{ScaleSpace, ScaleSpaceConfig, detect_keypoints, downsample2x2_mean_u8_to_f32};

fn build_pattern(width: usize, height: usize) -> Image<u8> {
    Image::from_fn(width, height, |x, y| ((x * 7 + y * 13) % 251) as u8)
}

fn bench_downsample_u8_to_f32(c: &mut Criterion) {
    let img = build_pattern(1280, 1024);
    let view = img.as_view();

    c.bench_function("downsample2x2_mean_u8_to_f32_1280x1024", |b| {
        b.iter(|| {
            let out = downsample2x2_mean_u8_to_f32(black_box(&view)).expect("large enough");
            black_box(out);
        });
    });
}

fn bench_scale_space(c: &mut Criterion) {
    let img = build_pattern(320, 240);
    let view = img.as_view();
    let cfg = ScaleSpaceConfig::default();

    c.bench_function("scale_space_build_320x240", |b| {
        b.iter(|| {
            let ss = ScaleSpace::build(black_box(&view), black_box(&cfg)).expect("valid config");
            black_box(ss.num_octaves());
        });
    });

    c.bench_function("detect_keypoints_320x240", |b| {
        b.iter(|| {
            let kps = detect_keypoints(black_box(&view), black_box(&cfg)).expect("valid config");
            black_box(kps.len());
        });
    });
}

criterion_group!(benches, bench_downsample_u8_to_f32, bench_scale_space);
criterion_main!(benches);
