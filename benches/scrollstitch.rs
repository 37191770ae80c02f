use criterion::{criterion_group, criterion_main, Criterion};
use scrollstitch::lowlevel::resize_rgb_bilinear;
use scrollstitch::{Frame, MemorySource, ScrollEstimator, StitchParams, Stitcher};
use std::hint::black_box;

fn make_page(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y) ^ (y * y / 5)) & 0xFF;
            data.extend_from_slice(&[value as u8, (value as u8).wrapping_mul(3), !(value as u8)]);
        }
    }
    data
}

fn window(page: &[u8], width: usize, top: usize, rows: usize) -> Frame {
    let stride = width * 3;
    Frame::from_rgb(page[top * stride..(top + rows) * stride].to_vec(), width, rows).unwrap()
}

fn bench_estimate(c: &mut Criterion) {
    let (width, rows) = (360, 640);
    let page = make_page(width, rows + 200);
    let frame = window(&page, width, 120, rows);
    let previous = window(&page, width, 0, rows);
    let tpl = previous.luma().bottom(100);
    let estimator = ScrollEstimator::new();

    c.bench_function("estimate_360x640_tpl100", |b| {
        b.iter(|| {
            let matched = estimator
                .estimate(black_box(tpl), black_box(frame.luma()))
                .unwrap();
            black_box(matched);
        })
    });
}

fn bench_resize(c: &mut Criterion) {
    let (width, rows) = (720, 1280);
    let page = make_page(width, rows);
    let frame = window(&page, width, 0, rows);

    c.bench_function("resize_720x1280_to_360", |b| {
        b.iter(|| {
            let out = resize_rgb_bilinear(black_box(&frame), 360, 640).unwrap();
            black_box(out);
        })
    });
}

fn bench_run(c: &mut Criterion) {
    let (width, rows) = (240, 400);
    let page = make_page(width, rows + 19 * 30);
    let frames: Vec<Frame> = (0..20).map(|i| window(&page, width, i * 30, rows)).collect();

    c.bench_function("stitch_20_frames_240x400", |b| {
        b.iter(|| {
            let source = MemorySource::new(frames.clone(), 30.0);
            let output = Stitcher::new(source, StitchParams::default())
                .unwrap()
                .run()
                .unwrap();
            black_box(output.summary);
        })
    });
}

criterion_group!(benches, bench_estimate, bench_resize, bench_run);
criterion_main!(benches);
