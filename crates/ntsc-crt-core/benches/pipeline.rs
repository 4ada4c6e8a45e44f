//! Benchmarks for the signal pipeline hot paths
//!
//! Run with: cargo bench --bench pipeline -p ntsc-crt

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ntsc_crt::{Crt, NtscSource};
use std::hint::black_box;

const SRC_W: usize = 320;
const SRC_H: usize = 240;

fn test_image() -> Vec<u32> {
    (0..SRC_W * SRC_H)
        .map(|i| {
            let x = (i % SRC_W) as u32;
            let y = (i / SRC_W) as u32;
            ((x & 0xff) << 16) | ((y & 0xff) << 8) | ((x ^ y) & 0xff)
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let img = test_image();
    let mut group = c.benchmark_group("encode");

    for color in [false, true] {
        let mut crt = Crt::new(640, 480).unwrap();
        let src = NtscSource {
            rgb: &img,
            width: SRC_W,
            height: SRC_H,
            field: 0,
            as_color: color,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(if color { "color" } else { "mono" }),
            &color,
            |b, _| {
                b.iter(|| crt.encode(black_box(&src)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let img = test_image();
    let mut group = c.benchmark_group("decode");

    for noise in [0u8, 24, 120] {
        let mut crt = Crt::new(640, 480).unwrap();
        let mut out = vec![0u32; 640 * 480];
        let src = NtscSource {
            rgb: &img,
            width: SRC_W,
            height: SRC_H,
            field: 0,
            as_color: true,
        };
        crt.encode(&src).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(noise), &noise, |b, &noise| {
            b.iter(|| crt.decode(black_box(noise), &mut out).unwrap());
        });
    }

    group.finish();
}

fn bench_full_field(c: &mut Criterion) {
    let img = test_image();
    let mut crt = Crt::new(640, 480).unwrap();
    let mut out = vec![0u32; 640 * 480];

    c.bench_function("interlaced_field_pair", |b| {
        b.iter(|| {
            for field in 0u8..2 {
                let src = NtscSource {
                    rgb: &img,
                    width: SRC_W,
                    height: SRC_H,
                    field,
                    as_color: true,
                };
                crt.encode(black_box(&src)).unwrap();
                crt.decode(black_box(24), &mut out).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_full_field);
criterion_main!(benches);
