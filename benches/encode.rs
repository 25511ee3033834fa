use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use qrlinkr::services::qr;
use qrlinkr::types::{EcLevel, OutputFormat, QrConfig};

fn bench_config() -> QrConfig {
    QrConfig {
        url: "https://example.com/some/fairly/long/path?with=params".to_string(),
        format: OutputFormat::Png,
        size: 300,
        dark_color: "#000000".to_string(),
        light_color: "#ffffff".to_string(),
        error_correction_level: EcLevel::M,
        margin: 4,
    }
}

fn encode_benchmarks(c: &mut Criterion) {
    let config = bench_config();

    c.bench_function("encode_png_300", |b| {
        b.iter(|| qr::encode_png(black_box(&config)).unwrap())
    });
    c.bench_function("encode_svg_300", |b| {
        b.iter(|| qr::encode_svg(black_box(&config)).unwrap())
    });
    c.bench_function("encode_data_url_300", |b| {
        b.iter(|| qr::encode_data_url(black_box(&config)).unwrap())
    });
}

criterion_group!(benches, encode_benchmarks);
criterion_main!(benches);
