//! Benchmark for full-detector mosaic assembly.
//! Run with: cargo bench -p tessera --bench assemble

use std::hint::black_box;

use common::log_setup::setup_logging;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tessera::{
    assemble_with_config, AssemblyConfig, BiasMode, Buffer2, DetectorMosaic, GeometryResolver,
    InMemoryPixelSource,
};

/// Sixteen default-size readouts with a gentle ramp over a 1000 ADU bias.
fn synthetic_detector() -> (DetectorMosaic, InMemoryPixelSource) {
    let resolver = GeometryResolver::default();
    let mosaic = DetectorMosaic::from_fixed_layout("bench", &resolver).unwrap();
    let layout = resolver.layout();

    let mut source = InMemoryPixelSource::new();
    for amp in &mosaic {
        let (width, height) = amp.footprint(false);
        let pixels = (0..width * height)
            .map(|i| 1000.0 + (i % 97) as f32)
            .collect();
        source.insert(amp.channel_id(), Buffer2::new(width, height, pixels));
    }
    assert_eq!(source.len(), layout.fixed_channel_count() as usize);

    (mosaic, source)
}

fn benchmark_assemble(c: &mut Criterion) {
    // Only warnings while measuring.
    setup_logging("warn");

    let (mosaic, source) = synthetic_detector();
    let (width, height) = mosaic.mosaic_size(false);

    let mut group = c.benchmark_group("assemble");
    group.sample_size(20);
    group.throughput(Throughput::Elements((width * height) as u64));

    let configs = [
        ("untrimmed", AssemblyConfig::untrimmed()),
        ("per_row", AssemblyConfig::trimmed(BiasMode::PerRow)),
        ("clipped_mean", AssemblyConfig::trimmed(BiasMode::clipped_mean())),
    ];

    for (name, config) in configs {
        for parallel in [false, true] {
            let config = config.clone().with_parallel(parallel);
            let label = if parallel { "parallel" } else { "serial" };

            group.bench_function(BenchmarkId::new(name, label), |b| {
                b.iter(|| {
                    let result =
                        assemble_with_config(black_box(&mosaic), black_box(&source), &config)
                            .unwrap();
                    black_box(result)
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_assemble);
criterion_main!(benches);
