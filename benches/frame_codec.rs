use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::f32::consts::PI;
use std::hint::black_box;
use voxlpc::analysis::{FrameClassifier, PitchEstimator};
use voxlpc::codec::{CodecConfig, LpcPipeline};
use voxlpc::defaults;
use voxlpc::lpc::LevinsonLpc;

/// One second of a voiced-like signal: 150 Hz fundamental plus a harmonic.
fn speech_like(sample_rate: u32) -> Vec<f32> {
    (0..sample_rate as usize)
        .map(|n| {
            let t = n as f32 / sample_rate as f32;
            0.6 * (2.0 * PI * 150.0 * t).sin() + 0.2 * (2.0 * PI * 450.0 * t).sin()
        })
        .collect()
}

fn bench_analysis(c: &mut Criterion) {
    let signal = speech_like(defaults::SAMPLE_RATE);
    let frame = &signal[..defaults::WINDOW_SIZE];
    let classifier = FrameClassifier::default();
    let estimator = PitchEstimator::default();

    c.bench_function("classify_frame", |b| {
        b.iter(|| classifier.classify(black_box(frame)))
    });
    c.bench_function("amdf_pitch_frame", |b| {
        b.iter(|| estimator.estimate(black_box(frame)))
    });
}

fn bench_codec(c: &mut Criterion) {
    let signal = speech_like(defaults::SAMPLE_RATE);
    let mut group = c.benchmark_group("lpc_codec");
    group.throughput(Throughput::Elements(signal.len() as u64));

    for order in [10usize, 32, 64] {
        let config = CodecConfig {
            order,
            ..CodecConfig::default()
        };
        let Ok(pipeline) = LpcPipeline::new(LevinsonLpc::default(), config) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("encode", order), &signal, |b, signal| {
            b.iter(|| pipeline.encode(black_box(signal)))
        });

        let Ok(encoded) = pipeline.encode(&signal) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("decode", order), &encoded, |b, encoded| {
            b.iter(|| pipeline.decode(black_box(encoded)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_codec);
criterion_main!(benches);
