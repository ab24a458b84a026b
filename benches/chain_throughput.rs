use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use simulstream::agent::{
    Agent, DetokenizerAgent, FeatureExtractorAgent, SpeechEncoderAgent, TextDecoderAgent,
};
use simulstream::config::{DecoderConfig, EncoderConfig, FeatureConfig};
use simulstream::model::{MockDetokenizer, MockSpeechEncoder, MockTranslationDecoder};
use simulstream::pipeline::{ChainPipeline, PipelineDriver};
use simulstream::{Segment, VecSource, defaults};

/// Speech-to-text chain with mock models: all measured time is framework
/// scheduling and feature extraction.
fn build_chain() -> ChainPipeline {
    let agents: Vec<std::sync::Arc<dyn Agent>> = vec![
        std::sync::Arc::new(FeatureExtractorAgent::new(FeatureConfig {
            window_ms: defaults::FEATURE_WINDOW_MS,
            shift_ms: defaults::FEATURE_SHIFT_MS,
            num_bins: defaults::FEATURE_NUM_BINS,
        })),
        std::sync::Arc::new(SpeechEncoderAgent::new(
            std::sync::Arc::new(MockSpeechEncoder::new()),
            EncoderConfig {
                block_frames: defaults::ENCODER_BLOCK_FRAMES,
            },
        )),
        std::sync::Arc::new(TextDecoderAgent::new(
            std::sync::Arc::new(MockTranslationDecoder::new().with_wait_k(4).with_stride(8)),
            DecoderConfig {
                max_len_a: defaults::DECODER_MAX_LEN_A,
                max_len_b: defaults::DECODER_MAX_LEN_B,
            },
        )),
        std::sync::Arc::new(DetokenizerAgent::new(std::sync::Arc::new(
            MockDetokenizer::new(),
        ))),
    ];
    ChainPipeline::new(agents).unwrap_or_else(|e| panic!("chain construction failed: {e}"))
}

/// Synthesized speech: `seconds` of a 440-ish tone in 100 ms chunks.
fn audio_chunks(seconds: usize) -> Vec<Segment> {
    let rate = defaults::SAMPLE_RATE as usize;
    let chunk = rate / 10;
    (0..seconds * 10)
        .map(|c| {
            Segment::samples(
                (0..chunk)
                    .map(|i| (((c * chunk + i) as f32) * 0.17).sin() * 0.4)
                    .collect(),
            )
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let pipeline = build_chain();
    let mut group = c.benchmark_group("chain_throughput");

    for seconds in [1usize, 5, 10] {
        let chunks = audio_chunks(seconds);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{seconds}s")),
            &chunks,
            |b, chunks| {
                b.iter(|| {
                    let mut source = VecSource::new(black_box(chunks.clone()));
                    pipeline
                        .run_utterance(&mut source)
                        .unwrap_or_else(|e| panic!("utterance failed: {e}"))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
