//! Model inference collaborators.
//!
//! The pipeline framework does not know anything about the underlying
//! neural networks. Each inference stage is a trait taking tensors-in and
//! producing tensors-out; real model bindings implement these, and the
//! mocks here stand in for tests and development.
//!
//! All traits are object safe so agents can hold `Arc<dyn …>` and share
//! one stateless model across concurrent utterances.

use crate::error::{Result, SimulstreamError};

/// Speech encoder: feature frames in, encoder states out.
pub trait SpeechEncoder: Send + Sync {
    /// Encodes a block of feature frames into encoder states.
    fn encode(&self, frames: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;

    /// Model name for logging.
    fn name(&self) -> &str {
        "speech_encoder"
    }
}

/// One monotonic decoding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderDecision {
    /// Not enough source context yet; wait for more encoder states.
    Read,
    /// Commit the next output token.
    Token(u32),
    /// Translation complete for this utterance.
    Finished,
}

/// Monotonic text decoder policy.
///
/// Pure function of the encoder states seen so far and the tokens already
/// committed; the agent owns all mutable per-utterance state.
pub trait TranslationDecoder: Send + Sync {
    /// Decides the next action given the current source/target context.
    fn step(
        &self,
        encoder_states: &[Vec<f32>],
        tokens: &[u32],
        source_finished: bool,
    ) -> Result<DecoderDecision>;

    /// Model name for logging.
    fn name(&self) -> &str {
        "text_decoder"
    }
}

/// Non-autoregressive unit generator: text tokens in, acoustic units out.
pub trait UnitGenerator: Send + Sync {
    /// Generates units for a batch of newly committed tokens.
    fn generate(&self, tokens: &[u32]) -> Result<Vec<u32>>;
}

/// Vocoder: acoustic units in, waveform samples out.
pub trait Vocoder: Send + Sync {
    /// Synthesizes waveform for a batch of units.
    fn synthesize(&self, units: &[u32]) -> Result<Vec<f32>>;
}

/// Detokenizer: token ids in, readable text out.
pub trait Detokenizer: Send + Sync {
    /// Renders a batch of tokens as text.
    fn detokenize(&self, tokens: &[u32]) -> Result<String>;
}

fn inference_error(stage: &str, message: &str) -> SimulstreamError {
    SimulstreamError::Inference {
        stage: stage.to_string(),
        message: message.to_string(),
    }
}

/// Mock encoder for testing: passes frames through, optionally scaled.
#[derive(Debug, Clone)]
pub struct MockSpeechEncoder {
    scale: f32,
    should_fail: bool,
}

impl Default for MockSpeechEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpeechEncoder {
    /// Identity encoder.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            should_fail: false,
        }
    }

    /// Scales every coefficient, making encoded frames distinguishable
    /// from raw features in assertions.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Configure the mock to fail on encode.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechEncoder for MockSpeechEncoder {
    fn encode(&self, frames: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        if self.should_fail {
            return Err(inference_error("encoder", "mock encode failure"));
        }
        Ok(frames
            .iter()
            .map(|frame| frame.iter().map(|x| x * self.scale).collect())
            .collect())
    }

    fn name(&self) -> &str {
        "mock-encoder"
    }
}

/// Mock monotonic decoder implementing a wait-k policy.
///
/// Token `i` may be committed once `wait_k + i * stride` encoder states
/// have arrived; when the source is finished the remaining tokens up to
/// `states / stride` are flushed. Token ids are `vocab_offset + i`.
#[derive(Debug, Clone)]
pub struct MockTranslationDecoder {
    wait_k: usize,
    stride: usize,
    vocab_offset: u32,
    should_fail: bool,
}

impl Default for MockTranslationDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranslationDecoder {
    /// Wait-1 decoder emitting one token per encoder state.
    pub fn new() -> Self {
        Self {
            wait_k: 1,
            stride: 1,
            vocab_offset: 0,
            should_fail: false,
        }
    }

    /// Number of encoder states to wait for before the first token.
    pub fn with_wait_k(mut self, wait_k: usize) -> Self {
        self.wait_k = wait_k;
        self
    }

    /// Encoder states consumed per committed token.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Base value for emitted token ids.
    pub fn with_vocab_offset(mut self, offset: u32) -> Self {
        self.vocab_offset = offset;
        self
    }

    /// Configure the mock to fail on step.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    fn target_len(&self, states: usize) -> usize {
        states.div_ceil(self.stride)
    }
}

impl TranslationDecoder for MockTranslationDecoder {
    fn step(
        &self,
        encoder_states: &[Vec<f32>],
        tokens: &[u32],
        source_finished: bool,
    ) -> Result<DecoderDecision> {
        if self.should_fail {
            return Err(inference_error("decoder", "mock decode failure"));
        }

        let states = encoder_states.len();
        let next = tokens.len();

        if source_finished {
            if next < self.target_len(states) {
                return Ok(DecoderDecision::Token(self.vocab_offset + next as u32));
            }
            return Ok(DecoderDecision::Finished);
        }

        if states >= self.wait_k + next * self.stride {
            Ok(DecoderDecision::Token(self.vocab_offset + next as u32))
        } else {
            Ok(DecoderDecision::Read)
        }
    }

    fn name(&self) -> &str {
        "mock-decoder"
    }
}

/// Mock unit generator: expands each token into a fixed number of units.
#[derive(Debug, Clone)]
pub struct MockUnitGenerator {
    units_per_token: usize,
    should_fail: bool,
}

impl Default for MockUnitGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUnitGenerator {
    /// Two units per token: `[t * 2, t * 2 + 1]`.
    pub fn new() -> Self {
        Self {
            units_per_token: 2,
            should_fail: false,
        }
    }

    /// Units emitted per input token.
    pub fn with_units_per_token(mut self, count: usize) -> Self {
        self.units_per_token = count.max(1);
        self
    }

    /// Configure the mock to fail on generate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl UnitGenerator for MockUnitGenerator {
    fn generate(&self, tokens: &[u32]) -> Result<Vec<u32>> {
        if self.should_fail {
            return Err(inference_error("unit_generator", "mock generate failure"));
        }
        Ok(tokens
            .iter()
            .flat_map(|&t| {
                (0..self.units_per_token as u32).map(move |i| t * self.units_per_token as u32 + i)
            })
            .collect())
    }
}

/// Mock vocoder: emits a deterministic sample block per unit.
#[derive(Debug, Clone)]
pub struct MockVocoder {
    samples_per_unit: usize,
    should_fail: bool,
}

impl Default for MockVocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVocoder {
    pub fn new() -> Self {
        Self {
            samples_per_unit: 4,
            should_fail: false,
        }
    }

    /// Waveform samples synthesized per unit.
    pub fn with_samples_per_unit(mut self, count: usize) -> Self {
        self.samples_per_unit = count.max(1);
        self
    }

    /// Configure the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Vocoder for MockVocoder {
    fn synthesize(&self, units: &[u32]) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(inference_error("vocoder", "mock synthesis failure"));
        }
        Ok(units
            .iter()
            .flat_map(|&u| {
                let value = (u % 8) as f32 * 0.1;
                std::iter::repeat_n(value, self.samples_per_unit)
            })
            .collect())
    }
}

/// Mock detokenizer: looks tokens up in a vocabulary, falling back to
/// `tok<N>` for out-of-vocabulary ids. Words are space-joined.
#[derive(Debug, Clone, Default)]
pub struct MockDetokenizer {
    vocab: Vec<String>,
    should_fail: bool,
}

impl MockDetokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocabulary indexed by token id.
    pub fn with_vocab(mut self, vocab: Vec<&str>) -> Self {
        self.vocab = vocab.into_iter().map(str::to_string).collect();
        self
    }

    /// Configure the mock to fail on detokenize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Detokenizer for MockDetokenizer {
    fn detokenize(&self, tokens: &[u32]) -> Result<String> {
        if self.should_fail {
            return Err(inference_error("detokenizer", "mock detokenize failure"));
        }
        Ok(tokens
            .iter()
            .map(|&t| {
                self.vocab
                    .get(t as usize)
                    .cloned()
                    .unwrap_or_else(|| format!("tok{t}"))
            })
            .collect::<Vec<_>>()
            .join(" "))
    }
}
