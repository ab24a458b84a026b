//! Default values for simulstream tunables.
//!
//! Every magic number lives here so pipeline behavior is auditable in one
//! place. All values can be overridden through [`crate::config::Config`].

/// Audio sample rate the framework assumes (Hz).
pub const SAMPLE_RATE: u32 = 16_000;

/// RMS level above which a frame counts as speech (0.0..=1.0).
pub const VAD_THRESHOLD: f32 = 0.02;

/// Silence run that ends an utterance (milliseconds).
pub const VAD_SILENCE_DURATION_MS: u32 = 2_000;

/// Hard cap on a single utterance before the VAD gate force-closes it
/// (milliseconds).
pub const VAD_MAX_SEGMENT_MS: u32 = 20_000;

/// Feature extraction analysis window (milliseconds).
pub const FEATURE_WINDOW_MS: u32 = 25;

/// Feature extraction frame shift (milliseconds).
pub const FEATURE_SHIFT_MS: u32 = 10;

/// Number of energy bands per feature frame.
pub const FEATURE_NUM_BINS: usize = 80;

/// Minimum number of pending feature frames before the speech encoder
/// runs a block.
pub const ENCODER_BLOCK_FRAMES: usize = 8;

/// Slope of the decoder output length bound: max_len_a * source_frames.
pub const DECODER_MAX_LEN_A: f32 = 0.125;

/// Intercept of the decoder output length bound.
pub const DECODER_MAX_LEN_B: usize = 200;

/// Whether repeated n-grams are filtered out of the unit stream.
pub const UNIT_NGRAM_FILTERING: bool = false;

/// N-gram order used when unit filtering is enabled.
pub const UNIT_NGRAM_ORDER: usize = 3;
