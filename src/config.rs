use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
///
/// Frozen for the lifetime of a pipeline instance; per-utterance behavior
/// never varies with configuration mid-stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub vad: VadConfig,
    pub feature: FeatureConfig,
    pub encoder: EncoderConfig,
    pub decoder: DecoderConfig,
    pub unit: UnitConfig,
}

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

/// Voice-activity gate configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub threshold: f32,
    /// Silence run that closes the current utterance (milliseconds).
    pub silence_duration_ms: u32,
    /// Hard cap on utterance length (milliseconds).
    pub max_segment_ms: u32,
}

/// Feature extraction configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Analysis window (milliseconds).
    pub window_ms: u32,
    /// Frame shift (milliseconds).
    pub shift_ms: u32,
    /// Energy bands per frame.
    pub num_bins: usize,
}

/// Speech encoder configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Minimum pending frames before an encode block runs.
    pub block_frames: usize,
}

/// Monotonic text decoder configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecoderConfig {
    /// Slope of the output length bound: max_len_a * source_frames.
    pub max_len_a: f32,
    /// Intercept of the output length bound.
    pub max_len_b: usize,
}

/// Unit decoder configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitConfig {
    /// Drop repeated n-grams from the unit stream.
    pub ngram_filtering: bool,
    /// N-gram order used when filtering is enabled.
    pub ngram_order: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::VAD_SILENCE_DURATION_MS,
            max_segment_ms: defaults::VAD_MAX_SEGMENT_MS,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_ms: defaults::FEATURE_WINDOW_MS,
            shift_ms: defaults::FEATURE_SHIFT_MS,
            num_bins: defaults::FEATURE_NUM_BINS,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            block_frames: defaults::ENCODER_BLOCK_FRAMES,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_len_a: defaults::DECODER_MAX_LEN_A,
            max_len_b: defaults::DECODER_MAX_LEN_B,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            ngram_filtering: defaults::UNIT_NGRAM_FILTERING,
            ngram_order: defaults::UNIT_NGRAM_ORDER,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist.
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - SIMULSTREAM_SAMPLE_RATE → audio.sample_rate
    /// - SIMULSTREAM_VAD_THRESHOLD → vad.threshold
    /// - SIMULSTREAM_VAD_SILENCE_MS → vad.silence_duration_ms
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(rate) = std::env::var("SIMULSTREAM_SAMPLE_RATE")
            && let Ok(rate) = rate.parse()
        {
            self.audio.sample_rate = rate;
        }

        if let Ok(threshold) = std::env::var("SIMULSTREAM_VAD_THRESHOLD")
            && let Ok(threshold) = threshold.parse()
        {
            self.vad.threshold = threshold;
        }

        if let Ok(silence) = std::env::var("SIMULSTREAM_VAD_SILENCE_MS")
            && let Ok(silence) = silence.parse()
        {
            self.vad.silence_duration_ms = silence;
        }

        self
    }

    /// Get the default configuration file path.
    ///
    /// Returns ~/.config/simulstream/config.toml on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("simulstream").join("config.toml"))
    }
}
