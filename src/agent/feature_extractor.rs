//! Online feature extraction agent.
//!
//! Windows raw samples into frames of log band energies. Frames are
//! emitted as soon as complete windows are available; the tail that does
//! not fill a window stays buffered until more audio arrives, and is
//! dropped at end of input (a partial window has no valid frame).

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::config::FeatureConfig;
use crate::defaults;
use crate::error::Result;
use crate::segment::{Action, Payload, Segment};

/// Incremental sample-to-frame converter.
pub struct FeatureExtractorAgent {
    config: FeatureConfig,
    sample_rate: u32,
}

impl FeatureExtractorAgent {
    /// Creates an extractor with the given configuration at the default
    /// sample rate.
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }

    /// Sets the sample rate used to size windows.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    fn window_samples(&self) -> usize {
        (u64::from(self.sample_rate) * u64::from(self.config.window_ms) / 1_000).max(1) as usize
    }

    fn shift_samples(&self) -> usize {
        (u64::from(self.sample_rate) * u64::from(self.config.shift_ms) / 1_000).max(1) as usize
    }

    fn frame(&self, window: &[f32]) -> Vec<f32> {
        let bins = self.config.num_bins.max(1);
        let band_len = window.len().div_ceil(bins);
        (0..bins)
            .map(|bin| {
                let start = bin * band_len;
                let end = ((bin + 1) * band_len).min(window.len());
                if start >= end {
                    return f32::ln(1e-10);
                }
                let band = &window[start..end];
                let energy: f32 =
                    band.iter().map(|s| s * s).sum::<f32>() / band.len() as f32;
                (energy + 1e-10).ln()
            })
            .collect()
    }
}

impl Agent for FeatureExtractorAgent {
    fn name(&self) -> &'static str {
        "feature_extractor"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let samples = state.take_samples(self.name())?;

        let window = self.window_samples();
        let shift = self.shift_samples();

        let mut frames = Vec::new();
        let mut offset = 0;
        while offset + window <= samples.len() {
            frames.push(self.frame(&samples[offset..offset + window]));
            offset += shift;
        }

        // Keep the unconsumed tail for the next chunk; at end of input the
        // partial window is dropped.
        if !source_finished && offset < samples.len() {
            state.restore_front(self.name(), Payload::Samples(samples[offset..].to_vec()))?;
        }

        if frames.is_empty() {
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::finished_empty()));
            }
            return Ok(Action::Read);
        }

        if source_finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(
            Segment::features(frames).with_finished(source_finished),
        ))
    }
}
