//! Voice-activity gate agent.
//!
//! Sits next to the source and segments a continuous audio stream into
//! utterances: leading silence is swallowed, speech passes through, and a
//! sufficiently long silence run (or the max-segment cap) closes the
//! current utterance with a finished segment. This is the only agent that
//! creates utterance boundaries on its own; everywhere else boundaries
//! come from the external source ending.

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::config::VadConfig;
use crate::defaults;
use crate::error::Result;
use crate::segment::{Action, Segment};

/// RMS-threshold speech gate with silence-run utterance segmentation.
pub struct VadGateAgent {
    config: VadConfig,
    sample_rate: u32,
}

impl VadGateAgent {
    /// Creates a gate with the given configuration at the default sample rate.
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }

    /// Sets the sample rate used to convert chunk lengths to durations.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    fn chunk_ms(&self, samples: usize) -> u32 {
        (samples as u64 * 1_000 / u64::from(self.sample_rate.max(1))) as u32
    }
}

impl Agent for VadGateAgent {
    fn name(&self) -> &'static str {
        "vad_gate"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let samples = state.take_samples(self.name())?;

        if samples.is_empty() {
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::finished_empty()));
            }
            return Ok(Action::Read);
        }

        let chunk_ms = self.chunk_ms(samples.len());
        let is_speech = calculate_rms(&samples) > self.config.threshold;
        let scratch = state.vad_scratch();

        if !scratch.in_speech {
            if !is_speech {
                // Leading silence: suppress downstream flow entirely
                if source_finished {
                    state.mark_target_finished();
                    return Ok(Action::Write(Segment::finished_empty()));
                }
                return Ok(Action::Read);
            }
            scratch.in_speech = true;
            scratch.silence_ms = 0;
            scratch.segment_ms = chunk_ms;
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::samples(samples).with_finished(true)));
            }
            return Ok(Action::Write(Segment::samples(samples)));
        }

        scratch.segment_ms = scratch.segment_ms.saturating_add(chunk_ms);
        if is_speech {
            scratch.silence_ms = 0;
        } else {
            scratch.silence_ms = scratch.silence_ms.saturating_add(chunk_ms);
        }

        let boundary = source_finished
            || scratch.silence_ms >= self.config.silence_duration_ms
            || scratch.segment_ms >= self.config.max_segment_ms;

        if boundary {
            state.mark_target_finished();
            return Ok(Action::Write(Segment::samples(samples).with_finished(true)));
        }
        Ok(Action::Write(Segment::samples(samples)))
    }
}

/// Root-mean-square level of normalized samples (0.0 = silence).
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Payload;

    fn gate(silence_ms: u32) -> VadGateAgent {
        VadGateAgent::new(VadConfig {
            threshold: 0.02,
            silence_duration_ms: silence_ms,
            max_segment_ms: 60_000,
        })
        .with_sample_rate(1_000) // 1 sample = 1 ms, keeps tests readable
    }

    fn speech(ms: usize) -> Segment {
        Segment::samples(vec![0.5; ms])
    }

    fn silence(ms: usize) -> Segment {
        Segment::samples(vec![0.0; ms])
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(calculate_rms(&[0.0; 64]), 0.0);
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((calculate_rms(&[0.5; 64]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn leading_silence_is_suppressed() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent.receive(&mut state, &silence(100)).unwrap();
        assert_eq!(agent.policy(&mut state).unwrap(), Action::Read);
        agent.receive(&mut state, &silence(100)).unwrap();
        assert_eq!(agent.policy(&mut state).unwrap(), Action::Read);
    }

    #[test]
    fn speech_passes_through() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent.receive(&mut state, &speech(100)).unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert_eq!(segment.payload.len(), 100);
                assert!(!segment.finished);
            }
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn long_silence_closes_utterance() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent.receive(&mut state, &speech(100)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));

        // 100ms silence: below threshold, still open
        agent.receive(&mut state, &silence(100)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));

        // 200ms accumulated: boundary
        agent.receive(&mut state, &silence(100)).unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => assert!(segment.finished),
            other => panic!("expected write, got {:?}", other),
        }
        assert!(state.target_finished());
    }

    #[test]
    fn speech_resets_silence_run() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent.receive(&mut state, &speech(100)).unwrap();
        agent.policy(&mut state).unwrap();
        agent.receive(&mut state, &silence(150)).unwrap();
        agent.policy(&mut state).unwrap();
        // Speech again before the threshold: run resets
        agent.receive(&mut state, &speech(100)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));
        // Another 150ms silence alone must not close the utterance
        agent.receive(&mut state, &silence(150)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));
    }

    #[test]
    fn max_segment_cap_forces_boundary() {
        let agent = VadGateAgent::new(VadConfig {
            threshold: 0.02,
            silence_duration_ms: 10_000,
            max_segment_ms: 250,
        })
        .with_sample_rate(1_000);
        let mut state = agent.new_state();

        agent.receive(&mut state, &speech(100)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));
        agent.receive(&mut state, &speech(100)).unwrap();
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if !s.finished));
        agent.receive(&mut state, &speech(100)).unwrap();
        // 300ms >= 250ms cap
        assert!(matches!(agent.policy(&mut state).unwrap(), Action::Write(s) if s.finished));
    }

    #[test]
    fn end_of_input_flushes_finished_marker() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent.receive(&mut state, &Segment::finished_empty()).unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert!(segment.finished);
                assert_eq!(segment.payload, Payload::Empty);
            }
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn end_of_input_during_speech_closes_with_data() {
        let agent = gate(200);
        let mut state = agent.new_state();

        agent
            .receive(&mut state, &speech(100).with_finished(true))
            .unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert_eq!(segment.payload.len(), 100);
                assert!(segment.finished);
            }
            other => panic!("expected write, got {:?}", other),
        }
    }
}
