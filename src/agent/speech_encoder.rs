//! Speech encoder agent.
//!
//! Buffers feature frames and hands them to the model encoder in blocks:
//! either when `block_frames` frames are pending, or at end of input when
//! whatever remains is flushed in one final block.

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::model::SpeechEncoder;
use crate::segment::{Action, Segment};
use std::sync::Arc;

/// Blockwise wrapper around a [`SpeechEncoder`] collaborator.
pub struct SpeechEncoderAgent {
    encoder: Arc<dyn SpeechEncoder>,
    config: EncoderConfig,
}

impl SpeechEncoderAgent {
    /// Creates an encoder agent over a shared model handle.
    pub fn new(encoder: Arc<dyn SpeechEncoder>, config: EncoderConfig) -> Self {
        Self { encoder, config }
    }
}

impl Agent for SpeechEncoderAgent {
    fn name(&self) -> &'static str {
        "speech_encoder"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let pending = state.frames(self.name())?.len();

        if pending == 0 {
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::finished_empty()));
            }
            return Ok(Action::Read);
        }

        if pending < self.config.block_frames.max(1) && !source_finished {
            return Ok(Action::Read);
        }

        let frames = state.take_frames(self.name())?;
        let encoded = self.encoder.encode(&frames)?;

        if source_finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(
            Segment::features(encoded).with_finished(source_finished),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockSpeechEncoder;
    use crate::segment::Payload;

    fn agent(block_frames: usize) -> SpeechEncoderAgent {
        SpeechEncoderAgent::new(
            Arc::new(MockSpeechEncoder::new().with_scale(2.0)),
            EncoderConfig { block_frames },
        )
    }

    fn frames(count: usize) -> Segment {
        Segment::features(vec![vec![1.0]; count])
    }

    #[test]
    fn reads_until_block_is_full() {
        let agent = agent(4);
        let mut state = agent.new_state();

        agent.receive(&mut state, &frames(3)).unwrap();
        assert_eq!(agent.policy(&mut state).unwrap(), Action::Read);

        agent.receive(&mut state, &frames(1)).unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert_eq!(segment.payload, Payload::Features(vec![vec![2.0]; 4]));
                assert!(!segment.finished);
            }
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn end_of_input_flushes_partial_block() {
        let agent = agent(4);
        let mut state = agent.new_state();

        agent
            .receive(&mut state, &frames(2).with_finished(true))
            .unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert_eq!(segment.payload.len(), 2);
                assert!(segment.finished);
            }
            other => panic!("expected write, got {:?}", other),
        }
        assert!(state.target_finished());
    }

    #[test]
    fn end_of_input_with_no_frames_emits_terminal_marker() {
        let agent = agent(4);
        let mut state = agent.new_state();

        agent.receive(&mut state, &Segment::finished_empty()).unwrap();
        match agent.policy(&mut state).unwrap() {
            Action::Write(segment) => {
                assert!(segment.finished);
                assert!(segment.is_empty());
            }
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn encoder_failure_propagates() {
        let agent = SpeechEncoderAgent::new(
            Arc::new(MockSpeechEncoder::new().with_failure()),
            EncoderConfig { block_frames: 1 },
        );
        let mut state = agent.new_state();

        agent.receive(&mut state, &frames(1)).unwrap();
        assert!(agent.policy(&mut state).is_err());
    }

    #[test]
    fn empty_buffer_reads() {
        let agent = agent(1);
        let mut state = agent.new_state();
        assert_eq!(agent.policy(&mut state).unwrap(), Action::Read);
    }
}
