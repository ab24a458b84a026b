//! Monotonic text decoder agent.
//!
//! Drives a [`TranslationDecoder`] policy over the growing prefix of
//! encoder states: tokens are committed left-to-right, one write per
//! token, without revisiting earlier source context. Output length is
//! bounded by `max_len_a * source_frames + max_len_b`. When the source
//! finishes, the decoder flushes its remaining tokens and then closes the
//! stream with a finished-empty marker.

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::config::DecoderConfig;
use crate::error::Result;
use crate::model::{DecoderDecision, TranslationDecoder};
use crate::segment::{Action, Segment};
use std::sync::Arc;

/// Incremental monotonic decoding over buffered encoder states.
pub struct TextDecoderAgent {
    decoder: Arc<dyn TranslationDecoder>,
    config: DecoderConfig,
}

impl TextDecoderAgent {
    /// Creates a decoder agent over a shared model handle.
    pub fn new(decoder: Arc<dyn TranslationDecoder>, config: DecoderConfig) -> Self {
        Self { decoder, config }
    }

    fn max_len(&self, source_frames: usize) -> usize {
        (self.config.max_len_a * source_frames as f32) as usize + self.config.max_len_b
    }
}

impl Agent for TextDecoderAgent {
    fn name(&self) -> &'static str {
        "text_decoder"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let source_frames = state.frames(self.name())?.len();

        if state.decoder_tokens().len() >= self.max_len(source_frames) {
            state.mark_target_finished();
            return Ok(Action::Write(Segment::finished_empty()));
        }

        let decision =
            self.decoder
                .step(state.frames(self.name())?, state.decoder_tokens(), source_finished)?;

        match decision {
            DecoderDecision::Read => {
                if source_finished {
                    // The decoder has nothing left to flush
                    state.mark_target_finished();
                    return Ok(Action::Write(Segment::finished_empty()));
                }
                Ok(Action::Read)
            }
            DecoderDecision::Token(token) => {
                state.decoder_scratch().tokens.push(token);
                Ok(Action::Write(Segment::tokens(vec![token])))
            }
            DecoderDecision::Finished => {
                state.mark_target_finished();
                Ok(Action::Write(Segment::finished_empty()))
            }
        }
    }
}
