//! Vocoder agent: discrete units in, waveform samples out.

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::error::Result;
use crate::model::Vocoder;
use crate::segment::{Action, Segment};
use std::sync::Arc;

/// Batchwise wrapper around a [`Vocoder`] collaborator.
pub struct VocoderAgent {
    vocoder: Arc<dyn Vocoder>,
}

impl VocoderAgent {
    /// Creates a vocoder agent over a shared model handle.
    pub fn new(vocoder: Arc<dyn Vocoder>) -> Self {
        Self { vocoder }
    }
}

impl Agent for VocoderAgent {
    fn name(&self) -> &'static str {
        "vocoder"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let units = state.take_units(self.name())?;

        if units.is_empty() {
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::finished_empty()));
            }
            return Ok(Action::Read);
        }

        let waveform = self.vocoder.synthesize(&units)?;

        if source_finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(
            Segment::waveform(waveform).with_finished(source_finished),
        ))
    }
}
