//! Detokenizer agent: token ids in, readable text out.

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::error::Result;
use crate::model::Detokenizer;
use crate::segment::{Action, Segment};
use std::sync::Arc;

/// Batchwise wrapper around a [`Detokenizer`] collaborator.
pub struct DetokenizerAgent {
    detokenizer: Arc<dyn Detokenizer>,
}

impl DetokenizerAgent {
    /// Creates a detokenizer agent over a shared handle.
    pub fn new(detokenizer: Arc<dyn Detokenizer>) -> Self {
        Self { detokenizer }
    }
}

impl Agent for DetokenizerAgent {
    fn name(&self) -> &'static str {
        "detokenizer"
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let source_finished = state.source_finished();
        let tokens = state.take_tokens(self.name())?;

        if tokens.is_empty() {
            if source_finished {
                state.mark_target_finished();
                return Ok(Action::Write(Segment::finished_empty()));
            }
            return Ok(Action::Read);
        }

        let text = self.detokenizer.detokenize(&tokens)?;

        if source_finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(Segment::text(text).with_finished(source_finished)))
    }
}
