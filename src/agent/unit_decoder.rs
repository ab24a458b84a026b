//! Non-autoregressive unit decoder agent.
//!
//! Converts newly committed text tokens into discrete acoustic units in
//! one shot per batch, with optional suppression of immediately repeated
//! n-grams in the unit stream (a common artifact of non-autoregressive
//! generation).

use crate::agent::state::AgentState;
use crate::agent::Agent;
use crate::config::UnitConfig;
use crate::error::Result;
use crate::model::UnitGenerator;
use crate::segment::{Action, Segment};
use std::sync::Arc;

/// Batchwise wrapper around a [`UnitGenerator`] collaborator.
pub struct UnitDecoderAgent {
    generator: Arc<dyn UnitGenerator>,
    config: UnitConfig,
}

impl UnitDecoderAgent {
    /// Creates a unit decoder agent over a shared model handle.
    pub fn new(generator: Arc<dyn UnitGenerator>, config: UnitConfig) -> Self {
        Self { generator, config }
    }
}

impl Agent for UnitDecoderAgent {
    fn name(&self) -> &'static str {
        "unit_decoder"
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

        let mut units = self.generator.generate(&tokens)?;
        if self.config.ngram_filtering {
            units = filter_repeated_ngrams(&units, self.config.ngram_order);
        }

        if source_finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(
            Segment::units(units).with_finished(source_finished),
        ))
    }
}

/// Drops n-grams that immediately repeat the preceding n-gram.
///
/// `[1, 2, 3, 2, 3, 4]` with order 2 becomes `[1, 2, 3, 4]`.
pub fn filter_repeated_ngrams(units: &[u32], order: usize) -> Vec<u32> {
    if order == 0 {
        return units.to_vec();
    }
    let mut out: Vec<u32> = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if out.len() >= order
            && i + order <= units.len()
            && out[out.len() - order..] == units[i..i + order]
        {
            i += order;
        } else {
            out.push(units[i]);
            i += 1;
        }
    }
    out
}
