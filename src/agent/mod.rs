//! Incremental inference agents.
//!
//! An agent is the unit of incremental computation: it buffers upstream
//! segments in its own per-utterance [`AgentState`] and, when polled,
//! decides between reading more input and writing an output segment. The
//! drivers in [`crate::pipeline`] own the states and do all the routing;
//! an agent never touches another agent's state.

pub mod detokenizer;
pub mod feature_extractor;
pub mod speech_encoder;
pub mod state;
pub mod text_decoder;
pub mod unit_decoder;
pub mod vad_gate;
pub mod vocoder;

pub use detokenizer::DetokenizerAgent;
pub use feature_extractor::FeatureExtractorAgent;
pub use speech_encoder::SpeechEncoderAgent;
pub use state::AgentState;
pub use text_decoder::TextDecoderAgent;
pub use unit_decoder::UnitDecoderAgent;
pub use vad_gate::VadGateAgent;
pub use vocoder::VocoderAgent;

use crate::error::Result;
use crate::segment::{Action, Segment};

/// Unit of incremental computation in a streaming pipeline.
///
/// Implementations are immutable after construction (configuration and
/// model handles only); all mutable per-utterance state lives in the
/// [`AgentState`] the driver passes in. This is what allows one agent
/// instance to serve concurrent utterances.
pub trait Agent: Send + Sync {
    /// Name for routing, logging, and error reporting.
    fn name(&self) -> &'static str;

    /// Creates fresh per-utterance state for this agent.
    fn new_state(&self) -> AgentState {
        AgentState::new()
    }

    /// Buffers an upstream segment into this agent's state.
    ///
    /// The default enforces the segment contract (finished monotonicity,
    /// payload kind consistency) and accumulates the payload.
    fn receive(&self, state: &mut AgentState, segment: &Segment) -> Result<()> {
        state.receive(self.name(), segment)
    }

    /// Decides the next action: read more input, or write output.
    ///
    /// Called by the driver only while this agent's output stream is open.
    /// An agent whose source is finished must eventually write a finished
    /// segment (flushing any buffered partial output first); it must not
    /// keep reading.
    fn policy(&self, state: &mut AgentState) -> Result<Action>;
}

/// Pass-through agent echoing its buffered input under a fixed name.
///
/// Mostly useful in tests and as a placeholder node when wiring graphs.
pub struct EchoAgent {
    name: &'static str,
}

impl EchoAgent {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Agent for EchoAgent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn policy(&self, state: &mut AgentState) -> Result<Action> {
        let finished = state.source_finished();
        let payload = state.take_payload();
        if payload.is_empty() && !finished {
            return Ok(Action::Read);
        }
        if finished {
            state.mark_target_finished();
        }
        Ok(Action::Write(Segment::new(payload).with_finished(finished)))
    }
}
