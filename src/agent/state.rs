//! Per-utterance agent state.
//!
//! Every agent owns exactly one [`AgentState`] per utterance: the buffer of
//! unconsumed upstream input plus agent-kind scratch (committed decoder
//! tokens, VAD speech-run tracking). The driver creates states fresh at
//! utterance start and drops them at utterance end or on abort; nothing is
//! shared across utterances.

use crate::error::{Result, SimulstreamError};
use crate::segment::{Payload, Segment};

/// Mutable per-utterance state for one agent.
#[derive(Debug)]
pub struct AgentState {
    source: Payload,
    source_finished: bool,
    target_finished: bool,
    scratch: Scratch,
}

/// Agent-kind specific working state.
#[derive(Debug)]
enum Scratch {
    None,
    Decoder(DecoderScratch),
    Vad(VadScratch),
}

/// Monotonic decoder working state: committed tokens.
#[derive(Debug, Default)]
pub(crate) struct DecoderScratch {
    /// Output tokens committed so far, in order.
    pub tokens: Vec<u32>,
}

/// VAD gate working state.
#[derive(Debug, Default)]
pub(crate) struct VadScratch {
    /// Whether speech has been observed in the current utterance.
    pub in_speech: bool,
    /// Length of the current trailing silence run (milliseconds).
    pub silence_ms: u32,
    /// Audio passed through for the current utterance (milliseconds).
    pub segment_ms: u32,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentState {
    /// Fresh state with an empty input buffer.
    pub fn new() -> Self {
        Self {
            source: Payload::Empty,
            source_finished: false,
            target_finished: false,
            scratch: Scratch::None,
        }
    }

    /// Buffers an upstream segment.
    ///
    /// Enforces the segment contract: after a finished segment arrives, any
    /// further non-empty segment on the same edge is a
    /// [`SimulstreamError::FinishedViolation`]; a payload kind differing
    /// from what is already buffered is a
    /// [`SimulstreamError::PayloadMismatch`]. Both are fatal to the current
    /// utterance only.
    pub fn receive(&mut self, agent: &str, segment: &Segment) -> Result<()> {
        if self.source_finished && !segment.is_empty() {
            return Err(SimulstreamError::FinishedViolation {
                agent: agent.to_string(),
            });
        }
        self.source
            .append(segment.payload.clone())
            .map_err(|(expected, actual)| SimulstreamError::PayloadMismatch {
                agent: agent.to_string(),
                expected,
                actual,
            })?;
        if segment.finished {
            self.source_finished = true;
        }
        Ok(())
    }

    /// True once a finished upstream segment has been buffered.
    pub fn source_finished(&self) -> bool {
        self.source_finished
    }

    /// True once this agent has emitted its own finished segment.
    pub fn target_finished(&self) -> bool {
        self.target_finished
    }

    /// Records that this agent's output stream is closed.
    pub fn mark_target_finished(&mut self) {
        self.target_finished = true;
    }

    /// Read-only view of the buffered input.
    pub fn payload(&self) -> &Payload {
        &self.source
    }

    /// Drains the entire input buffer.
    pub fn take_payload(&mut self) -> Payload {
        std::mem::replace(&mut self.source, Payload::Empty)
    }

    /// Drains buffered raw samples, erroring on any other payload kind.
    pub fn take_samples(&mut self, agent: &str) -> Result<Vec<f32>> {
        match self.take_payload() {
            Payload::Samples(samples) => Ok(samples),
            Payload::Empty => Ok(Vec::new()),
            other => Err(wrong_kind(agent, "samples", &other)),
        }
    }

    /// Drains buffered feature frames, erroring on any other payload kind.
    pub fn take_frames(&mut self, agent: &str) -> Result<Vec<Vec<f32>>> {
        match self.take_payload() {
            Payload::Features(frames) => Ok(frames),
            Payload::Empty => Ok(Vec::new()),
            other => Err(wrong_kind(agent, "features", &other)),
        }
    }

    /// Drains buffered tokens, erroring on any other payload kind.
    pub fn take_tokens(&mut self, agent: &str) -> Result<Vec<u32>> {
        match self.take_payload() {
            Payload::Tokens(tokens) => Ok(tokens),
            Payload::Empty => Ok(Vec::new()),
            other => Err(wrong_kind(agent, "tokens", &other)),
        }
    }

    /// Drains buffered units, erroring on any other payload kind.
    pub fn take_units(&mut self, agent: &str) -> Result<Vec<u32>> {
        match self.take_payload() {
            Payload::Units(units) => Ok(units),
            Payload::Empty => Ok(Vec::new()),
            other => Err(wrong_kind(agent, "units", &other)),
        }
    }

    /// Buffered feature frames without draining (the monotonic decoder
    /// attends over the full encoder-state prefix).
    pub fn frames(&self, agent: &str) -> Result<&[Vec<f32>]> {
        match &self.source {
            Payload::Features(frames) => Ok(frames),
            Payload::Empty => Ok(&[]),
            other => Err(wrong_kind(agent, "features", other)),
        }
    }

    /// Pushes leftover data back onto the front of the buffer after a
    /// partial consume (feature extractor window overlap).
    pub fn restore_front(&mut self, agent: &str, payload: Payload) -> Result<()> {
        let tail = self.take_payload();
        self.source = payload;
        self.source
            .append(tail)
            .map_err(|(expected, actual)| SimulstreamError::PayloadMismatch {
                agent: agent.to_string(),
                expected,
                actual,
            })
    }

    /// Tokens committed by the decoder so far (empty for other agents).
    pub fn decoder_tokens(&self) -> &[u32] {
        match &self.scratch {
            Scratch::Decoder(scratch) => &scratch.tokens,
            _ => &[],
        }
    }

    pub(crate) fn decoder_scratch(&mut self) -> &mut DecoderScratch {
        if !matches!(self.scratch, Scratch::Decoder(_)) {
            self.scratch = Scratch::Decoder(DecoderScratch::default());
        }
        match &mut self.scratch {
            Scratch::Decoder(scratch) => scratch,
            _ => unreachable!("scratch kind set above"),
        }
    }

    pub(crate) fn vad_scratch(&mut self) -> &mut VadScratch {
        if !matches!(self.scratch, Scratch::Vad(_)) {
            self.scratch = Scratch::Vad(VadScratch::default());
        }
        match &mut self.scratch {
            Scratch::Vad(scratch) => scratch,
            _ => unreachable!("scratch kind set above"),
        }
    }
}

fn wrong_kind(agent: &str, expected: &'static str, actual: &Payload) -> SimulstreamError {
    SimulstreamError::PayloadMismatch {
        agent: agent.to_string(),
        expected,
        actual: actual.kind(),
    }
}
