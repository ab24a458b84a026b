//! Result types produced by pipeline drivers.

use crate::segment::{Payload, Segment};

/// Everything one sink agent emitted during one utterance, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkOutput {
    /// Name of the sink agent.
    pub agent: String,
    /// Emitted segments, the last one finished.
    pub segments: Vec<Segment>,
}

/// Collected output of one utterance across all sink agents.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceResult {
    /// Per-sink outputs, in sink declaration order.
    pub sinks: Vec<SinkOutput>,
    /// True when the external source ran out during this utterance (as
    /// opposed to a VAD-triggered boundary with input remaining).
    pub source_exhausted: bool,
}

impl UtteranceResult {
    /// Segments emitted by the named sink, if it exists.
    pub fn segments(&self, agent: &str) -> Option<&[Segment]> {
        self.sinks
            .iter()
            .find(|sink| sink.agent == agent)
            .map(|sink| sink.segments.as_slice())
    }

    /// True when no sink emitted any data (only terminal markers).
    pub fn is_empty(&self) -> bool {
        self.sinks
            .iter()
            .all(|sink| sink.segments.iter().all(Segment::is_empty))
    }

    /// Concatenated text across all sinks, word-joined per segment.
    pub fn text(&self) -> String {
        let mut pieces = Vec::new();
        for sink in &self.sinks {
            for segment in &sink.segments {
                if let Payload::Text(text) = &segment.payload
                    && !text.is_empty()
                {
                    pieces.push(text.clone());
                }
            }
        }
        pieces.join(" ")
    }

    /// Concatenated token ids across all sinks.
    pub fn tokens(&self) -> Vec<u32> {
        let mut tokens = Vec::new();
        for sink in &self.sinks {
            for segment in &sink.segments {
                if let Payload::Tokens(t) = &segment.payload {
                    tokens.extend_from_slice(t);
                }
            }
        }
        tokens
    }

    /// Concatenated waveform samples across all sinks.
    pub fn waveform(&self) -> Vec<f32> {
        let mut samples = Vec::new();
        for sink in &self.sinks {
            for segment in &sink.segments {
                if let Payload::Waveform(w) = &segment.payload {
                    samples.extend_from_slice(w);
                }
            }
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> UtteranceResult {
        UtteranceResult {
            sinks: vec![
                SinkOutput {
                    agent: "detokenizer".to_string(),
                    segments: vec![
                        Segment::text("hello"),
                        Segment::text("world"),
                        Segment::finished_empty(),
                    ],
                },
                SinkOutput {
                    agent: "vocoder".to_string(),
                    segments: vec![
                        Segment::waveform(vec![0.1, 0.2]),
                        Segment::finished_empty(),
                    ],
                },
            ],
            source_exhausted: true,
        }
    }

    #[test]
    fn segments_looks_up_by_name() {
        let result = result();
        assert_eq!(result.segments("detokenizer").unwrap().len(), 3);
        assert!(result.segments("missing").is_none());
    }

    #[test]
    fn text_concatenates_across_segments() {
        assert_eq!(result().text(), "hello world");
    }

    #[test]
    fn waveform_concatenates() {
        assert_eq!(result().waveform(), vec![0.1, 0.2]);
    }

    #[test]
    fn is_empty_ignores_terminal_markers() {
        let empty = UtteranceResult {
            sinks: vec![SinkOutput {
                agent: "sink".to_string(),
                segments: vec![Segment::finished_empty()],
            }],
            source_exhausted: true,
        };
        assert!(empty.is_empty());
        assert!(!result().is_empty());
    }

    #[test]
    fn tokens_concatenates() {
        let result = UtteranceResult {
            sinks: vec![SinkOutput {
                agent: "decoder".to_string(),
                segments: vec![Segment::tokens(vec![1]), Segment::tokens(vec![2, 3])],
            }],
            source_exhausted: false,
        };
        assert_eq!(result.tokens(), vec![1, 2, 3]);
    }
}
