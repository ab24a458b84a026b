//! Segments and actions: the data and decisions flowing between agents.
//!
//! A [`Segment`] is the unit of data passed along a pipeline edge: a typed
//! payload plus a `finished` flag marking end-of-utterance. Segments are
//! immutable once constructed; agents that need to combine input do so in
//! their own state buffers. An [`Action`] is an agent's per-step decision:
//! ask for more input, or emit a segment downstream.

/// Typed payload carried by a segment.
///
/// The variant set is closed: every pipeline stage declares which kinds it
/// consumes and produces, and a mismatch is a fatal error for the current
/// utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw PCM audio samples, mono, normalized to -1.0..=1.0.
    Samples(Vec<f32>),
    /// Feature frames (one vector of band energies per frame).
    Features(Vec<Vec<f32>>),
    /// Text token ids committed by the decoder.
    Tokens(Vec<u32>),
    /// Discrete acoustic unit ids.
    Units(Vec<u32>),
    /// Synthesized waveform samples.
    Waveform(Vec<f32>),
    /// Detokenized text.
    Text(String),
    /// No data. Placeholder for "nothing yet" and terminal markers.
    Empty,
}

impl Payload {
    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Samples(_) => "samples",
            Payload::Features(_) => "features",
            Payload::Tokens(_) => "tokens",
            Payload::Units(_) => "units",
            Payload::Waveform(_) => "waveform",
            Payload::Text(_) => "text",
            Payload::Empty => "empty",
        }
    }

    /// Returns true if the payload carries no data.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Samples(s) => s.is_empty(),
            Payload::Features(f) => f.is_empty(),
            Payload::Tokens(t) => t.is_empty(),
            Payload::Units(u) => u.is_empty(),
            Payload::Waveform(w) => w.is_empty(),
            Payload::Text(t) => t.is_empty(),
            Payload::Empty => true,
        }
    }

    /// Number of elements (samples, frames, tokens, units, or characters).
    pub fn len(&self) -> usize {
        match self {
            Payload::Samples(s) => s.len(),
            Payload::Features(f) => f.len(),
            Payload::Tokens(t) => t.len(),
            Payload::Units(u) => u.len(),
            Payload::Waveform(w) => w.len(),
            Payload::Text(t) => t.len(),
            Payload::Empty => 0,
        }
    }

    /// Appends `other` onto this payload.
    ///
    /// `Empty` merges with anything; an `Empty` receiver takes on the kind
    /// of `other`. Returns `Err` with the mismatched kind names when the
    /// kinds differ, so callers can build a precise error.
    pub fn append(&mut self, other: Payload) -> std::result::Result<(), (&'static str, &'static str)> {
        if matches!(other, Payload::Empty) {
            return Ok(());
        }
        if matches!(self, Payload::Empty) {
            *self = other;
            return Ok(());
        }
        match (&mut *self, other) {
            (Payload::Samples(a), Payload::Samples(b)) => a.extend(b),
            (Payload::Features(a), Payload::Features(b)) => a.extend(b),
            (Payload::Tokens(a), Payload::Tokens(b)) => a.extend(b),
            (Payload::Units(a), Payload::Units(b)) => a.extend(b),
            (Payload::Waveform(a), Payload::Waveform(b)) => a.extend(b),
            (Payload::Text(a), Payload::Text(b)) => a.push_str(&b),
            (a, b) => return Err((a.kind(), b.kind())),
        }
        Ok(())
    }
}

/// A chunk of data flowing between agents, carrying a finished flag.
///
/// Once an agent emits a segment with `finished = true`, no further
/// non-empty segment may follow on that edge for the current utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The typed data.
    pub payload: Payload,
    /// End-of-utterance marker for the emitting agent's output stream.
    pub finished: bool,
}

impl Segment {
    /// Creates a segment from a payload.
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            finished: false,
        }
    }

    /// Marks this segment as the last of the utterance.
    pub fn with_finished(mut self, finished: bool) -> Self {
        self.finished = finished;
        self
    }

    /// Terminal marker carrying no data.
    pub fn finished_empty() -> Self {
        Self {
            payload: Payload::Empty,
            finished: true,
        }
    }

    /// Raw audio samples.
    pub fn samples(samples: Vec<f32>) -> Self {
        Self::new(Payload::Samples(samples))
    }

    /// Feature frames.
    pub fn features(frames: Vec<Vec<f32>>) -> Self {
        Self::new(Payload::Features(frames))
    }

    /// Token ids.
    pub fn tokens(tokens: Vec<u32>) -> Self {
        Self::new(Payload::Tokens(tokens))
    }

    /// Unit ids.
    pub fn units(units: Vec<u32>) -> Self {
        Self::new(Payload::Units(units))
    }

    /// Waveform samples.
    pub fn waveform(samples: Vec<f32>) -> Self {
        Self::new(Payload::Waveform(samples))
    }

    /// Detokenized text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Payload::Text(text.into()))
    }

    /// Returns true if the payload carries no data.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// An agent's decision for one scheduling step.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The agent needs more upstream input before it can produce output.
    Read,
    /// The agent emits a segment to its downstream consumers.
    Write(Segment),
}

impl Action {
    /// Emits a segment.
    pub fn write(segment: Segment) -> Self {
        Action::Write(segment)
    }

    /// Returns true for [`Action::Read`].
    pub fn is_read(&self) -> bool {
        matches!(self, Action::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_unfinished_differs_from_empty_finished() {
        let placeholder = Segment::new(Payload::Empty);
        let terminal = Segment::finished_empty();

        assert!(placeholder.is_empty() && !placeholder.finished);
        assert!(terminal.is_empty() && terminal.finished);
        assert_ne!(placeholder, terminal);
    }

    #[test]
    fn append_same_kind_concatenates() {
        let mut payload = Payload::Samples(vec![0.1, 0.2]);
        payload.append(Payload::Samples(vec![0.3])).unwrap();
        assert_eq!(payload, Payload::Samples(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn append_tokens() {
        let mut payload = Payload::Tokens(vec![1, 2]);
        payload.append(Payload::Tokens(vec![3, 4])).unwrap();
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn append_text_concatenates() {
        let mut payload = Payload::Text("hello ".to_string());
        payload.append(Payload::Text("world".to_string())).unwrap();
        assert_eq!(payload, Payload::Text("hello world".to_string()));
    }

    #[test]
    fn append_empty_is_noop() {
        let mut payload = Payload::Tokens(vec![7]);
        payload.append(Payload::Empty).unwrap();
        assert_eq!(payload, Payload::Tokens(vec![7]));
    }

    #[test]
    fn append_onto_empty_adopts_kind() {
        let mut payload = Payload::Empty;
        payload.append(Payload::Units(vec![9])).unwrap();
        assert_eq!(payload, Payload::Units(vec![9]));
    }

    #[test]
    fn append_kind_mismatch_reports_kinds() {
        let mut payload = Payload::Tokens(vec![1]);
        let err = payload.append(Payload::Units(vec![2])).unwrap_err();
        assert_eq!(err, ("tokens", "units"));
    }

    #[test]
    fn payload_kind_names() {
        assert_eq!(Payload::Samples(vec![]).kind(), "samples");
        assert_eq!(Payload::Features(vec![]).kind(), "features");
        assert_eq!(Payload::Waveform(vec![]).kind(), "waveform");
        assert_eq!(Payload::Empty.kind(), "empty");
    }

    #[test]
    fn segment_constructors() {
        assert_eq!(
            Segment::tokens(vec![1, 2]).payload,
            Payload::Tokens(vec![1, 2])
        );
        assert!(!Segment::tokens(vec![1]).finished);
        assert!(Segment::text("hi").with_finished(true).finished);
    }

    #[test]
    fn action_is_read() {
        assert!(Action::Read.is_read());
        assert!(!Action::write(Segment::finished_empty()).is_read());
    }

    #[test]
    fn segment_clone_is_independent() {
        let original = Segment::units(vec![1, 2, 3]);
        let mut copy = original.clone();
        if let Payload::Units(units) = &mut copy.payload {
            units.push(4);
        }
        assert_eq!(original.payload.len(), 3);
        assert_eq!(copy.payload.len(), 4);
    }
}
