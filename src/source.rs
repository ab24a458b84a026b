//! Streaming input sources feeding the pipeline head agent.
//!
//! A [`SegmentSource`] supplies successive raw segments plus an explicit
//! end-of-input signal (`Ok(None)`). The drivers special-case end-of-input
//! by feeding the head agent a finished-empty segment so it can flush
//! buffered partial output.

use crate::error::{Result, SimulstreamError};
use crate::segment::Segment;
use crossbeam_channel::Receiver;
use std::io::Read;
use std::path::Path;

/// Upstream raw-input source.
///
/// Implementations must return `Ok(None)` exactly once input is exhausted;
/// the drivers treat it as the end-of-input signal and will not call
/// `next_segment` again for the current utterance.
pub trait SegmentSource {
    /// Returns the next available segment, or `None` at end of input.
    ///
    /// May block until a segment is available (live sources).
    fn next_segment(&mut self) -> Result<Option<Segment>>;
}

/// In-memory source yielding a fixed sequence of segments. Used in tests
/// and batch evaluation.
#[derive(Debug, Default)]
pub struct VecSource {
    segments: std::vec::IntoIter<Segment>,
}

impl VecSource {
    /// Creates a source over a pre-built segment sequence.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into_iter(),
        }
    }

    /// Convenience: chunk raw samples into unfinished sample segments.
    pub fn from_samples(samples: &[f32], chunk_size: usize) -> Self {
        let segments = samples
            .chunks(chunk_size.max(1))
            .map(|chunk| Segment::samples(chunk.to_vec()))
            .collect();
        Self::new(segments)
    }
}

impl SegmentSource for VecSource {
    fn next_segment(&mut self) -> Result<Option<Segment>> {
        Ok(self.segments.next())
    }
}

/// Live source backed by a crossbeam channel.
///
/// A producer thread (audio capture, network receiver) sends segments into
/// the channel; the cooperative driver blocks on `recv` until the next one
/// arrives. Disconnecting the sender signals end of input.
pub struct ChannelSource {
    rx: Receiver<Segment>,
}

impl ChannelSource {
    /// Wraps a receiver. The matching sender side belongs to the producer.
    pub fn new(rx: Receiver<Segment>) -> Self {
        Self { rx }
    }
}

impl SegmentSource for ChannelSource {
    fn next_segment(&mut self) -> Result<Option<Segment>> {
        match self.rx.recv() {
            Ok(segment) => Ok(Some(segment)),
            // Sender dropped: producer is done
            Err(_) => Ok(None),
        }
    }
}

/// WAV file source yielding fixed-size sample chunks.
pub struct WavSource {
    samples: Vec<f32>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavSource {
    /// Opens a WAV file and prepares to stream it in `chunk_size` sample
    /// chunks. Multi-channel audio is mixed down to mono.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        Self::from_wav_reader(reader, chunk_size)
    }

    /// Builds a source from any reader producing WAV bytes.
    pub fn from_reader(reader: Box<dyn Read>, chunk_size: usize) -> Result<Self> {
        let reader = hound::WavReader::new(reader)?;
        Self::from_wav_reader(reader, chunk_size)
    }

    fn from_wav_reader<R: Read>(mut reader: hound::WavReader<R>, chunk_size: usize) -> Result<Self> {
        let spec = reader.spec();
        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => reader
                .samples::<i16>()
                .map(|s| s.map(|s| f32::from(s) / 32768.0))
                .collect::<std::result::Result<_, _>>()?,
        };

        let samples = if spec.channels > 1 {
            raw.chunks(spec.channels as usize)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        } else {
            raw
        };

        if chunk_size == 0 {
            return Err(SimulstreamError::Source {
                message: "chunk_size must be non-zero".to_string(),
            });
        }

        Ok(Self {
            samples,
            position: 0,
            chunk_size,
            sample_rate: spec.sample_rate,
        })
    }

    /// Sample rate declared by the WAV header.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of mono samples in the file.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when the file contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SegmentSource for WavSource {
    fn next_segment(&mut self) -> Result<Option<Segment>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }
        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(Some(Segment::samples(chunk)))
    }
}
