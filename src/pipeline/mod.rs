//! Pipeline drivers: the schedulers that move segments between agents.
//!
//! Two drivers share one contract. [`ChainPipeline`] runs a straight line
//! of agents with a cursor walk; [`TreePipeline`] runs a validated DAG in
//! a fixed topological order with fan-out copies and fan-in joins. Both
//! are single-threaded and deterministic: the same agents over the same
//! input always produce the same segments in the same order. [`Session`]
//! loops a driver over every utterance in a source.

pub mod chain;
pub mod graph;
pub mod observer;
pub mod session;
pub mod tree;
pub mod types;

pub use chain::ChainPipeline;
pub use graph::{ExecutionPlan, GraphBuilder, NodeId};
pub use observer::{LogObserver, NullObserver, RecordingObserver, StepObserver};
pub use session::Session;
pub use tree::TreePipeline;
pub use types::{SinkOutput, UtteranceResult};

use crate::error::Result;
use crate::source::SegmentSource;

/// One utterance, start to finish.
///
/// A run ends when every sink has emitted a finished segment; the source
/// is left positioned after the last segment consumed, so the caller can
/// run the next utterance off the same source.
pub trait PipelineDriver {
    fn run_utterance(&self, source: &mut dyn SegmentSource) -> Result<UtteranceResult>;
}
