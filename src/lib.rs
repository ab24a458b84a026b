//! simulstream - streaming pipeline framework for simultaneous
//! speech and text translation.
//!
//! Agents do incremental inference over typed segments; drivers schedule
//! them over one utterance at a time, as a linear chain or a DAG.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod agent;
pub mod config;
pub mod defaults;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod source;

// Core data model
pub use segment::{Action, Payload, Segment};

// Agent framework
pub use agent::{Agent, AgentState};

// Drivers
pub use pipeline::{
    ChainPipeline, GraphBuilder, PipelineDriver, Session, TreePipeline, UtteranceResult,
};

// Error handling
pub use error::{Result, SimulstreamError};

// Config
pub use config::Config;

// Input adapters
pub use source::{ChannelSource, SegmentSource, VecSource, WavSource};

/// Build version string with optional git commit hash.
///
/// Returns `"0.2.0+abc1234"` when git hash is available, `"0.2.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
