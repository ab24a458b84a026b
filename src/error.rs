//! Error types for simulstream.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulstreamError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Segment contract violations (fatal to the current utterance only)
    #[error("Agent '{agent}' received input after its stream finished")]
    FinishedViolation { agent: String },

    #[error("Agent '{agent}' expected {expected} payload, got {actual}")]
    PayloadMismatch {
        agent: String,
        expected: &'static str,
        actual: &'static str,
    },

    // Pipeline graph construction errors (detected at build time)
    #[error("Invalid pipeline graph: {message}")]
    GraphInvalid { message: String },

    // Driver scheduling errors
    #[error("Pipeline stalled at agent '{agent}': no input available and no output produced")]
    Stalled { agent: String },

    // Model collaborator failures, surfaced unchanged
    #[error("Model inference failed in {stage}: {message}")]
    Inference { stage: String, message: String },

    // Streaming input errors
    #[error("Segment source failed: {message}")]
    Source { message: String },

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SimulstreamError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn finished_violation_display() {
        let error = SimulstreamError::FinishedViolation {
            agent: "text_decoder".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Agent 'text_decoder' received input after its stream finished"
        );
    }

    #[test]
    fn payload_mismatch_display() {
        let error = SimulstreamError::PayloadMismatch {
            agent: "vocoder".to_string(),
            expected: "units",
            actual: "tokens",
        };
        assert_eq!(
            error.to_string(),
            "Agent 'vocoder' expected units payload, got tokens"
        );
    }

    #[test]
    fn graph_invalid_display() {
        let error = SimulstreamError::GraphInvalid {
            message: "cycle detected".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid pipeline graph: cycle detected");
    }

    #[test]
    fn stalled_display() {
        let error = SimulstreamError::Stalled {
            agent: "speech_encoder".to_string(),
        };
        assert!(error.to_string().contains("speech_encoder"));
    }

    #[test]
    fn inference_display() {
        let error = SimulstreamError::Inference {
            stage: "decoder".to_string(),
            message: "out of memory".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Model inference failed in decoder: out of memory"
        );
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SimulstreamError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: SimulstreamError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SimulstreamError>();
        assert_sync::<SimulstreamError>();
    }

    #[test]
    fn result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
