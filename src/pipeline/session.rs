//! Multi-utterance session loop.
//!
//! A driver run ends at the first finished sink segment, which is one
//! utterance. [`Session`] keeps re-running the driver over the same
//! source until the source itself is exhausted, collecting one result
//! per utterance. Agent state never survives an utterance boundary; the
//! driver builds fresh state each run.

use crate::error::Result;
use crate::pipeline::types::UtteranceResult;
use crate::pipeline::PipelineDriver;
use crate::source::SegmentSource;

/// Runs a pipeline driver across every utterance in a source.
pub struct Session<D: PipelineDriver> {
    driver: D,
}

impl<D: PipelineDriver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Consumes the source, one driver run per utterance.
    ///
    /// A final run that produced nothing but the terminal marker (input
    /// that ends in silence) is not reported as an utterance.
    pub fn run(&self, source: &mut dyn SegmentSource) -> Result<Vec<UtteranceResult>> {
        let mut utterances = Vec::new();
        loop {
            let result = self.driver.run_utterance(source)?;
            let exhausted = result.source_exhausted;
            if !(exhausted && result.is_empty()) {
                utterances.push(result);
            }
            if exhausted {
                break;
            }
        }
        Ok(utterances)
    }
}
