//! Linear pipeline driver.
//!
//! Runs a fixed sequence of agents over one utterance, single-threaded.
//! The driver walks a cursor over the chain: when the agent at the cursor
//! asks to read, the cursor moves to its upstream neighbour (or pulls from
//! the external source at the head); when it writes, the segment is handed
//! to the downstream neighbour and the cursor follows it. The utterance is
//! over when the last agent emits a finished segment.

use crate::agent::{Agent, AgentState};
use crate::error::{Result, SimulstreamError};
use crate::pipeline::observer::{NullObserver, StepObserver};
use crate::pipeline::types::{SinkOutput, UtteranceResult};
use crate::pipeline::PipelineDriver;
use crate::segment::{Action, Segment};
use crate::source::SegmentSource;
use std::sync::Arc;

/// Driver for a straight line of agents.
pub struct ChainPipeline {
    agents: Vec<Arc<dyn Agent>>,
    observer: Arc<dyn StepObserver>,
}

impl ChainPipeline {
    /// Builds a chain from head to sink. Fails on an empty agent list.
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Result<Self> {
        if agents.is_empty() {
            return Err(SimulstreamError::GraphInvalid {
                message: "chain requires at least one agent".to_string(),
            });
        }
        Ok(Self {
            agents,
            observer: Arc::new(NullObserver),
        })
    }

    /// Installs an observer receiving every scheduled action.
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Agent names from head to sink.
    pub fn agent_names(&self) -> Vec<&'static str> {
        self.agents.iter().map(|agent| agent.name()).collect()
    }
}

impl PipelineDriver for ChainPipeline {
    fn run_utterance(&self, source: &mut dyn SegmentSource) -> Result<UtteranceResult> {
        let n = self.agents.len();
        let mut states: Vec<AgentState> =
            self.agents.iter().map(|agent| agent.new_state()).collect();
        let mut closed = vec![false; n];
        let mut outputs: Vec<Segment> = Vec::new();
        let mut source_done = false;
        let mut cursor = 0usize;

        loop {
            let agent = &self.agents[cursor];
            let action = agent.policy(&mut states[cursor])?;
            self.observer.on_action(agent.name(), &action);

            match action {
                Action::Read => {
                    if cursor == 0 {
                        match source.next_segment()? {
                            Some(segment) => agent.receive(&mut states[0], &segment)?,
                            None if !source_done => {
                                // End of input: the head sees one finished
                                // empty segment and must flush from there.
                                source_done = true;
                                agent.receive(&mut states[0], &Segment::finished_empty())?;
                            }
                            None => {
                                return Err(SimulstreamError::Stalled {
                                    agent: agent.name().to_string(),
                                });
                            }
                        }
                    } else {
                        if closed[cursor - 1] {
                            return Err(SimulstreamError::Stalled {
                                agent: agent.name().to_string(),
                            });
                        }
                        cursor -= 1;
                    }
                }
                Action::Write(segment) => {
                    closed[cursor] |= segment.finished;
                    if cursor + 1 == n {
                        let done = segment.finished;
                        outputs.push(segment);
                        if done {
                            break;
                        }
                    } else {
                        cursor += 1;
                        self.agents[cursor].receive(&mut states[cursor], &segment)?;
                    }
                }
            }
        }

        let sink = self.agents[n - 1].name().to_string();
        Ok(UtteranceResult {
            sinks: vec![SinkOutput {
                agent: sink,
                segments: outputs,
            }],
            source_exhausted: source_done,
        })
    }
}
