//! Tree/DAG pipeline driver.
//!
//! Runs a validated [`ExecutionPlan`] over one utterance, single-threaded
//! and deterministic. Each scheduling pass visits every open node in the
//! plan's fixed topological order. Every edge carries at most one pending
//! segment; a node with several parents is polled only once every open
//! parent has delivered (closed parents are exempt), so joins see one
//! segment per upstream per logical step. A written segment is cloned to
//! each child, giving branches independent copies.
//!
//! A parent's finished flag is withheld from a join child until the last
//! open parent closes, keeping the child's input stream monotonic.

use crate::agent::AgentState;
use crate::error::{Result, SimulstreamError};
use crate::pipeline::graph::ExecutionPlan;
use crate::pipeline::observer::{NullObserver, StepObserver};
use crate::pipeline::types::{SinkOutput, UtteranceResult};
use crate::pipeline::PipelineDriver;
use crate::segment::{Action, Segment};
use crate::source::SegmentSource;
use std::sync::Arc;

/// Driver for an agent DAG with one source and any number of sinks.
pub struct TreePipeline {
    plan: ExecutionPlan,
    observer: Arc<dyn StepObserver>,
}

impl TreePipeline {
    pub fn new(plan: ExecutionPlan) -> Self {
        Self {
            plan,
            observer: Arc::new(NullObserver),
        }
    }

    /// Installs an observer receiving every scheduled action.
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Agent names in the fixed execution order.
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.plan.execution_order()
    }
}

impl PipelineDriver for TreePipeline {
    fn run_utterance(&self, source: &mut dyn SegmentSource) -> Result<UtteranceResult> {
        let plan = &self.plan;
        let n = plan.agents.len();
        let mut states: Vec<AgentState> =
            plan.agents.iter().map(|agent| agent.new_state()).collect();
        let mut closed = vec![false; n];
        // mailboxes[child][i] holds the pending segment from parents[child][i].
        let mut mailboxes: Vec<Vec<Option<Segment>>> = plan
            .parents
            .iter()
            .map(|parents| vec![None; parents.len()])
            .collect();
        let mut sink_outputs: Vec<Vec<Segment>> = vec![Vec::new(); n];
        let mut source_done = false;

        while !plan.sinks.iter().all(|&sink| closed[sink]) {
            let mut progress = false;

            for &node in &plan.order {
                if closed[node] {
                    continue;
                }

                // Backpressure: hold the node while any child still has an
                // unconsumed segment from it.
                let outgoing_free = plan.children[node].iter().all(|&child| {
                    let slot = slot_of(plan, child, node);
                    mailboxes[child][slot].is_none()
                });
                if !outgoing_free {
                    continue;
                }

                let agent = &plan.agents[node];

                if node == plan.source {
                    // Pump the external source until the head agent writes
                    // or the input runs dry.
                    loop {
                        let action = agent.policy(&mut states[node])?;
                        self.observer.on_action(agent.name(), &action);
                        match action {
                            Action::Read => match source.next_segment()? {
                                Some(segment) => {
                                    agent.receive(&mut states[node], &segment)?;
                                    progress = true;
                                }
                                None if !source_done => {
                                    source_done = true;
                                    agent.receive(&mut states[node], &Segment::finished_empty())?;
                                    progress = true;
                                }
                                None => break,
                            },
                            Action::Write(segment) => {
                                deliver(
                                    plan,
                                    node,
                                    segment,
                                    &mut mailboxes,
                                    &mut sink_outputs,
                                    &mut closed,
                                );
                                progress = true;
                                break;
                            }
                        }
                    }
                    continue;
                }

                // A join waits until every open parent has delivered.
                let ready = plan.parents[node]
                    .iter()
                    .enumerate()
                    .all(|(slot, &parent)| mailboxes[node][slot].is_some() || closed[parent]);
                if !ready {
                    continue;
                }

                for slot in 0..plan.parents[node].len() {
                    if let Some(segment) = mailboxes[node][slot].take() {
                        agent.receive(&mut states[node], &segment)?;
                        progress = true;
                    }
                }

                let action = agent.policy(&mut states[node])?;
                self.observer.on_action(agent.name(), &action);
                if let Action::Write(segment) = action {
                    deliver(
                        plan,
                        node,
                        segment,
                        &mut mailboxes,
                        &mut sink_outputs,
                        &mut closed,
                    );
                    progress = true;
                }
            }

            if !progress {
                let stuck = plan
                    .order
                    .iter()
                    .find(|&&node| !closed[node])
                    .map(|&node| plan.agents[node].name())
                    .unwrap_or("pipeline");
                return Err(SimulstreamError::Stalled {
                    agent: stuck.to_string(),
                });
            }
        }

        let sinks = plan
            .sinks
            .iter()
            .map(|&sink| SinkOutput {
                agent: plan.agents[sink].name().to_string(),
                segments: std::mem::take(&mut sink_outputs[sink]),
            })
            .collect();
        Ok(UtteranceResult {
            sinks,
            source_exhausted: source_done,
        })
    }
}

fn slot_of(plan: &ExecutionPlan, child: usize, parent: usize) -> usize {
    let slot = plan.parents[child].iter().position(|&p| p == parent);
    debug_assert!(
        slot.is_some(),
        "edge {parent} -> {child} missing from the parent table"
    );
    slot.unwrap_or_default()
}

/// Routes a written segment: sinks collect it, inner nodes clone it to
/// every child mailbox. The finished flag only reaches a child once all
/// of the child's parents have closed.
fn deliver(
    plan: &ExecutionPlan,
    node: usize,
    segment: Segment,
    mailboxes: &mut [Vec<Option<Segment>>],
    sink_outputs: &mut [Vec<Segment>],
    closed: &mut [bool],
) {
    let finished = segment.finished;
    closed[node] = closed[node] || finished;

    if plan.children[node].is_empty() {
        sink_outputs[node].push(segment);
        return;
    }

    for &child in &plan.children[node] {
        let all_parents_closed = plan.parents[child].iter().all(|&parent| closed[parent]);
        let slot = slot_of(plan, child, node);
        let mut copy = segment.clone();
        copy.finished = finished && all_parents_closed;
        mailboxes[child][slot] = Some(copy);
    }
}
