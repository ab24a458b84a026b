//! Pipeline graph construction and validation.
//!
//! A pipeline graph is a DAG of agents with exactly one source node (no
//! incoming edges). [`GraphBuilder`] collects nodes and edges in
//! declaration order; [`ExecutionPlan::build`] validates the shape and
//! fixes a deterministic execution order: a topological sort where ties
//! are broken by declaration order, so the same graph always schedules
//! the same way.

use crate::agent::Agent;
use crate::error::{Result, SimulstreamError};
use std::sync::Arc;

/// Handle to a node added to a [`GraphBuilder`].
pub type NodeId = usize;

/// Collects agents and edges before validation.
#[derive(Default)]
pub struct GraphBuilder {
    agents: Vec<Arc<dyn Agent>>,
    edges: Vec<(NodeId, NodeId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an agent node; the returned id is its declaration index.
    pub fn add_agent(&mut self, agent: Arc<dyn Agent>) -> NodeId {
        self.agents.push(agent);
        self.agents.len() - 1
    }

    /// Adds a parent-to-child edge.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> &mut Self {
        self.edges.push((parent, child));
        self
    }

    /// Validates the graph and fixes the execution order.
    pub fn build(self) -> Result<ExecutionPlan> {
        ExecutionPlan::build(self.agents, self.edges)
    }
}

/// Validated pipeline graph with a fixed deterministic execution order.
pub struct ExecutionPlan {
    pub(crate) agents: Vec<Arc<dyn Agent>>,
    pub(crate) children: Vec<Vec<NodeId>>,
    pub(crate) parents: Vec<Vec<NodeId>>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) source: NodeId,
    pub(crate) sinks: Vec<NodeId>,
}

impl ExecutionPlan {
    fn build(agents: Vec<Arc<dyn Agent>>, edges: Vec<(NodeId, NodeId)>) -> Result<Self> {
        let n = agents.len();
        if n == 0 {
            return Err(invalid("graph has no agents"));
        }

        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut parents: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for &(parent, child) in &edges {
            if parent >= n || child >= n {
                return Err(invalid(format!(
                    "edge ({parent}, {child}) references a node that was never added"
                )));
            }
            if parent == child {
                return Err(invalid(format!("self-loop on node {parent}")));
            }
            if children[parent].contains(&child) {
                return Err(invalid(format!("duplicate edge ({parent}, {child})")));
            }
            children[parent].push(child);
            parents[child].push(parent);
        }

        let sources: Vec<NodeId> = (0..n).filter(|&i| parents[i].is_empty()).collect();
        let source = match sources.as_slice() {
            [single] => *single,
            [] => return Err(invalid("graph has no source node (cycle through every node)")),
            many => {
                return Err(invalid(format!(
                    "graph has {} source nodes, expected exactly one",
                    many.len()
                )));
            }
        };

        // Kahn's algorithm, always taking the lowest-index ready node so
        // the order is a pure function of declaration order.
        let mut indegree: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut emitted = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let Some(next) = (0..n).find(|&i| !emitted[i] && indegree[i] == 0) else {
                return Err(invalid("graph contains a cycle"));
            };
            emitted[next] = true;
            order.push(next);
            for &child in &children[next] {
                indegree[child] -= 1;
            }
        }

        let sinks: Vec<NodeId> = (0..n).filter(|&i| children[i].is_empty()).collect();

        Ok(Self {
            agents,
            children,
            parents,
            order,
            source,
            sinks,
        })
    }

    /// Agent names in the fixed execution order.
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.order.iter().map(|&i| self.agents[i].name()).collect()
    }

    /// Names of the sink agents, in declaration order.
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|&i| self.agents[i].name()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn invalid(message: impl Into<String>) -> SimulstreamError {
    SimulstreamError::GraphInvalid {
        message: message.into(),
    }
}
