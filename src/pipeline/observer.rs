//! Step observation hooks for pipeline drivers.
//!
//! Drivers report every agent action to an observer. The default does
//! nothing; [`LogObserver`] prints to stderr for diagnostics, and
//! [`RecordingObserver`] captures the action sequence for tests asserting
//! scheduling order.

use crate::segment::Action;
use std::sync::Mutex;

/// Receives every (agent, action) pair the driver schedules.
pub trait StepObserver: Send + Sync {
    /// Called after an agent's policy returned an action.
    fn on_action(&self, agent: &str, action: &Action);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn on_action(&self, _agent: &str, _action: &Action) {}
}

/// Observer that logs each action to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl StepObserver for LogObserver {
    fn on_action(&self, agent: &str, action: &Action) {
        match action {
            Action::Read => eprintln!("[{}] read", agent),
            Action::Write(segment) => eprintln!(
                "[{}] write {} len={} finished={}",
                agent,
                segment.payload.kind(),
                segment.payload.len(),
                segment.finished
            ),
        }
    }
}

/// Observer that records a compact trace of the action sequence.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded trace: `"agent:read"` or `"agent:write"` entries in
    /// scheduling order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Indices of write events for the given agent.
    pub fn write_positions(&self, agent: &str) -> Vec<usize> {
        let key = format!("{}:write", agent);
        self.events()
            .iter()
            .enumerate()
            .filter(|(_, event)| **event == key)
            .map(|(i, _)| i)
            .collect()
    }
}

impl StepObserver for RecordingObserver {
    fn on_action(&self, agent: &str, action: &Action) {
        let label = match action {
            Action::Read => format!("{}:read", agent),
            Action::Write(_) => format!("{}:write", agent),
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(label);
        }
    }
}
