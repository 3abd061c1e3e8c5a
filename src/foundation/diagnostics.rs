//! Pluggable sinks receiving one event per node evaluation.
//!
//! Nodes never consult process-wide state to decide whether to trace; a sink is
//! attached explicitly (see [`crate::DynamicNode::with_diagnostics`]).

use std::cell::RefCell;

use crate::foundation::core::{Time, Vec2};

/// Which path of the evaluation state machine served a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalBranch {
    /// `t == last_time == 0`: rest configuration at time 0.
    ColdStart,
    /// `t < 0`: rest configuration, nothing integrated.
    PreRoll,
    /// Integrated forward from the cached state.
    Forward,
    /// Query went backwards; replayed from time 0.
    Rewind,
}

/// Result carried by an [`EvalEvent`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalOutcome {
    /// Value returned to the caller.
    Value(Vec2),
    /// Rendered error returned to the caller.
    Failed(String),
}

/// One evaluation call as seen by a [`DiagnosticSink`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EvalEvent {
    /// Node kind (`"dynamic"`).
    pub node: &'static str,
    /// Requested time.
    pub time: Time,
    /// Start of the integrated interval.
    pub from: Time,
    /// State-machine branch taken.
    pub branch: EvalBranch,
    /// Accepted integrator steps (0 when nothing was integrated).
    pub steps: usize,
    /// Returned value or error.
    pub outcome: EvalOutcome,
}

/// Receiver of evaluation diagnostics.
pub trait DiagnosticSink {
    /// Called once per evaluation, after the outcome is known.
    fn record(&self, event: &EvalEvent);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&EvalEvent),
{
    fn record(&self, event: &EvalEvent) {
        self(event)
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &EvalEvent) {
        match &event.outcome {
            EvalOutcome::Value(v) => tracing::debug!(
                node = event.node,
                t = event.time.0,
                from = event.from.0,
                branch = ?event.branch,
                steps = event.steps,
                x = v.x,
                y = v.y,
                "evaluate"
            ),
            EvalOutcome::Failed(err) => tracing::debug!(
                node = event.node,
                t = event.time.0,
                from = event.from.0,
                branch = ?event.branch,
                error = %err,
                "evaluate failed"
            ),
        }
    }
}

/// Keeps every event in memory; handy for inspection and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<EvalEvent>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far.
    pub fn events(&self) -> Vec<EvalEvent> {
        self.events.borrow().clone()
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: &EvalEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
