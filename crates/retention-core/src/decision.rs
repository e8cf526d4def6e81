//! Per-pair retention decisions and the sinks that receive them.
//!
//! The selector hands each decision to a [`DecisionSink`] as it is made.
//! Nothing is logged unless the caller passes [`TracingSink`].

use serde::{Deserialize, Serialize};
use tracing::info;

/// Why a set of releases was kept for one (project, environment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionDecision {
    pub project_id: String,
    pub environment_id: String,
    /// Kept release ids, most recently deployed first.
    pub kept_release_ids: Vec<String>,
    pub kept_count: usize,
    /// The normalized retention count that was asked for.
    pub requested: usize,
}

impl RetentionDecision {
    pub fn new(
        project_id: impl Into<String>,
        environment_id: impl Into<String>,
        kept_release_ids: Vec<String>,
        requested: usize,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            environment_id: environment_id.into(),
            kept_count: kept_release_ids.len(),
            kept_release_ids,
            requested,
        }
    }

    /// Human-readable audit line for this decision.
    pub fn reason(&self) -> String {
        format!(
            "Release Ids: '{}' should be retained, Reason: Most recent {} release(s) out of the \
             maximum {} release(s) to keep for Project: '{}', Environment: '{}'",
            self.kept_release_ids.join(","),
            self.kept_count,
            self.requested,
            self.project_id,
            self.environment_id,
        )
    }
}

/// Receives decisions as the selector produces them.
pub trait DecisionSink {
    fn record(&mut self, decision: &RetentionDecision);
}

impl DecisionSink for Vec<RetentionDecision> {
    fn record(&mut self, decision: &RetentionDecision) {
        self.push(decision.clone());
    }
}

/// Discards every decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DecisionSink for NullSink {
    fn record(&mut self, _decision: &RetentionDecision) {}
}

/// Emits each decision as a structured `info!` event.
///
/// Pairs where nothing was deployed are skipped unless
/// [`TracingSink::include_empty`] is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    include_empty: bool,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }
}

impl DecisionSink for TracingSink {
    fn record(&mut self, decision: &RetentionDecision) {
        if decision.kept_count == 0 && !self.include_empty {
            return;
        }
        info!(
            event = "retention.decision",
            project_id = %decision.project_id,
            environment_id = %decision.environment_id,
            kept = %decision.kept_release_ids.join(","),
            kept_count = decision.kept_count,
            requested = decision.requested,
            "{}",
            decision.reason()
        );
    }
}
