//! Parallel selection across (project, environment) pairs.
//!
//! Each pair is ranked on tokio's blocking pool. Decisions are gathered in
//! pair order and merged once, so the outcome matches
//! [`RetentionSelector::evaluate`](crate::selector::RetentionSelector::evaluate).

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::decision::RetentionDecision;
use crate::domain::{Result, RetentionError};
use crate::ledger::DeploymentLedger;
use crate::selector::{select_for_pair, KeepCount, RetentionOutcome};

/// Evaluate every pair concurrently and merge the kept releases.
pub async fn select_parallel(
    ledger: Arc<DeploymentLedger>,
    keep: impl Into<KeepCount>,
) -> Result<RetentionOutcome> {
    let keep = keep.into();
    let pairs: Vec<(String, String)> = ledger
        .project_environment_pairs()
        .into_iter()
        .map(|(p, e)| (p.to_string(), e.to_string()))
        .collect();

    debug!(pairs = pairs.len(), keep = keep.get(), "spawning pair workers");

    let tasks: Vec<JoinHandle<RetentionDecision>> = pairs
        .into_iter()
        .map(|(project_id, environment_id)| {
            let ledger = Arc::clone(&ledger);
            tokio::task::spawn_blocking(move || {
                select_for_pair(&ledger, &project_id, &environment_id, keep)
            })
        })
        .collect();

    let mut decisions = Vec::with_capacity(tasks.len());
    for task in tasks {
        let decision = task
            .await
            .map_err(|e| RetentionError::Worker(e.to_string()))?;
        decisions.push(decision);
    }

    Ok(RetentionOutcome::merge(&ledger, keep, decisions))
}
