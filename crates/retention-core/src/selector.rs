//! Retention Selector: which releases survive a cleanup pass.
//!
//! For every (project, environment) pair the project's releases that were
//! deployed there are ranked by their latest deployment, most recent first,
//! and the top `keep` are protected. The retained set is the union over all
//! pairs, so a release only has to rank in one environment to survive.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decision::{DecisionSink, NullSink, RetentionDecision};
use crate::digest::PlanDigest;
use crate::domain::Release;
use crate::ledger::DeploymentLedger;

/// Number of releases to keep per (project, environment) pair.
///
/// Negative requests are normalized to zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct KeepCount(usize);

impl KeepCount {
    pub const ZERO: KeepCount = KeepCount(0);

    pub fn from_signed(count: i64) -> Self {
        Self(usize::try_from(count).unwrap_or(0))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for KeepCount {
    fn from(count: usize) -> Self {
        Self(count)
    }
}

impl fmt::Display for KeepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rank one pair and return the decision for it.
///
/// Candidates are sorted by latest deployment, descending. The sort is
/// stable, so releases with equal timestamps keep ledger order.
pub fn select_for_pair(
    ledger: &DeploymentLedger,
    project_id: &str,
    environment_id: &str,
    keep: KeepCount,
) -> RetentionDecision {
    let mut candidates: Vec<(&Release, DateTime<Utc>)> = ledger
        .releases_and_deployments_for(project_id, environment_id)
        .into_iter()
        .filter_map(|pair| {
            pair.most_recent_deployment()
                .map(|latest| (pair.release, latest))
        })
        .collect();

    candidates.sort_by(|(_, a), (_, b)| b.cmp(a));

    debug!(
        project_id,
        environment_id,
        candidates = candidates.len(),
        keep = keep.get(),
        "ranked deployed releases"
    );

    let kept = candidates
        .into_iter()
        .take(keep.get())
        .map(|(release, _)| release.id.clone())
        .collect();

    RetentionDecision::new(project_id, environment_id, kept, keep.get())
}

/// Result of one retention pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionOutcome {
    pub keep: KeepCount,
    /// Retained releases, deduplicated, in the order they were first kept.
    pub retained: Vec<Release>,
    /// One decision per (project, environment) pair, in pair order.
    pub decisions: Vec<RetentionDecision>,
}

impl RetentionOutcome {
    /// Union the kept ids of `decisions` and resolve them against `ledger`.
    pub fn merge(
        ledger: &DeploymentLedger,
        keep: KeepCount,
        decisions: Vec<RetentionDecision>,
    ) -> Self {
        let retained: Vec<Release> = {
            let mut seen: HashSet<&String> = HashSet::new();
            decisions
                .iter()
                .flat_map(|d| d.kept_release_ids.iter())
                .filter(|id| seen.insert(*id))
                .filter_map(|id| ledger.release(id).cloned())
                .collect()
        };

        Self {
            keep,
            retained,
            decisions,
        }
    }

    pub fn retained_ids(&self) -> Vec<&str> {
        self.retained.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn is_retained(&self, release_id: &str) -> bool {
        self.retained.iter().any(|r| r.id == release_id)
    }

    /// Releases in `ledger` that were not retained, in ledger order.
    pub fn purge_candidates<'a>(&self, ledger: &'a DeploymentLedger) -> Vec<&'a Release> {
        let retained: HashSet<&str> = self.retained.iter().map(|r| r.id.as_str()).collect();
        ledger
            .releases()
            .iter()
            .filter(|r| !retained.contains(r.id.as_str()))
            .collect()
    }

    /// Order-independent fingerprint of the retained set.
    pub fn digest(&self) -> PlanDigest {
        PlanDigest::compute(self.keep, self.retained_ids())
    }
}

/// Computes retained releases over a [`DeploymentLedger`].
#[derive(Debug, Clone, Copy)]
pub struct RetentionSelector<'a> {
    ledger: &'a DeploymentLedger,
}

impl<'a> RetentionSelector<'a> {
    pub fn new(ledger: &'a DeploymentLedger) -> Self {
        Self { ledger }
    }

    /// Releases to protect from deletion, each listed once.
    pub fn releases_to_keep(&self, keep: impl Into<KeepCount>) -> Vec<Release> {
        self.evaluate(keep).retained
    }

    pub fn evaluate(&self, keep: impl Into<KeepCount>) -> RetentionOutcome {
        self.evaluate_with(keep, &mut NullSink)
    }

    /// Evaluate every pair, handing each decision to `sink` as it is made.
    pub fn evaluate_with(
        &self,
        keep: impl Into<KeepCount>,
        sink: &mut dyn DecisionSink,
    ) -> RetentionOutcome {
        let keep = keep.into();
        let decisions: Vec<RetentionDecision> = self
            .ledger
            .project_environment_pairs()
            .into_iter()
            .map(|(project_id, environment_id)| {
                let decision = select_for_pair(self.ledger, project_id, environment_id, keep);
                sink.record(&decision);
                decision
            })
            .collect();

        RetentionOutcome::merge(self.ledger, keep, decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LedgerBuilder;
    use chrono::{Duration, TimeZone};

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn sorted(ids: Vec<&str>) -> Vec<&str> {
        let mut ids = ids;
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_keep_count_normalizes_negative() {
        assert_eq!(KeepCount::from_signed(-5), KeepCount::ZERO);
        assert_eq!(KeepCount::from_signed(0).get(), 0);
        assert_eq!(KeepCount::from_signed(3).get(), 3);
        assert_eq!(KeepCount::from(7usize).to_string(), "7");
    }

    #[test]
    fn test_pair_ranking_uses_latest_deployment() {
        let ledger = LedgerBuilder::at(t())
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_release("R1", "P1", None)
            .with_release("R2", "P1", None)
            .with_deployment_at("D1", "R1", "E1", t() - Duration::hours(3))
            .with_deployment_at("D2", "R2", "E1", t() - Duration::hours(4))
            .with_deployment_at("D3", "R2", "E1", t())
            .build();

        let decision = select_for_pair(&ledger, "P1", "E1", KeepCount::from(1));
        assert_eq!(decision.kept_release_ids, vec!["R2".to_string()]);
        assert_eq!(decision.kept_count, 1);
        assert_eq!(decision.requested, 1);
    }

    #[test]
    fn test_ties_keep_ledger_order() {
        let ledger = LedgerBuilder::at(t())
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_release("R3", "P1", None)
            .with_release("R1", "P1", None)
            .with_release("R2", "P1", None)
            .with_deployment("D1", "R1", "E1")
            .with_deployment("D2", "R2", "E1")
            .with_deployment("D3", "R3", "E1")
            .build();

        let decision = select_for_pair(&ledger, "P1", "E1", KeepCount::from(2));
        assert_eq!(
            decision.kept_release_ids,
            vec!["R3".to_string(), "R1".to_string()]
        );
    }

    #[test]
    fn test_zero_keep_records_empty_decisions() {
        let ledger = LedgerBuilder::at(t())
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_release("R1", "P1", None)
            .with_deployment("D1", "R1", "E1")
            .build();

        let outcome = RetentionSelector::new(&ledger).evaluate(KeepCount::ZERO);
        assert!(outcome.retained.is_empty());
        assert_eq!(outcome.decisions.len(), 1);
        assert_eq!(outcome.decisions[0].kept_count, 0);
    }

    #[test]
    fn test_sink_sees_every_pair() {
        let ledger = LedgerBuilder::at(t())
            .with_project("P1", "one")
            .with_project("P2", "two")
            .with_environment("E1", "staging")
            .with_environment("E2", "production")
            .build();

        let mut sink: Vec<RetentionDecision> = Vec::new();
        let outcome = RetentionSelector::new(&ledger).evaluate_with(1usize, &mut sink);

        assert_eq!(sink.len(), 4);
        assert_eq!(sink, outcome.decisions);
    }

    #[test]
    fn test_purge_candidates_are_the_complement() {
        let ledger = LedgerBuilder::at(t())
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_release("R1", "P1", None)
            .with_release("R2", "P1", None)
            .with_release("R3", "P1", None)
            .with_deployment_at("D1", "R1", "E1", t() - Duration::hours(1))
            .with_deployment("D2", "R2", "E1")
            .build();

        let outcome = RetentionSelector::new(&ledger).evaluate(1usize);
        assert_eq!(outcome.retained_ids(), vec!["R2"]);
        assert!(outcome.is_retained("R2"));
        assert!(!outcome.is_retained("R1"));

        let purge: Vec<&str> = outcome
            .purge_candidates(&ledger)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(purge, vec!["R1", "R3"]);
    }

    #[test]
    fn test_merge_skips_ids_missing_from_ledger() {
        let ledger = LedgerBuilder::at(t()).with_release("R1", "P1", None).build();
        let decisions = vec![
            RetentionDecision::new("P1", "E1", vec!["R1".into(), "ghost".into()], 2),
            RetentionDecision::new("P1", "E2", vec!["R1".into()], 2),
        ];

        let outcome = RetentionOutcome::merge(&ledger, KeepCount::from(2), decisions);
        assert_eq!(sorted(outcome.retained_ids()), vec!["R1"]);
    }
}
