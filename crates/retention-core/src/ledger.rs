//! Deployment Ledger: a read-only snapshot of deployment history.
//!
//! The ledger owns the four entity collections and answers the grouping
//! queries the selector needs. It never validates references between
//! collections; a deployment whose release or environment is unknown simply
//! never matches a query.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Deployment, Environment, Project, Release};

/// A release paired with its deployments into one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDeployments<'a> {
    pub release: &'a Release,
    /// Deployments into the queried environment, in ledger order.
    pub deployments: Vec<&'a Deployment>,
}

impl ReleaseDeployments<'_> {
    pub fn has_been_deployed(&self) -> bool {
        !self.deployments.is_empty()
    }

    /// Latest `deployed_at` in this subset, `None` when never deployed.
    pub fn most_recent_deployment(&self) -> Option<DateTime<Utc>> {
        self.deployments.iter().map(|d| d.deployed_at).max()
    }
}

/// Immutable snapshot of projects, environments, releases and deployments.
#[derive(Debug, Clone, Default)]
pub struct DeploymentLedger {
    projects: Vec<Project>,
    environments: Vec<Environment>,
    releases: Vec<Release>,
    deployments: Vec<Deployment>,
    release_index: HashMap<String, usize>,
    deployments_by_release: HashMap<String, Vec<usize>>,
}

impl DeploymentLedger {
    pub fn new(
        projects: Vec<Project>,
        environments: Vec<Environment>,
        releases: Vec<Release>,
        deployments: Vec<Deployment>,
    ) -> Self {
        let mut release_index = HashMap::with_capacity(releases.len());
        for (idx, release) in releases.iter().enumerate() {
            release_index.entry(release.id.clone()).or_insert(idx);
        }

        let mut deployments_by_release: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, deployment) in deployments.iter().enumerate() {
            deployments_by_release
                .entry(deployment.release_id.clone())
                .or_default()
                .push(idx);
        }

        debug!(
            projects = projects.len(),
            environments = environments.len(),
            releases = releases.len(),
            deployments = deployments.len(),
            "deployment ledger built"
        );

        Self {
            projects,
            environments,
            releases,
            deployments,
            release_index,
            deployments_by_release,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    /// Look up a release by id. With duplicate ids the first one wins.
    pub fn release(&self, id: &str) -> Option<&Release> {
        self.release_index.get(id).map(|&idx| &self.releases[idx])
    }

    /// True when there is nothing to select from.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() || self.environments.is_empty()
    }

    /// Unique project ids in first-seen order.
    pub fn distinct_project_ids(&self) -> Vec<&str> {
        distinct(self.projects.iter().map(|p| p.id.as_str()))
    }

    /// Unique environment ids in first-seen order.
    pub fn distinct_environment_ids(&self) -> Vec<&str> {
        distinct(self.environments.iter().map(|e| e.id.as_str()))
    }

    /// Every (project, environment) pair, project-major.
    pub fn project_environment_pairs(&self) -> Vec<(&str, &str)> {
        let environment_ids = self.distinct_environment_ids();
        self.distinct_project_ids()
            .into_iter()
            .flat_map(|project_id| {
                environment_ids
                    .iter()
                    .map(move |&environment_id| (project_id, environment_id))
            })
            .collect()
    }

    /// Deployments of `release` into `environment_id`, in ledger order.
    pub fn deployments_for(&self, release: &Release, environment_id: &str) -> Vec<&Deployment> {
        self.deployments_by_release
            .get(&release.id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| &self.deployments[idx])
                    .filter(|d| d.environment_id == environment_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pair every release of `project_id` with its deployments into
    /// `environment_id`. Releases never deployed there are included with an
    /// empty subset. Unknown ids yield an empty result.
    pub fn releases_and_deployments_for(
        &self,
        project_id: &str,
        environment_id: &str,
    ) -> Vec<ReleaseDeployments<'_>> {
        self.releases
            .iter()
            .filter(|r| r.project_id == project_id)
            .map(|release| ReleaseDeployments {
                release,
                deployments: self.deployments_for(release, environment_id),
            })
            .collect()
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LedgerBuilder;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_distinct_ids_keep_first_seen_order() {
        let ledger = LedgerBuilder::at(reference())
            .with_project("Project-2", "Pet Shop")
            .with_project("Project-1", "Random Quotes")
            .with_project("Project-2", "Pet Shop (dup)")
            .with_environment("Environment-2", "Production")
            .with_environment("Environment-1", "Staging")
            .with_environment("Environment-2", "Production")
            .build();

        assert_eq!(ledger.distinct_project_ids(), vec!["Project-2", "Project-1"]);
        assert_eq!(
            ledger.distinct_environment_ids(),
            vec!["Environment-2", "Environment-1"]
        );
    }

    #[test]
    fn test_pairs_are_cross_product() {
        let ledger = LedgerBuilder::at(reference())
            .with_project("P1", "one")
            .with_project("P2", "two")
            .with_environment("E1", "staging")
            .with_environment("E2", "production")
            .build();

        assert_eq!(
            ledger.project_environment_pairs(),
            vec![("P1", "E1"), ("P1", "E2"), ("P2", "E1"), ("P2", "E2")]
        );
    }

    #[test]
    fn test_pairs_empty_without_environments() {
        let ledger = LedgerBuilder::at(reference())
            .with_project("P1", "one")
            .build();

        assert!(ledger.is_empty());
        assert!(ledger.project_environment_pairs().is_empty());
    }

    #[test]
    fn test_releases_and_deployments_include_undeployed_releases() {
        let t = reference();
        let ledger = LedgerBuilder::at(t)
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_environment("E2", "production")
            .with_release("R1", "P1", Some("1.0.0"))
            .with_release("R2", "P1", Some("1.0.1"))
            .with_release("R3", "P2", None)
            .with_deployment_at("D1", "R1", "E1", t - Duration::hours(2))
            .with_deployment_at("D2", "R1", "E2", t - Duration::hours(1))
            .with_deployment_at("D3", "R1", "E1", t)
            .build();

        let pairs = ledger.releases_and_deployments_for("P1", "E1");

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].release.id, "R1");
        let ids: Vec<&str> = pairs[0].deployments.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D3"]);
        assert_eq!(pairs[0].most_recent_deployment(), Some(t));

        assert_eq!(pairs[1].release.id, "R2");
        assert!(!pairs[1].has_been_deployed());
        assert_eq!(pairs[1].most_recent_deployment(), None);
    }

    #[test]
    fn test_unknown_ids_yield_nothing() {
        let ledger = LedgerBuilder::at(reference())
            .with_project("P1", "one")
            .with_environment("E1", "staging")
            .with_release("R1", "P1", None)
            .with_deployment("D1", "R1", "E1")
            .build();

        assert!(ledger.releases_and_deployments_for("nope", "E1").is_empty());

        let pairs = ledger.releases_and_deployments_for("P1", "nope");
        assert_eq!(pairs.len(), 1);
        assert!(!pairs[0].has_been_deployed());
    }

    #[test]
    fn test_release_lookup_first_wins() {
        let t = reference();
        let ledger = LedgerBuilder::at(t)
            .with_release("R1", "P1", Some("first"))
            .with_release("R1", "P1", Some("second"))
            .build();

        let release = ledger.release("R1").expect("release");
        assert_eq!(release.version.as_deref(), Some("first"));
        assert!(ledger.release("R9").is_none());
    }
}
