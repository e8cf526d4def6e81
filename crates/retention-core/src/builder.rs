//! Fluent construction of a [`DeploymentLedger`].
//!
//! Entities added without an explicit timestamp are stamped with the
//! builder's reference instant, so a whole snapshot can be pinned to a fixed
//! clock with [`LedgerBuilder::at`].

use chrono::{DateTime, Utc};

use crate::domain::{Deployment, Environment, Project, Release};
use crate::ledger::DeploymentLedger;

#[derive(Debug, Clone)]
pub struct LedgerBuilder {
    reference: DateTime<Utc>,
    projects: Vec<Project>,
    environments: Vec<Environment>,
    releases: Vec<Release>,
    deployments: Vec<Deployment>,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBuilder {
    /// Builder whose reference instant is the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Builder whose reference instant is `reference`.
    pub fn at(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            projects: Vec::new(),
            environments: Vec::new(),
            releases: Vec::new(),
            deployments: Vec::new(),
        }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn with_project(mut self, id: &str, name: &str) -> Self {
        self.projects.push(Project::new(id, name));
        self
    }

    pub fn with_environment(mut self, id: &str, name: &str) -> Self {
        self.environments.push(Environment::new(id, name));
        self
    }

    pub fn with_release(self, id: &str, project_id: &str, version: Option<&str>) -> Self {
        let created_at = self.reference;
        self.with_release_created_at(id, project_id, version, created_at)
    }

    pub fn with_release_created_at(
        mut self,
        id: &str,
        project_id: &str,
        version: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.releases.push(Release::new(
            id,
            project_id,
            version.map(str::to_string),
            created_at,
        ));
        self
    }

    /// Deployment stamped at the reference instant.
    pub fn with_deployment(self, id: &str, release_id: &str, environment_id: &str) -> Self {
        let deployed_at = self.reference;
        self.with_deployment_at(id, release_id, environment_id, deployed_at)
    }

    pub fn with_deployment_at(
        mut self,
        id: &str,
        release_id: &str,
        environment_id: &str,
        deployed_at: DateTime<Utc>,
    ) -> Self {
        self.deployments
            .push(Deployment::new(id, release_id, environment_id, deployed_at));
        self
    }

    pub fn build(self) -> DeploymentLedger {
        DeploymentLedger::new(
            self.projects,
            self.environments,
            self.releases,
            self.deployments,
        )
    }
}
