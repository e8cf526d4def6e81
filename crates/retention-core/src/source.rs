//! Snapshot sources: where a [`DeploymentLedger`] comes from.
//!
//! - [`JsonDirSource`] reads one JSON array per entity type from a directory
//! - [`MemorySource`] hands out a ledger that was built in memory
//!
//! Loading fails fast on a missing or malformed file; selection only ever
//! sees a fully parsed snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::{Deployment, Environment, Project, Release, Result, RetentionError};
use crate::ledger::DeploymentLedger;

pub const PROJECTS_FILE: &str = "Projects.json";
pub const ENVIRONMENTS_FILE: &str = "Environments.json";
pub const RELEASES_FILE: &str = "Releases.json";
pub const DEPLOYMENTS_FILE: &str = "Deployments.json";

/// Produces a deployment history snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self) -> Result<DeploymentLedger>;
}

/// Directory holding `Projects.json`, `Environments.json`, `Releases.json`
/// and `Deployments.json`. File names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_collection<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = resolve_file(&self.root, file_name).await?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| RetentionError::Io {
                path: path.clone(),
                source,
            })?;
        let items: Vec<T> = serde_json::from_slice(&bytes)
            .map_err(|source| RetentionError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), count = items.len(), "snapshot collection loaded");
        Ok(items)
    }
}

#[async_trait]
impl SnapshotSource for JsonDirSource {
    async fn load(&self) -> Result<DeploymentLedger> {
        let projects: Vec<Project> = self.read_collection(PROJECTS_FILE).await?;
        let environments: Vec<Environment> = self.read_collection(ENVIRONMENTS_FILE).await?;
        let releases: Vec<Release> = self.read_collection(RELEASES_FILE).await?;
        let deployments: Vec<Deployment> = self.read_collection(DEPLOYMENTS_FILE).await?;

        info!(root = %self.root.display(), "deployment history loaded");
        Ok(DeploymentLedger::new(
            projects,
            environments,
            releases,
            deployments,
        ))
    }
}

/// Exact name first, then a case-insensitive scan of the directory.
async fn resolve_file(root: &Path, file_name: &str) -> Result<PathBuf> {
    let exact = root.join(file_name);
    if tokio::fs::try_exists(&exact).await.unwrap_or(false) {
        return Ok(exact);
    }

    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|source| RetentionError::Io {
            path: root.to_path_buf(),
            source,
        })?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| RetentionError::Io {
            path: root.to_path_buf(),
            source,
        })?
    {
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.eq_ignore_ascii_case(file_name))
        {
            return Ok(entry.path());
        }
    }

    Err(RetentionError::MissingFile { path: exact })
}

/// Serves a clone of a ledger built elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    ledger: DeploymentLedger,
}

impl MemorySource {
    pub fn new(ledger: DeploymentLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn load(&self) -> Result<DeploymentLedger> {
        Ok(self.ledger.clone())
    }
}
