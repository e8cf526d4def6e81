//! Snapshot entities as supplied by the deployment platform.
//!
//! Field names follow the platform's export format (`Id`, `ProjectId`,
//! `DeployedAt`, ...) on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A logical software product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: String,
    pub name: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A deployment target such as staging or production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A versioned build artifact belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Release {
    pub id: String,

    /// Owning project. Not checked against the project collection.
    pub project_id: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(rename = "Created", alias = "CreatedAt", with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Release {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        version: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            version,
            created_at,
        }
    }
}

/// One instant at which a release was placed into an environment.
///
/// A release may be deployed many times, into many environments, and more
/// than once into the same environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    pub id: String,
    pub release_id: String,
    pub environment_id: String,

    #[serde(with = "timestamp")]
    pub deployed_at: DateTime<Utc>,
}

impl Deployment {
    pub fn new(
        id: impl Into<String>,
        release_id: impl Into<String>,
        environment_id: impl Into<String>,
        deployed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            release_id: release_id.into(),
            environment_id: environment_id.into(),
            deployed_at,
        }
    }
}
