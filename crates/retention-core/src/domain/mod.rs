//! Domain models for release retention.
//!
//! Canonical definitions for the snapshot entities:
//! - `Project`: a product that produces releases
//! - `Environment`: a deployment target
//! - `Release`: a build artifact belonging to one project
//! - `Deployment`: one placement of a release into an environment

pub mod entity;
pub mod error;
pub mod timestamp;

pub use entity::{Deployment, Environment, Project, Release};
pub use error::{Result, RetentionError};
