//! Release retention core library.
//!
//! Decides which releases must survive a cleanup pass under a "keep the N
//! most recently deployed releases" policy, evaluated per project and
//! environment.
//!
//! ```
//! use retention_core::{LedgerBuilder, RetentionSelector};
//!
//! let ledger = LedgerBuilder::new()
//!     .with_project("Project-1", "Random Quotes")
//!     .with_environment("Environment-1", "Staging")
//!     .with_release("Release-1", "Project-1", Some("1.0.0"))
//!     .with_deployment("Deployment-1", "Release-1", "Environment-1")
//!     .build();
//!
//! let kept = RetentionSelector::new(&ledger).releases_to_keep(1usize);
//! assert_eq!(kept[0].id, "Release-1");
//! ```

pub mod builder;
pub mod decision;
pub mod digest;
pub mod domain;
pub mod ledger;
pub mod parallel;
pub mod selector;
pub mod source;
pub mod telemetry;

pub use builder::LedgerBuilder;
pub use decision::{DecisionSink, NullSink, RetentionDecision, TracingSink};
pub use digest::PlanDigest;
pub use domain::{Deployment, Environment, Project, Release, Result, RetentionError};
pub use ledger::{DeploymentLedger, ReleaseDeployments};
pub use parallel::select_parallel;
pub use selector::{select_for_pair, KeepCount, RetentionOutcome, RetentionSelector};
pub use source::{JsonDirSource, MemorySource, SnapshotSource};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
