//! SHA-256 fingerprint of a retention plan.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::selector::KeepCount;

/// Hex digest over the keep count and the sorted retained release ids.
///
/// Equal for any two outcomes that retain the same set under the same
/// count, whatever order the releases were kept in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanDigest(String);

impl PlanDigest {
    pub fn compute<'a>(keep: KeepCount, release_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ids: Vec<&str> = release_ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut hasher = Sha256::new();
        hasher.update(format!("keep:{}\n", keep.get()).as_bytes());
        for id in ids {
            hasher.update(id.as_bytes());
            hasher.update(b"\n");
        }
        PlanDigest(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for PlanDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
