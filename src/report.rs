//! Result of a successful extraction

use crate::config::ExtractMode;
use crate::naming::SubsetBranch;
use crate::target::TargetPath;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// The created branch.
    pub branch: SubsetBranch,
    /// The branch's only commit.
    pub commit: String,
    /// Commit HEAD pointed at when the file was taken.
    pub source_commit: String,
    /// The extracted file.
    pub path: TargetPath,
    /// Blob id of the file; identical in the source commit and the new one.
    pub blob: String,
    /// Timestamp encoded in the branch name.
    pub created_at: DateTime<Utc>,
    pub mode: ExtractMode,
    /// Whether the new branch is checked out afterwards.
    pub checked_out: bool,
}

impl Extraction {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Command a consumer would run to pin this branch as a submodule.
    ///
    /// Shallow submodule fetches of orphan branches are not honoured the same
    /// way by every host; the pinned commit is what matters.
    pub fn submodule_hint(&self) -> String {
        format!(
            "git submodule add --depth 1 -b {} <url> <path>  # pins {}",
            self.branch,
            short_id(&self.commit)
        )
    }
}

/// First 12 characters of an object id.
pub fn short_id(id: &str) -> &str {
    if id.len() > 12 { &id[..12] } else { id }
}
