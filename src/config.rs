//! Extraction options
//!
//! `ExtractOptions` starts from the defaults, picks up `subset.prefix` from
//! git config, and is then adjusted by the caller before `validate` runs.

use crate::git::GitError;
use crate::naming::{self, DEFAULT_PREFIX};
use git2::{ErrorCode, Repository};
use serde::Serialize;
use thiserror::Error;

/// Git config key holding the branch namespace.
pub const PREFIX_CONFIG_KEY: &str = "subset.prefix";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("prefix cannot be empty")]
    EmptyPrefix,
    #[error("prefix '{0}' is not a valid ref namespace")]
    InvalidPrefix(String),
    #[error("staying on the new branch requires checkout mode")]
    StayRequiresCheckout,
}

/// What happens to HEAD once the branch has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPolicy {
    /// Return to the branch or commit that was checked out before.
    #[default]
    Restore,
    /// Leave the new branch checked out, ready to push.
    Stay,
}

/// How the branch is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Orphan checkout in the working tree, driven through the git CLI.
    #[default]
    Checkout,
    /// Tree and commit written straight to the object database.
    Plumbing,
}

/// Settings for one `Extractor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// First component of every branch name, e.g. `subset`.
    pub prefix: String,
    /// Where HEAD ends up after a checkout-mode extraction.
    pub policy: CheckoutPolicy,
    /// Whether the working tree is used at all.
    pub mode: ExtractMode,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            policy: CheckoutPolicy::default(),
            mode: ExtractMode::default(),
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the prefix taken from `subset.prefix` when set.
    pub fn from_git_config(repo: &Repository) -> Result<Self, GitError> {
        let mut config = repo.config()?;
        let snapshot = config.snapshot()?;
        let options = Self::new();
        match snapshot.get_string(PREFIX_CONFIG_KEY) {
            Ok(prefix) => Ok(options.with_prefix(prefix)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(options),
            Err(e) => Err(GitError::Git(e)),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_policy(mut self, policy: CheckoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        // Probe with a placeholder leaf; the prefix alone may be a valid ref
        // while still being unusable as a namespace (e.g. a trailing '/').
        let probe = format!("{}/00000000-000000/probe", self.prefix);
        if self.prefix.starts_with('/')
            || self.prefix.ends_with('/')
            || self.prefix.starts_with('-')
            || !naming::is_valid_branch_name(&probe)
        {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }

        if self.policy == CheckoutPolicy::Stay && self.mode == ExtractMode::Plumbing {
            return Err(ConfigError::StayRequiresCheckout);
        }

        Ok(())
    }
}
