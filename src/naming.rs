//! Branch names for extracted files
//!
//! Names follow `<prefix>/<YYYYMMDD-HHMMSS>/<stem>` with the timestamp in UTC.
//! When a name is already taken (two runs inside the same second) a numeric
//! suffix is appended to the last component: `logo`, `logo-2`, `logo-3`, ...

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Namespace used when neither the CLI nor git config provide one.
pub const DEFAULT_PREFIX: &str = "subset";

/// `chrono` format of the timestamp component.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Highest collision suffix tried before giving up.
const MAX_COLLISION_SUFFIX: u32 = 100;

/// Stem used when sanitising leaves nothing.
const FALLBACK_STEM: &str = "file";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("'{0}' is not a valid branch name")]
    InvalidName(String),
    #[error("every candidate for '{0}' is taken")]
    Exhausted(String),
    #[error("branch lookup failed: {0}")]
    Lookup(String),
}

/// A validated branch name under the subset namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubsetBranch(String);

impl SubsetBranch {
    /// Compose `<prefix>/<timestamp>/<stem>` without checking for collisions.
    pub fn compose(prefix: &str, at: DateTime<Utc>, stem: &str) -> Result<Self, NamingError> {
        Self::with_suffix(prefix, at, stem, None)
    }

    fn with_suffix(
        prefix: &str,
        at: DateTime<Utc>,
        stem: &str,
        suffix: Option<u32>,
    ) -> Result<Self, NamingError> {
        let stem = sanitize_component(stem);
        let last = match suffix {
            Some(n) => format!("{}-{}", stem, n),
            None => stem,
        };
        let name = format!("{}/{}/{}", prefix, at.format(TIMESTAMP_FORMAT), last);
        if !is_valid_branch_name(&name) {
            return Err(NamingError::InvalidName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full ref name, `refs/heads/<name>`.
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl fmt::Display for SubsetBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pick the first free name for `stem` at `at`.
///
/// `taken` reports whether a candidate branch already exists.
pub fn allocate<F>(
    prefix: &str,
    at: DateTime<Utc>,
    stem: &str,
    mut taken: F,
) -> Result<SubsetBranch, NamingError>
where
    F: FnMut(&str) -> Result<bool, NamingError>,
{
    let base = SubsetBranch::compose(prefix, at, stem)?;
    if !taken(base.as_str())? {
        return Ok(base);
    }

    for n in 2..=MAX_COLLISION_SUFFIX {
        let candidate = SubsetBranch::with_suffix(prefix, at, stem, Some(n))?;
        if !taken(candidate.as_str())? {
            log::debug!("{} is taken, using {}", base, candidate);
            return Ok(candidate);
        }
    }

    Err(NamingError::Exhausted(base.0))
}

/// Whether `name` is acceptable as `refs/heads/<name>`.
pub fn is_valid_branch_name(name: &str) -> bool {
    git2::Reference::is_valid_name(&format!("refs/heads/{}", name))
}

/// Make a file stem usable as a single ref component.
///
/// Characters git forbids in refs (ASCII control, space, `~ ^ : ? * [ \`,
/// `{`, `/`) become `-`. Leading dots, doubled dots and a trailing `.lock`
/// or `.` are removed.
pub fn sanitize_component(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if c.is_control()
                || c.is_whitespace()
                || matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\' | '{' | '/')
            {
                '-'
            } else {
                c
            }
        })
        .collect();

    while out.contains("..") {
        out = out.replace("..", ".");
    }

    let trimmed = out.trim_start_matches('.');
    let mut out = trimmed.to_string();

    loop {
        if let Some(stripped) = out.strip_suffix(".lock") {
            out = stripped.to_string();
        } else if let Some(stripped) = out.strip_suffix('.') {
            out = stripped.to_string();
        } else {
            break;
        }
    }

    if out.is_empty() || out == "@" {
        FALLBACK_STEM.to_string()
    } else {
        out
    }
}
