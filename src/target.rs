//! Target file paths
//!
//! A `TargetPath` is always relative to the repository root, uses `/` as the
//! separator and contains no `.` or `..` components.

use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("path cannot be empty")]
    Empty,
    #[error("path cannot start with '-': {0}")]
    LeadingDash(String),
    #[error("path cannot contain null or control characters")]
    ControlCharacter,
    #[error("path is not valid UTF-8: {0}")]
    NotUtf8(String),
    #[error("path is outside the repository: {0}")]
    OutsideRepository(String),
    #[error("path points into the .git directory: {0}")]
    GitDir(String),
}

/// A file path relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetPath(String);

impl TargetPath {
    /// Parse a repository-relative path, normalising it lexically.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        check_raw(raw)?;

        let mut parts: Vec<&str> = Vec::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| TargetError::NotUtf8(raw.to_string()))?;
                    parts.push(part);
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(TargetError::OutsideRepository(raw.to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(TargetError::OutsideRepository(raw.to_string()));
                }
            }
        }

        if parts.is_empty() {
            return Err(TargetError::Empty);
        }
        if parts.first() == Some(&".git") {
            return Err(TargetError::GitDir(raw.to_string()));
        }

        Ok(Self(parts.join("/")))
    }

    /// Resolve a path as typed by a user.
    ///
    /// Absolute paths must lie inside `workdir`. Relative paths that exist
    /// under `cwd` are re-anchored onto `workdir`; anything else is taken as
    /// already repository-relative so missing files still get a clean
    /// not-found error later.
    pub fn resolve(workdir: &Path, cwd: &Path, raw: &Path) -> Result<Self, TargetError> {
        let raw_str = raw
            .to_str()
            .ok_or_else(|| TargetError::NotUtf8(raw.display().to_string()))?;
        check_raw(raw_str)?;

        let candidate = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            let joined = cwd.join(raw);
            if joined.symlink_metadata().is_err() {
                return Self::parse(raw_str);
            }
            joined
        };

        let workdir = canonical_or_self(workdir);
        let candidate = canonical_parent(&candidate);
        let relative = candidate
            .strip_prefix(&workdir)
            .map_err(|_| TargetError::OutsideRepository(raw_str.to_string()))?;
        let relative = relative
            .to_str()
            .ok_or_else(|| TargetError::NotUtf8(raw_str.to_string()))?;

        Self::parse(relative)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File name without its last extension (`a.tar.gz` -> `a.tar`).
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_raw(raw: &str) -> Result<(), TargetError> {
    if raw.is_empty() {
        return Err(TargetError::Empty);
    }
    if raw.starts_with('-') {
        return Err(TargetError::LeadingDash(raw.to_string()));
    }
    if raw.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(TargetError::ControlCharacter);
    }
    Ok(())
}

fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalise the directory part only, so a tracked symlink keeps its own name.
fn canonical_parent(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => canonical_or_self(parent).join(name),
        _ => canonical_or_self(path),
    }
}
