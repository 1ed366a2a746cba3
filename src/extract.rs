//! Single-file branch extraction
//!
//! `Extractor::extract` turns one tracked file into a branch whose only
//! commit has no parent and whose tree holds just that file, at its original
//! path and with the same blob id.
//!
//! In checkout mode the working tree is borrowed for the duration of the
//! call:
//!
//! ```text
//! preflight ─▶ CheckoutOrphan ─▶ ClearIndex ─▶ ClearWorkTree ─▶ RestoreTarget ─▶ Commit ─▶ RestoreHead
//!                    │                │              │                │             │            │
//!                    └────────────────┴──────────────┴──── rollback ──┴─────────────┴────────────┘
//!                              (checkout -f <original>, branch -D <new> if it exists)
//! ```
//!
//! Only regular files and symlinks are removed from the working tree.
//! Submodule checkouts stay on disk and are recorded again by the final
//! checkout.
//!
//! Plumbing mode writes the tree, commit and ref through libgit2 and never
//! touches HEAD, the index or the working tree.

use crate::config::{CheckoutPolicy, ConfigError, ExtractMode, ExtractOptions};
use crate::git::{self, GitCli, GitError, HeadState};
use crate::naming::{self, NamingError, SubsetBranch};
use crate::report::{Extraction, short_id};
use crate::target::{TargetError, TargetPath};
use chrono::{DateTime, Utc};
use git2::{ErrorCode, ObjectType, Oid, Repository};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One discrete stage of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Preflight,
    CheckoutOrphan,
    ClearIndex,
    ClearWorkTree,
    RestoreTarget,
    Commit,
    RestoreHead,
    BuildTree,
    CreateBranch,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preflight => "preflight",
            Self::CheckoutOrphan => "orphan checkout",
            Self::ClearIndex => "clearing the index",
            Self::ClearWorkTree => "clearing the working tree",
            Self::RestoreTarget => "restoring the target file",
            Self::Commit => "commit",
            Self::RestoreHead => "restoring the original checkout",
            Self::BuildTree => "building the tree",
            Self::CreateBranch => "creating the branch",
        };
        f.write_str(name)
    }
}

/// Errors returned by an extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid target path: {0}")]
    InvalidPath(#[from] TargetError),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] ConfigError),
    /// The target is missing from, or not a file in, the checked-out revision.
    #[error("{path} is not a tracked file at {revision}")]
    NotFound { path: String, revision: String },
    /// Tracked files have uncommitted changes.
    #[error("working tree has uncommitted changes: {}", .paths.join(", "))]
    DirtyState { paths: Vec<String> },
    #[error("could not pick a branch name: {0}")]
    NameUnavailable(#[from] NamingError),
    /// A git operation failed. `cleanup` holds rollback steps that also failed.
    #[error("{step} failed: {source}")]
    ToolInvocation {
        step: Step,
        source: GitError,
        cleanup: Vec<GitError>,
    },
}

impl ExtractError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPath(_) | Self::InvalidOptions(_) => 2,
            Self::NotFound { .. } => 3,
            Self::DirtyState { .. } => 4,
            Self::NameUnavailable(_) | Self::ToolInvocation { .. } => 5,
        }
    }

    /// Rollback failures that accompanied this error.
    pub fn cleanup(&self) -> &[GitError] {
        match self {
            Self::ToolInvocation { cleanup, .. } => cleanup,
            _ => &[],
        }
    }

    fn preflight(source: GitError) -> Self {
        Self::ToolInvocation {
            step: Step::Preflight,
            source,
            cleanup: Vec::new(),
        }
    }
}

fn at_step(step: Step) -> impl FnOnce(GitError) -> (Step, GitError) {
    move |e| (step, e)
}

/// Everything decided before the repository is mutated.
struct Plan {
    head: HeadState,
    target: TargetPath,
    blob: Oid,
    filemode: i32,
    /// Files of the source tree to clear from disk. Empty in plumbing mode.
    files: Vec<String>,
    branch: SubsetBranch,
    message: String,
    created_at: DateTime<Utc>,
}

/// Extracts files from one repository.
pub struct Extractor {
    repo: Repository,
    workdir: PathBuf,
    git: GitCli,
    options: ExtractOptions,
}

impl Extractor {
    /// Open the repository at `path` (no parent discovery).
    pub fn open(path: &Path, options: ExtractOptions) -> Result<Self, ExtractError> {
        let repo = git::open_repository(path).map_err(ExtractError::preflight)?;
        Self::from_repository(repo, options)
    }

    pub fn from_repository(repo: Repository, options: ExtractOptions) -> Result<Self, ExtractError> {
        options.validate()?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| ExtractError::preflight(GitError::Bare(repo.path().display().to_string())))?
            .to_path_buf();
        Ok(Self {
            repo,
            workdir,
            git: GitCli::new(),
            options,
        })
    }

    /// Use a specific git CLI wrapper.
    pub fn with_git(mut self, git: GitCli) -> Self {
        self.git = git;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract `target`, naming the branch after the current UTC time.
    pub fn extract(&self, target: &TargetPath) -> Result<Extraction, ExtractError> {
        self.extract_at(target, Utc::now())
    }

    /// Extract `target`, naming the branch after `at`.
    pub fn extract_at(
        &self,
        target: &TargetPath,
        at: DateTime<Utc>,
    ) -> Result<Extraction, ExtractError> {
        let plan = self.plan(target, at)?;
        log::info!(
            "extracting {} from {} onto {}",
            plan.target,
            plan.head,
            plan.branch
        );

        let (commit, checked_out) = match self.options.mode {
            ExtractMode::Checkout => {
                let commit = self.run_checkout(&plan)?;
                (commit, self.options.policy == CheckoutPolicy::Stay)
            }
            ExtractMode::Plumbing => (self.run_plumbing(&plan)?, false),
        };

        let extraction = Extraction {
            branch: plan.branch,
            commit: commit.to_string(),
            source_commit: plan.head.commit().to_string(),
            path: plan.target,
            blob: plan.blob.to_string(),
            created_at: plan.created_at,
            mode: self.options.mode,
            checked_out,
        };
        log::info!(
            "created {} at {}",
            extraction.branch,
            short_id(&extraction.commit)
        );
        Ok(extraction)
    }

    fn plan(&self, target: &TargetPath, at: DateTime<Utc>) -> Result<Plan, ExtractError> {
        let head = match git::resolve_head(&self.repo) {
            Ok(head) => head,
            Err(GitError::UnbornHead(branch)) => {
                return Err(ExtractError::NotFound {
                    path: target.to_string(),
                    revision: format!("{} (no commits yet)", branch),
                });
            }
            Err(e) => return Err(ExtractError::preflight(e)),
        };

        let (blob, filemode) = self.tracked_blob(&head, target)?;

        let files = match self.options.mode {
            ExtractMode::Checkout => {
                let paths = git::dirty_paths(&self.repo).map_err(ExtractError::preflight)?;
                if !paths.is_empty() {
                    return Err(ExtractError::DirtyState { paths });
                }
                git::tracked_files(&self.repo, head.commit()).map_err(ExtractError::preflight)?
            }
            ExtractMode::Plumbing => Vec::new(),
        };

        let branch = naming::allocate(&self.options.prefix, at, target.stem(), |name| {
            git::branch_exists(&self.repo, name).map_err(|e| NamingError::Lookup(e.to_string()))
        })?;

        let message = commit_message(target, head.commit());

        Ok(Plan {
            head,
            target: target.clone(),
            blob,
            filemode,
            files,
            branch,
            message,
            created_at: at,
        })
    }

    /// Blob id and mode of `target` in the HEAD tree.
    fn tracked_blob(&self, head: &HeadState, target: &TargetPath) -> Result<(Oid, i32), ExtractError> {
        let not_found = || ExtractError::NotFound {
            path: target.to_string(),
            revision: head.to_string(),
        };

        let tree = self
            .repo
            .find_commit(head.commit())
            .and_then(|commit| commit.tree())
            .map_err(|e| ExtractError::preflight(GitError::Git(e)))?;

        let entry = match tree.get_path(Path::new(target.as_str())) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(not_found()),
            Err(e) => return Err(ExtractError::preflight(GitError::Git(e))),
        };

        if entry.kind() != Some(ObjectType::Blob) {
            return Err(not_found());
        }

        Ok((entry.id(), entry.filemode()))
    }

    fn run_checkout(&self, plan: &Plan) -> Result<Oid, ExtractError> {
        match self.checkout_steps(plan) {
            Ok(commit) => Ok(commit),
            // A failed orphan checkout leaves HEAD where it was.
            Err((Step::CheckoutOrphan, source)) => Err(ExtractError::ToolInvocation {
                step: Step::CheckoutOrphan,
                source,
                cleanup: Vec::new(),
            }),
            Err((step, source)) => {
                log::warn!("{} failed, rolling back to {}", step, plan.head);
                let cleanup = self.rollback(plan);
                Err(ExtractError::ToolInvocation {
                    step,
                    source,
                    cleanup,
                })
            }
        }
    }

    fn checkout_steps(&self, plan: &Plan) -> Result<Oid, (Step, GitError)> {
        let workdir = self.workdir.as_path();
        let source = plan.head.commit().to_string();

        self.git
            .checkout_orphan(workdir, plan.branch.as_str())
            .map_err(at_step(Step::CheckoutOrphan))?;
        self.git
            .clear_index(workdir)
            .map_err(at_step(Step::ClearIndex))?;
        remove_files(workdir, &plan.files, plan.target.as_str())
            .map_err(|e| (Step::ClearWorkTree, GitError::Io(e)))?;
        self.git
            .checkout_path(workdir, &source, plan.target.as_str())
            .map_err(at_step(Step::RestoreTarget))?;
        self.git
            .commit(workdir, &plan.message)
            .map_err(at_step(Step::Commit))?;
        let commit =
            git::branch_tip(&self.repo, &plan.branch.refname()).map_err(at_step(Step::Commit))?;

        if self.options.policy == CheckoutPolicy::Restore {
            self.git
                .checkout_head(workdir, &plan.head)
                .map_err(at_step(Step::RestoreHead))?;
        }

        Ok(commit)
    }

    /// Put HEAD back and drop the new branch. Failures are logged and returned.
    fn rollback(&self, plan: &Plan) -> Vec<GitError> {
        let mut failures = Vec::new();

        if let Err(e) = self.git.checkout_head(&self.workdir, &plan.head) {
            log::warn!("rollback: could not restore {}: {}", plan.head, e);
            failures.push(e);
        }

        match git::branch_exists(&self.repo, plan.branch.as_str()) {
            Ok(true) => {
                if let Err(e) = self.git.delete_branch(&self.workdir, plan.branch.as_str()) {
                    log::warn!("rollback: could not delete {}: {}", plan.branch, e);
                    failures.push(e);
                }
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("rollback: could not look up {}: {}", plan.branch, e);
                failures.push(e);
            }
        }

        failures
    }

    fn run_plumbing(&self, plan: &Plan) -> Result<Oid, ExtractError> {
        let tool = |step: Step| {
            move |source: GitError| ExtractError::ToolInvocation {
                step,
                source,
                cleanup: Vec::new(),
            }
        };

        let tree = git::write_single_file_tree(
            &self.repo,
            plan.target.as_str(),
            plan.blob,
            plan.filemode,
        )
        .map_err(tool(Step::BuildTree))?;
        let commit = git::create_orphan_commit(&self.repo, tree, &plan.message)
            .map_err(tool(Step::Commit))?;
        // The ref is the only visible side effect; objects written before a
        // failure here are unreachable and left to gc.
        git::create_branch_ref(&self.repo, &plan.branch.refname(), commit)
            .map_err(tool(Step::CreateBranch))?;

        Ok(commit)
    }
}

/// Delete `files` (relative to `workdir`) other than `keep`, then any
/// directories the deletions left empty.
fn remove_files(workdir: &Path, files: &[String], keep: &str) -> io::Result<()> {
    let mut dirs = BTreeSet::new();

    for file in files.iter().filter(|f| f.as_str() != keep) {
        match fs::remove_file(workdir.join(file)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let mut parent = Path::new(file).parent();
        while let Some(dir) = parent.filter(|d| !d.as_os_str().is_empty()) {
            dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }

    // Children sort after their parents, so reverse order empties bottom-up.
    for dir in dirs.iter().rev() {
        // Still holds untracked files, a submodule, or the target.
        let _ = fs::remove_dir(workdir.join(dir));
    }
    Ok(())
}

fn commit_message(target: &TargetPath, source: Oid) -> String {
    let source = source.to_string();
    format!(
        "Subset {} from {}\n\nSource-Commit: {}\nSource-Path: {}\n",
        target,
        short_id(&source),
        source,
        target
    )
}
