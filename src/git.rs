//! Git operations using a hybrid CLI + libgit2 approach.
//!
//! **CLI (with hardening) for operations that move HEAD or rewrite the index:**
//! - `checkout_orphan` - start a parentless branch from the current tree
//! - `clear_index` - empty the index, leaving the working tree alone
//! - `checkout_path` - bring one path back from a commit
//! - `commit` - record the staged tree
//! - `checkout_head` - return to a recorded branch or detached commit
//! - `delete_branch` - drop a branch during rollback
//!
//! **libgit2 for read and object-database operations:**
//! - `open_repository` / `discover_repository` - open existing repos
//! - `resolve_head` - record the current checkout
//! - `dirty_paths` - tracked paths and submodules with uncommitted changes
//! - `tracked_files` - regular files in a commit, without gitlinks
//! - `branch_exists` / `branch_tip` - ref lookups
//! - `write_single_file_tree` / `create_orphan_commit` / `create_branch_ref` -
//!   build a branch without touching the working tree

use git2::{
    BranchType, ErrorCode, ObjectType, Oid, Repository, Signature, StatusOptions, TreeWalkMode,
    TreeWalkResult,
};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

const TREE_FILEMODE: i32 = 0o040000;

/// Errors returned by git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// libgit2 reported an error.
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
    /// Path does not contain a git repo.
    #[error("repository not found at {0}")]
    NotFound(String),
    /// The repository has no working tree to operate on.
    #[error("repository at {0} is bare")]
    Bare(String),
    /// HEAD points at a branch with no commits yet.
    #[error("HEAD points at unborn branch {0}")]
    UnbornHead(String),
    /// Output parsing or unexpected git data.
    #[error("failed to parse git data: {0}")]
    ParseError(String),
    /// A git CLI invocation exited unsuccessfully.
    #[error("`{command}` failed (exit code: {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// Underlying IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid inputs were provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Validate that a git ref (branch name or commit SHA) does not contain dangerous patterns.
///
/// Rejects:
/// - Empty strings
/// - Strings containing `..` (path traversal)
/// - Strings starting with `-` (could be interpreted as flags)
/// - Strings containing null bytes or control characters
fn validate_git_ref(value: &str, name: &str) -> Result<(), GitError> {
    if value.is_empty() {
        return Err(GitError::InvalidInput(format!("{} cannot be empty", name)));
    }
    if value.contains("..") {
        return Err(GitError::InvalidInput(format!(
            "{} cannot contain '..'",
            name
        )));
    }
    if value.starts_with('-') {
        return Err(GitError::InvalidInput(format!(
            "{} cannot start with '-'",
            name
        )));
    }
    if value.bytes().any(|b| b == 0 || b < 0x20) {
        return Err(GitError::InvalidInput(format!(
            "{} cannot contain null or control characters",
            name
        )));
    }
    Ok(())
}

/// The checkout recorded before a branch is extracted, used as the rollback point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD is attached to a local branch.
    Branch { name: String, commit: Oid },
    /// HEAD points directly at a commit.
    Detached { commit: Oid },
}

impl HeadState {
    /// Commit HEAD resolves to.
    pub fn commit(&self) -> Oid {
        match self {
            Self::Branch { commit, .. } | Self::Detached { commit } => *commit,
        }
    }

    /// Branch name, if HEAD is attached.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Branch { name, .. } => Some(name),
            Self::Detached { .. } => None,
        }
    }
}

impl fmt::Display for HeadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch { name, .. } => write!(f, "{}", name),
            Self::Detached { commit } => write!(f, "detached {}", commit),
        }
    }
}

/// Git CLI wrapper with security hardening.
///
/// Every invocation runs as `git -C <repo> ...`; the process working
/// directory is never consulted.
pub struct GitCli {
    git_path: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Create a new GitCli instance using the system git.
    pub fn new() -> Self {
        Self {
            git_path: "git".into(),
        }
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_git_path(git_path: impl Into<OsString>) -> Self {
        Self {
            git_path: git_path.into(),
        }
    }

    /// Create a hardened Command with security settings.
    ///
    /// Applies:
    /// - `GIT_LFS_SKIP_SMUDGE=1` - skip LFS file downloads
    /// - `GIT_TERMINAL_PROMPT=0` - disable interactive prompts
    /// - `core.hooksPath=` - disable hooks execution
    /// - `--literal-pathspecs` - paths are never glob patterns
    fn command(&self, repo: &Path) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.env("GIT_LFS_SKIP_SMUDGE", "1");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.args(["-c", "core.hooksPath="]);
        cmd.arg("--literal-pathspecs");
        cmd.arg("-C").arg(repo);
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Run `git <args>` against `repo`, returning stdout on success.
    fn run<I, S>(&self, repo: &Path, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        log::debug!("running {} in {}", command, repo.display());

        let output = self.command(repo).args(&args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Switch to a new orphan branch, keeping the current index and working tree.
    ///
    /// The branch ref itself is only written by the first commit.
    pub fn checkout_orphan(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        validate_git_ref(branch, "branch")?;
        self.run(repo, ["checkout", "-q", "--orphan", branch])?;
        Ok(())
    }

    /// Remove every entry from the index. Files and submodule checkouts stay
    /// on disk.
    ///
    /// `-f` is required because on an orphan branch every index entry counts
    /// as a staged change.
    pub fn clear_index(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, ["rm", "-r", "-f", "-q", "--cached", "--", "."])?;
        Ok(())
    }

    /// Restore `path` from `commit` into both the index and the working tree.
    pub fn checkout_path(&self, repo: &Path, commit: &str, path: &str) -> Result<(), GitError> {
        validate_git_ref(commit, "commit")?;
        self.run(repo, ["checkout", "-q", commit, "--", path])?;
        Ok(())
    }

    /// Commit whatever is staged.
    pub fn commit(&self, repo: &Path, message: &str) -> Result<(), GitError> {
        self.run(repo, ["commit", "-q", "-m", message])?;
        Ok(())
    }

    /// Force HEAD, index and tracked files back to a recorded checkout.
    ///
    /// Untracked files that do not collide with the target tree are left alone.
    pub fn checkout_head(&self, repo: &Path, head: &HeadState) -> Result<(), GitError> {
        match head {
            HeadState::Branch { name, .. } => {
                validate_git_ref(name, "branch")?;
                self.run(repo, ["checkout", "-f", "-q", name.as_str()])?;
            }
            HeadState::Detached { commit } => {
                let commit = commit.to_string();
                self.run(repo, ["checkout", "-f", "-q", "--detach", commit.as_str()])?;
            }
        }
        Ok(())
    }

    /// Delete a local branch regardless of merge status.
    pub fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        validate_git_ref(branch, "branch")?;
        self.run(repo, ["branch", "-q", "-D", branch])?;
        Ok(())
    }
}

/// Open an existing repository at the given path.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::open(path).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            GitError::NotFound(path.display().to_string())
        } else {
            GitError::Git(e)
        }
    })?;
    Ok(repo)
}

/// Find the repository containing `start`, walking up parent directories.
pub fn discover_repository(start: &Path) -> Result<Repository, GitError> {
    let repo = Repository::discover(start).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            GitError::NotFound(start.display().to_string())
        } else {
            GitError::Git(e)
        }
    })?;
    Ok(repo)
}

/// Record where HEAD currently points.
pub fn resolve_head(repo: &Repository) -> Result<HeadState, GitError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let name = repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(str::to_string))
                .unwrap_or_else(|| "HEAD".to_string());
            let name = name.strip_prefix("refs/heads/").unwrap_or(&name).to_string();
            return Err(GitError::UnbornHead(name));
        }
        Err(e) => return Err(GitError::Git(e)),
    };

    let commit = head.peel_to_commit()?.id();

    if repo.head_detached()? {
        return Ok(HeadState::Detached { commit });
    }

    let ref_name = head
        .name()
        .ok_or_else(|| GitError::ParseError("HEAD reference has no name".to_string()))?;
    let name = ref_name
        .strip_prefix("refs/heads/")
        .ok_or_else(|| {
            GitError::ParseError(format!(
                "unexpected HEAD format: expected 'refs/heads/<branch>', got '{}'",
                ref_name
            ))
        })?
        .to_string();

    Ok(HeadState::Branch { name, commit })
}

/// Tracked paths whose index or working-tree content differs from HEAD.
///
/// A submodule is reported under its own path when its checkout has moved or
/// holds uncommitted changes. Untracked and ignored files are not reported;
/// they survive a checkout.
pub fn dirty_paths(repo: &Repository) -> Result<Vec<String>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false)
        .include_ignored(false)
        .exclude_submodules(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut paths: Vec<String> = statuses
        .iter()
        .filter(|entry| !entry.status().is_empty() && !entry.status().is_ignored())
        .map(|entry| String::from_utf8_lossy(entry.path_bytes()).into_owned())
        .collect();
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Check whether `refs/heads/<name>` exists.
pub fn branch_exists(repo: &Repository, name: &str) -> Result<bool, GitError> {
    match repo.find_branch(name, BranchType::Local) {
        Ok(_) => Ok(true),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
        Err(e) => Err(GitError::Git(e)),
    }
}

/// Commit the full ref `refname` points at.
pub fn branch_tip(repo: &Repository, refname: &str) -> Result<Oid, GitError> {
    let reference = repo.find_reference(refname)?;
    Ok(reference.peel_to_commit()?.id())
}

/// Paths of the blobs (regular files and symlinks) in `commit`'s tree.
///
/// Submodule entries are skipped: their checkouts belong to the submodule.
pub fn tracked_files(repo: &Repository, commit: Oid) -> Result<Vec<String>, GitError> {
    let tree = repo.find_commit(commit)?.tree()?;
    let mut files = Vec::new();
    let mut unreadable = None;

    let walked = tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() != Some(ObjectType::Blob) {
            return TreeWalkResult::Ok;
        }
        match entry.name() {
            Some(name) => files.push(format!("{}{}", root, name)),
            None => {
                unreadable = Some(format!(
                    "{}{}",
                    root,
                    String::from_utf8_lossy(entry.name_bytes())
                ));
                return TreeWalkResult::Abort;
            }
        }
        TreeWalkResult::Ok
    });

    if let Some(path) = unreadable {
        return Err(GitError::ParseError(format!(
            "tracked path '{}' is not valid UTF-8",
            path
        )));
    }
    walked?;
    Ok(files)
}

/// Write a tree containing only `blob` at the `/`-separated `path`.
///
/// Intermediate directories become nested trees with one entry each.
pub fn write_single_file_tree(
    repo: &Repository,
    path: &str,
    blob: Oid,
    filemode: i32,
) -> Result<Oid, GitError> {
    let components: Vec<&str> = path.split('/').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(GitError::InvalidInput(format!(
            "path '{}' has an empty component",
            path
        )));
    }
    Ok(write_tree_level(repo, &components, blob, filemode)?)
}

fn write_tree_level(
    repo: &Repository,
    components: &[&str],
    blob: Oid,
    filemode: i32,
) -> Result<Oid, git2::Error> {
    let mut builder = repo.treebuilder(None)?;
    match components {
        [name] => {
            builder.insert(*name, blob, filemode)?;
        }
        [dir, rest @ ..] => {
            let subtree = write_tree_level(repo, rest, blob, filemode)?;
            builder.insert(*dir, subtree, TREE_FILEMODE)?;
        }
        [] => return Err(git2::Error::from_str("cannot build a tree for an empty path")),
    }
    builder.write()
}

/// Create a parentless commit for `tree` without updating any ref.
///
/// Uses the repository's configured identity for author and committer.
pub fn create_orphan_commit(repo: &Repository, tree: Oid, message: &str) -> Result<Oid, GitError> {
    let signature: Signature<'static> = repo.signature()?;
    let tree = repo.find_tree(tree)?;
    Ok(repo.commit(None, &signature, &signature, message, &tree, &[])?)
}

/// Create the branch ref `refs/heads/<name>` at `commit`, failing if it
/// already exists.
pub fn create_branch_ref(repo: &Repository, refname: &str, commit: Oid) -> Result<(), GitError> {
    let name = refname.strip_prefix("refs/heads/").ok_or_else(|| {
        GitError::InvalidInput(format!("'{}' is not a local branch ref", refname))
    })?;
    validate_git_ref(name, "branch")?;
    let log_message = format!("branch-subset: created {}", name);
    repo.reference(refname, commit, false, &log_message)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[test]
    fn open_repository_not_found() {
        use tempfile::tempdir;

        let temp_dir = tempdir().expect("Failed to create temp directory");
        let nonexistent = temp_dir.path().join("nonexistent");

        let result = open_repository(&nonexistent);
        assert!(result.is_err(), "Should fail for nonexistent path");

        let err = result.err().unwrap();
        match err {
            GitError::NotFound(path) => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn discover_repository_walks_up_from_subdirectory() {
        let fixture = Fixture::with_assets();
        let nested = fixture.path().join("grb").join("vector");

        let repo = discover_repository(&nested).expect("discover failed");
        let workdir = repo.workdir().expect("should have a workdir");
        assert_eq!(
            workdir.canonicalize().unwrap(),
            fixture.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn resolve_head_reports_attached_branch() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();

        let head = resolve_head(&repo).expect("resolve_head failed");
        assert_eq!(head.branch(), Some("main"));
        assert_eq!(head.commit().to_string(), fixture.rev_parse("HEAD"));
    }

    #[test]
    fn resolve_head_reports_detached_commit() {
        let fixture = Fixture::with_assets();
        fixture.git(&["checkout", "-q", "--detach"]);
        let repo = fixture.repo();

        let head = resolve_head(&repo).expect("resolve_head failed");
        assert!(matches!(head, HeadState::Detached { .. }));
        assert_eq!(head.branch(), None);
        assert_eq!(head.commit().to_string(), fixture.rev_parse("HEAD"));
    }

    #[test]
    fn resolve_head_rejects_unborn_branch() {
        let fixture = Fixture::empty();
        let repo = fixture.repo();

        match resolve_head(&repo) {
            Err(GitError::UnbornHead(name)) => assert_eq!(name, "main"),
            other => panic!("Expected UnbornHead, got: {:?}", other),
        }
    }

    #[test]
    fn dirty_paths_empty_for_clean_tree_with_untracked_files() {
        let fixture = Fixture::with_assets();
        fixture.write("scratch.txt", b"not tracked");
        let repo = fixture.repo();

        assert!(dirty_paths(&repo).unwrap().is_empty());
    }

    #[test]
    fn dirty_paths_lists_modified_and_staged_files() {
        let fixture = Fixture::with_assets();
        fixture.write("README.md", b"changed");
        fixture.write("grb/new.txt", b"staged");
        fixture.git(&["add", "grb/new.txt"]);
        let repo = fixture.repo();

        let dirty = dirty_paths(&repo).unwrap();
        assert_eq!(dirty, vec!["README.md".to_string(), "grb/new.txt".to_string()]);
    }

    #[test]
    fn branch_lookups_see_cli_created_branches() {
        let fixture = Fixture::with_assets();
        fixture.git(&["branch", "feature/x"]);
        let repo = fixture.repo();

        assert!(branch_exists(&repo, "feature/x").unwrap());
        assert!(!branch_exists(&repo, "feature/y").unwrap());
        assert_eq!(
            branch_tip(&repo, "refs/heads/feature/x").unwrap().to_string(),
            fixture.rev_parse("main")
        );
    }

    #[test]
    fn command_failure_carries_stderr() {
        let fixture = Fixture::with_assets();
        let cli = GitCli::new();

        let result = cli.delete_branch(fixture.path(), "does-not-exist");
        match result {
            Err(GitError::CommandFailed {
                command, stderr, ..
            }) => {
                assert!(command.contains("branch -q -D does-not-exist"));
                assert!(!stderr.is_empty());
            }
            other => panic!("Expected CommandFailed, got: {:?}", other),
        }
    }

    #[test]
    fn missing_git_binary_is_io_error() {
        let fixture = Fixture::with_assets();
        let cli = GitCli::with_git_path("/nonexistent/bin/git");

        let result = cli.commit(fixture.path(), "message");
        assert!(matches!(result, Err(GitError::Io(_))));
    }

    #[test]
    fn cli_runs_against_explicit_repo_path() {
        let fixture = Fixture::with_assets();
        let cli = GitCli::new();
        let repo = fixture.repo();
        let head = resolve_head(&repo).unwrap();

        cli.checkout_orphan(fixture.path(), "scratch").expect("orphan failed");
        assert_eq!(fixture.git(&["symbolic-ref", "HEAD"]).trim(), "refs/heads/scratch");

        cli.checkout_head(fixture.path(), &head).expect("restore failed");
        assert_eq!(resolve_head(&repo).unwrap().branch(), Some("main"));
    }

    #[test]
    fn write_single_file_tree_nests_directories() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();
        let blob = repo.blob(b"<svg/>").unwrap();

        let tree_id = write_single_file_tree(&repo, "grb/vector/logo.svg", blob, 0o100644).unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        assert_eq!(tree.len(), 1);
        let entry = tree.get_path(Path::new("grb/vector/logo.svg")).unwrap();
        assert_eq!(entry.id(), blob);
        let grb = tree.get_path(Path::new("grb")).unwrap();
        assert_eq!(repo.find_tree(grb.id()).unwrap().len(), 1);
    }

    #[test]
    fn write_single_file_tree_rejects_empty_components() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();
        let blob = repo.blob(b"x").unwrap();

        let result = write_single_file_tree(&repo, "grb//logo.svg", blob, 0o100644);
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }

    #[test]
    fn create_branch_ref_refuses_to_overwrite() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap().id();

        create_branch_ref(&repo, "refs/heads/pinned", head).expect("first create failed");
        let second = create_branch_ref(&repo, "refs/heads/pinned", head);
        assert!(matches!(second, Err(GitError::Git(_))));
    }

    #[test]
    fn create_branch_ref_only_writes_local_branches() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap().id();

        let result = create_branch_ref(&repo, "refs/tags/pinned", head);
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
        let result = create_branch_ref(&repo, "refs/heads/-pinned", head);
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }

    #[test]
    fn tracked_files_lists_blobs_and_skips_submodules() {
        let fixture = Fixture::with_assets();
        let upstream = Fixture::with_assets();
        fixture.add_submodule(&upstream, "vendor/sub");
        let repo = fixture.repo();

        let files = tracked_files(&repo, resolve_head(&repo).unwrap().commit()).unwrap();
        assert_eq!(
            files,
            vec![
                ".gitmodules",
                "README.md",
                "docs/pattern notes.md",
                "grb/raster/logo.png",
                "grb/vector/logo.svg",
            ]
        );
    }

    #[test]
    fn dirty_paths_reports_modified_submodule() {
        let fixture = Fixture::with_assets();
        let upstream = Fixture::with_assets();
        fixture.add_submodule(&upstream, "vendor/sub");
        let repo = fixture.repo();
        assert!(dirty_paths(&repo).unwrap().is_empty());

        fixture.write("vendor/sub/README.md", b"local edit\n");
        assert_eq!(dirty_paths(&repo).unwrap(), vec!["vendor/sub".to_string()]);
    }

    #[test]
    fn literal_pathspecs_do_not_expand_globs() {
        let fixture = Fixture::with_assets();
        fixture.write("art/a*.svg", b"<svg>star</svg>");
        fixture.write("art/abc.svg", b"<svg>abc</svg>");
        fixture.commit_all("glob-named file");
        let source = fixture.rev_parse("HEAD");
        let cli = GitCli::new();

        cli.checkout_orphan(fixture.path(), "scratch").unwrap();
        cli.clear_index(fixture.path()).unwrap();
        cli.checkout_path(fixture.path(), &source, "art/a*.svg").unwrap();

        let staged = fixture.git(&["ls-files"]);
        assert_eq!(staged.lines().collect::<Vec<_>>(), vec!["art/a*.svg"]);
    }

    #[test]
    fn create_orphan_commit_has_no_parent() {
        let fixture = Fixture::with_assets();
        let repo = fixture.repo();
        let blob = repo.blob(b"data").unwrap();
        let tree = write_single_file_tree(&repo, "a.txt", blob, 0o100644).unwrap();

        let commit = create_orphan_commit(&repo, tree, "orphan").unwrap();
        let commit = repo.find_commit(commit).unwrap();
        assert_eq!(commit.parent_count(), 0);
        assert_eq!(commit.author().name(), Some("Fixture"));
    }

    #[test]
    fn validate_git_ref_rejects_empty() {
        let result = validate_git_ref("", "branch");
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }

    #[test]
    fn validate_git_ref_rejects_path_traversal() {
        let result = validate_git_ref("foo/../bar", "branch");
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }

    #[test]
    fn validate_git_ref_rejects_leading_dash() {
        let result = validate_git_ref("-malicious", "branch");
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }

    #[test]
    fn validate_git_ref_accepts_valid_refs() {
        assert!(validate_git_ref("main", "branch").is_ok());
        assert!(validate_git_ref("subset/20240102-030405/logo", "branch").is_ok());
        assert!(validate_git_ref("abc123def456", "commit").is_ok());
    }

    #[test]
    fn checkout_orphan_rejects_invalid_branch() {
        let fixture = Fixture::with_assets();
        let result = GitCli::new().checkout_orphan(fixture.path(), "-malicious");
        assert!(matches!(result, Err(GitError::InvalidInput(_))));
    }
}
