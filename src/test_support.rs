//! Throwaway repositories for unit tests.

use git2::Repository;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

pub const LOGO_SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><circle r=\"4\"/></svg>\n";
pub const LOGO_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

/// A git repository in a temporary directory, removed on drop.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// An initialised repository on `main` with no commits.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let fixture = Self { dir };
        fixture.git(&["init", "-q"]);
        fixture.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        fixture.git(&["config", "user.name", "Fixture"]);
        fixture.git(&["config", "user.email", "fixture@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture
    }

    /// A repository with a committed asset layout:
    ///
    /// ```text
    /// README.md
    /// grb/vector/logo.svg
    /// grb/raster/logo.png
    /// docs/pattern notes.md
    /// ```
    pub fn with_assets() -> Self {
        let fixture = Self::empty();
        fixture.write("README.md", b"# assets\n");
        fixture.write("grb/vector/logo.svg", LOGO_SVG);
        fixture.write("grb/raster/logo.png", LOGO_PNG);
        fixture.write("docs/pattern notes.md", b"submodules all the way down\n");
        fixture.commit_all("initial assets");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> Repository {
        Repository::open(self.path()).expect("Failed to open fixture repo")
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(path, contents).expect("Failed to write fixture file");
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.path().join(rel)).expect("Failed to read fixture file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    /// Run git in the fixture, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Add `upstream` as a submodule at `rel` and commit it.
    pub fn add_submodule(&self, upstream: &Fixture, rel: &str) {
        let url = upstream.path().to_str().expect("temp path is not UTF-8");
        self.git(&[
            "-c",
            "protocol.file.allow=always",
            "submodule",
            "add",
            "-q",
            url,
            rel,
        ]);
        self.git(&["commit", "-q", "-m", &format!("add submodule {}", rel)]);
    }

    /// Write an executable `git` wrapper into `dir` that refuses forced
    /// checkouts and hands every other invocation to the real git.
    #[cfg(unix)]
    pub fn git_refusing_forced_checkout(dir: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("git");
        fs::write(
            &script,
            "#!/bin/sh\n\
             case \" $* \" in\n\
             *\" checkout -f \"*) echo \"forced checkout refused\" >&2; exit 1 ;;\n\
             esac\n\
             exec git \"$@\"\n",
        )
        .expect("Failed to write git wrapper");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark git wrapper executable");
        script
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev]).trim().to_string()
    }

    /// Short name of the checked-out branch, or `HEAD` when detached.
    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
    }

    pub fn branches(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .lines()
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Paths in the tree of `rev`, recursively.
    pub fn tree_paths(&self, rev: &str) -> Vec<String> {
        self.git(&["ls-tree", "-r", "--name-only", rev])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Blob id of `path` at `rev`.
    pub fn blob_id(&self, rev: &str, path: &str) -> String {
        self.rev_parse(&format!("{}:{}", rev, path))
    }
}
