//! End-to-end tests for the changelog-build binary.
//!
//! These tests exercise the full CLI against real git repositories.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Test fixture: a repository with two tagged releases.
///
/// `v1.0.0` has entry 1; `v1.1.0` adds entries 2 and 10.
struct TestRepo {
    dir: TempDir,
    config: PathBuf,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-q"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);

        let repo = Self {
            config: dir.path().join("global.toml"),
            dir,
        };
        std::fs::write(&repo.config, "").unwrap();

        repo.commit(".changelog/1.txt", "[bug] Fixed the first thing\n");
        run_git(repo.path(), &["tag", "v1.0.0"]);
        repo.commit(
            ".changelog/2.txt",
            "```release-note:bug\nFixed a crash on empty input\n```\n",
        );
        repo.commit(
            ".changelog/10.txt",
            "[feature] New `--format` flag\n[bug] Fixed flag parsing\n",
        );
        run_git(repo.path(), &["tag", "v1.1.0"]);
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn commit(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-q", "-m", path]);
    }

    /// A command pointed at this repository with an empty global config.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("changelog-build").unwrap();
        cmd.arg("--git-dir")
            .arg(self.path())
            .arg("--config")
            .arg(&self.config)
            .env_remove("GITHUB_TOKEN");
        cmd
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn help_flag_works() {
    Command::cargo_bin("changelog-build")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--last-release"));
}

#[test]
fn markdown_between_releases() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--last-release", "v1.0.0", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stdout(
            "BUG\n\n\
             * Fixed flag parsing (#10)\n\
             * Fixed a crash on empty input (#2)\n\n\
             FEATURE\n\n\
             * New `--format` flag (#10)\n",
        );
}

#[test]
fn status_line_goes_to_stderr() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--last-release", "v1.0.0", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 new entries, 3 notes in 2 sections"));
}

#[test]
fn quiet_suppresses_status_line() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--quiet", "--last-release", "v1.0.0", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FEATURE"))
        .stderr(predicate::str::contains("new entries").not());
}

#[test]
fn first_release_includes_everything() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--last-release", "-", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed the first thing (#1)"));
}

#[test]
fn json_output() {
    let repo = TestRepo::new();

    let output = repo
        .cmd()
        .args([
            "--last-release",
            "v1.0.0",
            "--this-release",
            "v1.1.0",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["notes"].as_array().unwrap().len(), 3);
    assert_eq!(value["notes_by_type"]["bug"].as_array().unwrap().len(), 2);
    assert_eq!(value["notes_by_type"]["feature"][0]["issue"], "10");
}

#[test]
fn repo_config_is_applied() {
    let repo = TestRepo::new();
    std::fs::write(
        repo.path().join(".changelog-build.toml"),
        r#"
        repo = "hashicorp/consul"

        [render]
        note_format = "* {body} ([GH-{issue}](https://github.com/{repo}/issues/{issue}))"
        section_order = ["feature", "bug"]

        [render.headings]
        bug = "BUG FIXES"
        feature = "FEATURES"
        "#,
    )
    .unwrap();

    repo.cmd()
        .args(["--last-release", "v1.0.0", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "FEATURES\n\n* New `--format` flag ([GH-10](https://github.com/hashicorp/consul/issues/10))\n\nBUG FIXES",
        ));
}

#[test]
fn no_new_entries_prints_nothing() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--last-release", "v1.1.0", "--this-release", "v1.1.0"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn unknown_revision_fails() {
    let repo = TestRepo::new();

    repo.cmd()
        .args(["--last-release", "v0.0.1", "--this-release", "v1.1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:").and(predicate::str::contains("v0.0.1")));
}

#[test]
fn timestamp_mode_needs_a_token() {
    let repo = TestRepo::new();

    repo.cmd()
        .args([
            "--last-release",
            "v1.0.0",
            "--this-release",
            "v1.1.0",
            "--filename-format",
            "timestamp",
            "--repo",
            "hashicorp/consul",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn timestamp_mode_needs_a_repo() {
    let repo = TestRepo::new();

    repo.cmd()
        .env("GITHUB_TOKEN", "ghp_test")
        .args([
            "--last-release",
            "v1.0.0",
            "--this-release",
            "v1.1.0",
            "--filename-format",
            "timestamp",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn invalid_config_fails() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join(".changelog-build.toml"), "unknown = 1\n").unwrap();

    repo.cmd()
        .args(["--last-release", "v1.0.0", "--this-release", "v1.1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".changelog-build.toml"));
}

#[test]
fn not_a_repository() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("changelog-build")
        .unwrap()
        .args(["--last-release", "-", "--this-release", "HEAD", "--git-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open repository"));
}
