use std::{
    path::{Path, PathBuf},
    process::Command,
};

use {
    anyhow::{Context, Result, bail},
    tracing::{debug, info},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// Stages and commits harvest results in an existing git work tree.
pub struct GitPublisher {
    repo_dir: PathBuf,
    git: String,
}

impl GitPublisher {
    pub fn new(repo_dir: PathBuf, git: impl Into<String>) -> Self {
        Self {
            repo_dir,
            git: git.into(),
        }
    }

    /// `git add` the given paths (relative to the repo or absolute), then
    /// commit them with `message`. No push.
    ///
    /// Only these paths go into the commit; anything else already staged
    /// stays staged.
    pub fn commit(&self, paths: &[&Path], message: &str) -> Result<CommitOutcome> {
        let mut add = self.command();
        add.arg("add").arg("--").args(paths);
        self.run(add, "add")?;

        // Exit code 0 means the index matches HEAD for these paths.
        let staged = self
            .command()
            .args(["diff", "--cached", "--quiet", "--"])
            .args(paths)
            .status()
            .context("failed to run git diff")?;
        if staged.success() {
            info!("nothing new to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let mut commit = self.command();
        commit.args(["commit", "-m", message, "--"]).args(paths);
        self.run(commit, "commit")?;
        info!(message, "committed harvest results");
        Ok(CommitOutcome::Committed)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(&self.repo_dir);
        cmd
    }

    fn run(&self, mut cmd: Command, what: &str) -> Result<()> {
        let output = cmd
            .output()
            .with_context(|| format!("failed to run git {what}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {what} failed: {}", stderr.trim());
        }
        debug!(what, "git command succeeded");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn git_output(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?} failed");
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn init_repo(repo: &Path) {
        git(repo, &["init", "-q"]);
        git(repo, &["config", "user.email", "harvest@example.com"]);
        git(repo, &["config", "user.name", "harvest"]);
        git(repo, &["config", "commit.gpgsign", "false"]);
    }

    #[test]
    fn test_missing_git_binary_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = GitPublisher::new(tmp.path().to_path_buf(), "/nonexistent/bin/git");
        let err = publisher
            .commit(&[Path::new("data.json")], "update pocs")
            .unwrap_err();
        assert!(err.to_string().contains("failed to run git add"));
    }

    #[test]
    fn test_commit_then_nothing_to_commit() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let repo = tmp.path();
        init_repo(repo);

        std::fs::create_dir_all(repo.join("poc")).unwrap();
        std::fs::write(repo.join("poc/a.py"), "x").unwrap();
        std::fs::write(repo.join("data.json"), "{}").unwrap();
        std::fs::write(repo.join("README.md"), "## summary\n").unwrap();
        std::fs::write(repo.join("unrelated.txt"), "left alone").unwrap();

        let publisher = GitPublisher::new(repo.to_path_buf(), "git");
        let paths = [Path::new("data.json"), Path::new("poc"), Path::new("README.md")];

        assert_eq!(
            publisher.commit(&paths, "update pocs").unwrap(),
            CommitOutcome::Committed
        );
        let tracked = git_output(repo, &["ls-files"]);
        assert!(tracked.contains("poc/a.py"));
        assert!(!tracked.contains("unrelated.txt"));

        assert_eq!(
            publisher.commit(&paths, "update pocs").unwrap(),
            CommitOutcome::NothingToCommit
        );
    }

    #[test]
    fn test_unrelated_staged_changes_are_not_committed() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let repo = tmp.path();
        init_repo(repo);

        std::fs::write(repo.join("base.txt"), "base").unwrap();
        git(repo, &["add", "base.txt"]);
        git(repo, &["commit", "-q", "-m", "base"]);

        std::fs::write(repo.join("data.json"), "{}").unwrap();
        std::fs::write(repo.join("unrelated.txt"), "work in progress").unwrap();
        git(repo, &["add", "unrelated.txt"]);

        let publisher = GitPublisher::new(repo.to_path_buf(), "git");
        let paths = [Path::new("data.json")];
        assert_eq!(
            publisher.commit(&paths, "update pocs").unwrap(),
            CommitOutcome::Committed
        );

        let committed = git_output(repo, &["show", "--name-only", "--format=", "HEAD"]);
        assert_eq!(committed.trim(), "data.json");
        let still_staged = git_output(repo, &["diff", "--cached", "--name-only"]);
        assert_eq!(still_staged.trim(), "unrelated.txt");

        // The leftover staged file alone is not a reason to commit again.
        assert_eq!(
            publisher.commit(&paths, "update pocs").unwrap(),
            CommitOutcome::NothingToCommit
        );
    }
}
