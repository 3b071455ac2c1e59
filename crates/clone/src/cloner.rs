use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use {
    futures::future::join_all,
    pocharvest_common::url_digest,
    pocharvest_config::CloneConfig,
    tracing::{debug, info},
};

/// Directory a repository is cloned into under `root`.
pub fn clone_dir(root: &Path, url: &str) -> PathBuf {
    root.join(url_digest(url))
}

/// Result of a single clone attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    /// Destination already existed; no process was spawned.
    Skipped,
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub cloned: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CloneReport {
    fn add(&mut self, outcome: CloneOutcome) {
        match outcome {
            CloneOutcome::Cloned => self.cloned += 1,
            CloneOutcome::Skipped => self.skipped += 1,
            CloneOutcome::Failed => self.failed += 1,
        }
    }
}

/// Runs `git clone --depth=N` for many repositories at once.
pub struct Cloner {
    git: String,
    depth: u32,
}

impl Cloner {
    pub fn new(git: impl Into<String>, depth: u32) -> Self {
        Self {
            git: git.into(),
            depth,
        }
    }

    pub fn from_config(cfg: &CloneConfig) -> Self {
        Self::new(cfg.git.clone(), cfg.depth)
    }

    /// Clone every URL into `root/<digest>`, all concurrently, and wait for
    /// every attempt to finish.
    ///
    /// Individual failures are only counted; a repository that failed to
    /// clone simply yields nothing when scanned.
    pub async fn clone_all(&self, urls: &[String], root: &Path) -> anyhow::Result<CloneReport> {
        tokio::fs::create_dir_all(root).await?;

        let attempts = urls
            .iter()
            .map(|url| self.clone_one(url, clone_dir(root, url)));
        let outcomes = join_all(attempts).await;

        let mut report = CloneReport::default();
        for outcome in outcomes {
            report.add(outcome);
        }
        info!(
            cloned = report.cloned,
            skipped = report.skipped,
            failed = report.failed,
            "clone stage finished"
        );
        Ok(report)
    }

    async fn clone_one(&self, url: &str, dest: PathBuf) -> CloneOutcome {
        if dest.exists() {
            debug!(%url, dest = %dest.display(), "already cloned, skipping");
            return CloneOutcome::Skipped;
        }

        let result = tokio::process::Command::new(&self.git)
            .arg("clone")
            .arg(format!("--depth={}", self.depth))
            .arg(url)
            .arg(&dest)
            // Deleted or private repos would otherwise block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => {
                debug!(%url, "cloned");
                CloneOutcome::Cloned
            },
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(%url, status = %output.status, error = %stderr.trim(), "git clone failed");
                CloneOutcome::Failed
            },
            Err(e) => {
                debug!(%url, error = %e, "failed to spawn git");
                CloneOutcome::Failed
            },
        }
    }
}
