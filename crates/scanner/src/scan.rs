use std::path::{Path, PathBuf};

use {
    pocharvest_clone::clone_dir,
    pocharvest_common::timestamp,
    tracing::{debug, info, warn},
    walkdir::{DirEntry, WalkDir},
};

use crate::{
    ledger::{Ledger, LedgerStore},
    pattern::PluginMatcher,
};

/// What scanning one repository produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub files_checked: usize,
    pub matched: usize,
    /// Filenames recorded and archived for the first time.
    pub archived: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub repos: usize,
    pub files_checked: usize,
    pub matched: usize,
    pub archived: usize,
}

/// Walks cloned repositories and archives plugin modules.
pub struct Scanner {
    matcher: PluginMatcher,
    extensions: Vec<String>,
    clone_root: PathBuf,
    output_dir: PathBuf,
}

impl Scanner {
    pub fn new(
        matcher: PluginMatcher,
        extensions: Vec<String>,
        clone_root: PathBuf,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            matcher,
            extensions,
            clone_root,
            output_dir,
        }
    }

    /// Scan every URL in order, checkpointing the ledger after each one.
    pub fn scan_all(
        &self,
        urls: &[String],
        ledger: &mut Ledger,
        store: &LedgerStore,
    ) -> anyhow::Result<ScanSummary> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut summary = ScanSummary::default();
        for url in urls {
            let report = self.scan_url(url, ledger, store)?;
            summary.repos += 1;
            summary.files_checked += report.files_checked;
            summary.matched += report.matched;
            summary.archived += report.archived.len();
        }
        info!(
            repos = summary.repos,
            files = summary.files_checked,
            matched = summary.matched,
            archived = summary.archived,
            "scan stage finished"
        );
        Ok(summary)
    }

    /// Scan one cloned repository, then persist the ledger.
    ///
    /// A repository whose clone is missing produces an empty report.
    pub fn scan_url(
        &self,
        url: &str,
        ledger: &mut Ledger,
        store: &LedgerStore,
    ) -> anyhow::Result<ScanReport> {
        let root = clone_dir(&self.clone_root, url);
        let mut report = ScanReport::default();

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_git_dir(e))
            .flatten();

        for entry in walker {
            if !entry.file_type().is_file() || !self.wants(entry.path()) {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };
            report.files_checked += 1;

            if !self.matcher.is_match(&content) {
                continue;
            }
            report.matched += 1;
            if ledger.contains(url, file_name) {
                continue;
            }

            let dest = self.output_dir.join(file_name);
            if let Err(e) = std::fs::copy(entry.path(), &dest) {
                warn!(%url, file = file_name, error = %e, "failed to archive plugin");
                continue;
            }
            ledger.record(url, file_name, &timestamp());
            debug!(%url, file = file_name, "archived new plugin");
            report.archived.push(file_name.to_string());
        }

        store.save(ledger)?;
        if !report.archived.is_empty() {
            info!(%url, new = report.archived.len(), "recorded new plugins");
        }
        Ok(report)
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}
