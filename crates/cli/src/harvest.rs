//! The end-to-end harvest: search, clone, scan, publish.

use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    pocharvest_clone::{CloneReport, Cloner},
    pocharvest_config::HarvestConfig,
    pocharvest_publish::{CommitOutcome, GitPublisher, write_summary},
    pocharvest_scanner::{LedgerStore, PluginMatcher, ScanSummary, Scanner},
    pocharvest_search::{RepoSearch, candidates},
    tracing::{info, warn},
};

#[derive(Debug)]
pub struct HarvestReport {
    pub candidates: usize,
    pub clone: CloneReport,
    pub scan: ScanSummary,
    /// Entries in the output directory after the run.
    pub archive_size: usize,
    /// `None` when publishing is disabled or the commit failed.
    pub commit: Option<CommitOutcome>,
}

/// Run every stage once.
///
/// Per-repository problems (failed searches, failed clones, unreadable files)
/// only shrink the result; the run still writes the summary and commits.
pub async fn harvest(cfg: &HarvestConfig, search: &dyn RepoSearch) -> anyhow::Result<HarvestReport> {
    let output_dir = cfg.paths.output_path();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let store = LedgerStore::new(cfg.paths.ledger_path());
    let mut ledger = store.load_or_init()?;
    info!(
        sources = ledger.source_count(),
        files = ledger.file_count(),
        "ledger loaded"
    );

    let discovered = search.search_all(&cfg.search.queries).await;
    let candidates: Vec<String> =
        candidates::merge(ledger.sources(), discovered, &cfg.filter.exclude)
            .into_iter()
            .collect();
    info!(candidates = candidates.len(), "candidate set built");

    let (clone_root, _tmp) = workspace(cfg.clone.workspace.as_deref())?;
    let clone = Cloner::from_config(&cfg.clone)
        .clone_all(&candidates, &clone_root)
        .await?;

    let scanner = Scanner::new(
        PluginMatcher::from_config(&cfg.scan)?,
        cfg.scan.extensions.clone(),
        clone_root,
        output_dir.clone(),
    );
    let scan = scanner.scan_all(&candidates, &mut ledger, &store)?;

    let archive_size = write_summary(
        &cfg.paths.summary_path(),
        &cfg.publish.summary_title,
        &output_dir,
    )?;
    info!(archive_size, "summary written");

    let commit = if cfg.publish.enabled {
        let publisher = GitPublisher::new(cfg.paths.root.clone(), cfg.publish.git.clone());
        let paths = [
            cfg.paths.ledger.as_path(),
            cfg.paths.output_dir.as_path(),
            cfg.paths.summary.as_path(),
        ];
        match publisher.commit(&paths, &cfg.publish.commit_message) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "failed to commit harvest results");
                None
            },
        }
    } else {
        info!("publishing disabled, skipping commit");
        None
    };

    Ok(HarvestReport {
        candidates: candidates.len(),
        clone,
        scan,
        archive_size,
        commit,
    })
}

/// Clone root for this run. Without a configured workspace a temporary
/// directory is created; it lives as long as the returned guard.
fn workspace(configured: Option<&Path>) -> anyhow::Result<(PathBuf, Option<tempfile::TempDir>)> {
    match configured {
        Some(dir) => Ok((dir.to_path_buf(), None)),
        None => {
            let tmp = tempfile::Builder::new()
                .prefix("pocharvest-")
                .tempdir()
                .context("failed to create temporary clone workspace")?;
            Ok((tmp.path().to_path_buf(), Some(tmp)))
        },
    }
}
