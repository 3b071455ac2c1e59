mod harvest;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    pocharvest_config::HarvestConfig,
    pocharvest_scanner::{Ledger, LedgerStore, PluginMatcher},
    pocharvest_search::{GithubSearch, RepoSearch, candidates},
    secrecy::SecretString,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "pocharvest",
    version,
    about = "Harvest pocsuite3 PoC plugins from public repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./pocharvest.toml, then ~/.config/pocharvest/).
    #[arg(long, global = true, env = "POCHARVEST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, clone, scan, and commit the results.
    Run {
        /// Write the ledger, archive and summary but do not commit.
        #[arg(long)]
        no_commit: bool,
        /// Keep clones in this directory instead of a temporary one.
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Print the candidate repositories without cloning anything.
    Search,
    /// Test local files against the plugin pattern.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show what the ledger has recorded so far.
    Ledger,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "pocharvest starting");

    let mut cfg = pocharvest_config::discover_and_load(cli.config.as_deref())?;
    pocharvest_config::apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());

    match cli.command {
        Commands::Run {
            no_commit,
            workspace,
        } => {
            if no_commit {
                cfg.publish.enabled = false;
            }
            if workspace.is_some() {
                cfg.clone.workspace = workspace;
            }
            let search = github_search(&cfg)?;
            let report = harvest::harvest(&cfg, &search).await?;
            println!(
                "{} candidates, {} cloned, {} skipped, {} failed, {} new plugins, {} archived in total",
                report.candidates,
                report.clone.cloned,
                report.clone.skipped,
                report.clone.failed,
                report.scan.archived,
                report.archive_size
            );
            Ok(())
        },
        Commands::Search => handle_search(&cfg).await,
        Commands::Check { files } => handle_check(&cfg, &files),
        Commands::Ledger => handle_ledger(&cfg),
    }
}

fn github_search(cfg: &HarvestConfig) -> anyhow::Result<GithubSearch> {
    let token = std::env::var(&cfg.search.token_env).unwrap_or_default();
    if token.is_empty() {
        warn!(
            var = %cfg.search.token_env,
            "no search token set, requests will be unauthenticated"
        );
    }
    Ok(GithubSearch::new(
        cfg.search.clone(),
        SecretString::new(token),
    )?)
}

/// Ledger contents for the read-only commands. Never writes the file, so a
/// corrupt ledger is reported instead of reset.
fn read_ledger(cfg: &HarvestConfig) -> anyhow::Result<Ledger> {
    LedgerStore::new(cfg.paths.ledger_path()).load()
}

async fn handle_search(cfg: &HarvestConfig) -> anyhow::Result<()> {
    let ledger = read_ledger(cfg)?;
    let search = github_search(cfg)?;
    let discovered = search.search_all(&cfg.search.queries).await;
    let found = candidates::merge(ledger.sources(), discovered, &cfg.filter.exclude);
    for url in &found {
        println!("{url}");
    }
    info!(candidates = found.len(), "search complete");
    Ok(())
}

fn handle_check(cfg: &HarvestConfig, files: &[PathBuf]) -> anyhow::Result<()> {
    let matcher = PluginMatcher::from_config(&cfg.scan)?;
    for file in files {
        let verdict = match std::fs::read_to_string(file) {
            Ok(content) if matcher.is_match(&content) => "match",
            Ok(_) => "no-match",
            Err(_) => "unreadable",
        };
        println!("{verdict}\t{}", file.display());
    }
    Ok(())
}

fn handle_ledger(cfg: &HarvestConfig) -> anyhow::Result<()> {
    let ledger = read_ledger(cfg)?;
    if ledger.source_count() == 0 {
        println!("Ledger is empty.");
        return Ok(());
    }
    for source in ledger.sources() {
        let count = ledger.files(source).map_or(0, |f| f.len());
        println!("  {source} ({count})");
    }
    println!(
        "\n{} files from {} repositories",
        ledger.file_count(),
        ledger.source_count()
    );
    Ok(())
}
