use std::path::PathBuf;

use serde::Deserialize;

/// Root configuration for a harvest run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub search: SearchConfig,
    pub filter: FilterConfig,
    pub clone: CloneConfig,
    pub scan: ScanConfig,
    pub paths: PathsConfig,
    pub publish: PublishConfig,
}

/// Which search endpoint a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// `/search/code`: items embed a `repository` object.
    Code,
    /// `/search/repositories`: items are repositories themselves.
    Repositories,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryConfig {
    pub kind: QueryKind,
    pub q: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_base: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
    pub user_agent: String,
    pub accept: String,
    pub max_pages: u32,
    pub per_page: u32,
    /// Skip TLS certificate verification for the search API.
    pub accept_invalid_certs: bool,
    pub queries: Vec<QueryConfig>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            token_env: "GH_TOKEN".into(),
            user_agent: "Mozilla/5.0".into(),
            accept: "application/vnd.github+json".into(),
            max_pages: 5,
            per_page: 100,
            accept_invalid_certs: false,
            queries: vec![
                QueryConfig {
                    kind: QueryKind::Code,
                    q: "\"pocsuite3.api\" language:Python".into(),
                },
                QueryConfig {
                    kind: QueryKind::Repositories,
                    q: "pocsuite3".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Repository URLs never cloned or scanned (the harvester's own repos).
    pub exclude: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                "https://github.com/20142995/pocsuite3".into(),
                "https://github.com/20142995/pocs".into(),
                "https://github.com/Natto97/pocsuite3".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    pub git: String,
    pub depth: u32,
    /// Persistent clone root. When unset, a temporary directory is used and
    /// removed once the run finishes.
    pub workspace: Option<PathBuf>,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            git: "git".into(),
            depth: 1,
            workspace: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (without the dot) considered for matching.
    pub extensions: Vec<String>,
    pub base_class: String,
    pub verify_method: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".into()],
            base_class: "POCBase".into(),
            verify_method: "_verify".into(),
        }
    }
}

/// Output locations. Relative paths resolve against `root`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub ledger: PathBuf,
    pub output_dir: PathBuf,
    pub summary: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ledger: PathBuf::from("data.json"),
            output_dir: PathBuf::from("poc"),
            summary: PathBuf::from("README.md"),
        }
    }
}

impl PathsConfig {
    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(&self.ledger)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(&self.summary)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub git: String,
    pub commit_message: String,
    pub summary_title: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            git: "git".into(),
            commit_message: "update pocs".into(),
            summary_title: "pocsuite3 PoC collection".into(),
        }
    }
}
