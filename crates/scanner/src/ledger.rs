use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use {
    anyhow::Context,
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

/// Record of every `(repository url, filename)` pair already archived,
/// mapped to the time it was first seen.
///
/// Serialized as `{ "<url>": { "<filename>": "<timestamp>" } }`.
/// Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl Ledger {
    pub fn contains(&self, url: &str, file: &str) -> bool {
        self.entries
            .get(url)
            .is_some_and(|files| files.contains_key(file))
    }

    /// Record a first sighting. Returns `false` (and keeps the original
    /// timestamp) if the pair is already present.
    pub fn record(&mut self, url: &str, file: &str, timestamp: &str) -> bool {
        let files = self.entries.entry(url.to_string()).or_default();
        if files.contains_key(file) {
            return false;
        }
        files.insert(file.to_string(), timestamp.to_string());
        true
    }

    /// Repository URLs with at least one entry, in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn files(&self, url: &str) -> Option<&BTreeMap<String, String>> {
        self.entries.get(url)
    }

    pub fn source_count(&self) -> usize {
        self.entries.len()
    }

    pub fn file_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}

/// On-disk location of the ledger.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the ledger without touching the file. A missing file reads as
    /// empty; an unreadable or unparsable one is an error.
    pub fn load(&self) -> anyhow::Result<Ledger> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => serde_json::from_str(&data)
                .with_context(|| format!("unparsable ledger {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Ledger::default()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            },
        }
    }

    /// Load the ledger. A missing or unparsable file is replaced by an empty
    /// ledger, which is written out immediately.
    pub fn load_or_init(&self) -> anyhow::Result<Ledger> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(ledger) => return Ok(ledger),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "unparsable ledger, starting fresh");
                },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger yet, creating one");
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable ledger, starting fresh");
            },
        }

        let ledger = Ledger::default();
        self.save(&ledger)?;
        Ok(ledger)
    }

    /// Save atomically via temp file + rename, four-space indented.
    pub fn save(&self, ledger: &Ledger) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut data = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut data, formatter);
        ledger.serialize(&mut ser)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
