use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    tracing::{debug, warn},
};

use crate::schema::HarvestConfig;

const CONFIG_FILENAME: &str = "pocharvest.toml";

/// Load config from the given TOML file.
pub fn load_config(path: &Path) -> anyhow::Result<HarvestConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

/// Load config from an explicit path, or discover it in standard locations.
///
/// Search order:
/// 1. `./pocharvest.toml`
/// 2. `~/.config/pocharvest/pocharvest.toml`
///
/// An explicit path must exist and parse. A discovered file that fails to
/// parse is an error too: silently harvesting with defaults would commit to
/// the wrong place.
pub fn discover_and_load(explicit: Option<&Path>) -> anyhow::Result<HarvestConfig> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return load_config(path);
    }
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(HarvestConfig::default())
        },
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    config_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .filter(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/pocharvest/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pocharvest").map(|d| d.config_dir().to_path_buf())
}

/// Apply `POCHARVEST_*` overrides using the given variable lookup.
///
/// - `POCHARVEST_WORKSPACE`: persistent clone root.
/// - `POCHARVEST_NO_COMMIT`: any of `1`, `true`, `yes` disables publishing.
pub fn apply_env_overrides(
    cfg: &mut HarvestConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(dir) = lookup("POCHARVEST_WORKSPACE").filter(|v| !v.is_empty()) {
        cfg.clone.workspace = Some(PathBuf::from(dir));
    }
    if let Some(flag) = lookup("POCHARVEST_NO_COMMIT") {
        match flag.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => cfg.publish.enabled = false,
            "" | "0" | "false" | "no" => {},
            other => warn!(value = other, "ignoring unrecognised POCHARVEST_NO_COMMIT"),
        }
    }
}
