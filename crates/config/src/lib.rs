//! Configuration loading and environment overrides.
//!
//! Config file: `pocharvest.toml`, searched in `./` then
//! `~/.config/pocharvest/`. Every section falls back to defaults, so an
//! absent file yields a working harvest of pocsuite3 plugins.

pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{
        CloneConfig, FilterConfig, HarvestConfig, PathsConfig, PublishConfig, QueryConfig,
        QueryKind, ScanConfig, SearchConfig,
    },
};
