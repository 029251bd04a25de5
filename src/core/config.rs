//! Configuration management with layered hierarchy
//!
//! Later layers win: built-in defaults, the global user file, the catalog's
//! `.partcat/config.yaml`, then environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::paginate::DEFAULT_PAGE_SIZE;
use crate::core::project::{Project, CATALOG_DIR};

/// Default number of parts made by `partcat generate`
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default number of generated parts echoed back
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Default size of the canonical pool for random repair
pub const DEFAULT_POOL_SIZE: usize = 100;

/// File name of the catalog database inside `.partcat/`
pub const DATABASE_FILE: &str = "catalog.db";

/// partcat configuration
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file, relative paths resolve against the catalog root
    pub database: Option<PathBuf>,

    /// Page size when `--limit` is absent or invalid
    pub default_page_size: Option<usize>,

    pub generate_batch_size: Option<usize>,

    pub generate_sample_size: Option<usize>,

    pub repair_pool_size: Option<usize>,

    /// tracing filter directive, e.g. `partcat=info`
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/partcat/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Catalog config (.partcat/config.yaml)
        if let Some(project) = project {
            if let Some(local) = Self::read_file(&project.config_path()) {
                config.merge(local);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse one config file; missing or invalid files yield nothing
    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partcat")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Apply `PARTCAT_DB` and `PARTCAT_PAGE_SIZE`
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("PARTCAT_DB").filter(|v| !v.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
        if let Some(size) = lookup("PARTCAT_PAGE_SIZE").and_then(|v| v.trim().parse().ok()) {
            self.default_page_size = Some(size);
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_page_size.is_some() {
            self.default_page_size = other.default_page_size;
        }
        if other.generate_batch_size.is_some() {
            self.generate_batch_size = other.generate_batch_size;
        }
        if other.generate_sample_size.is_some() {
            self.generate_sample_size = other.generate_sample_size;
        }
        if other.repair_pool_size.is_some() {
            self.repair_pool_size = other.repair_pool_size;
        }
        if other.log_filter.is_some() {
            self.log_filter = other.log_filter;
        }
    }

    pub fn page_size(&self) -> usize {
        self.default_page_size
            .filter(|&n| n >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn batch_size(&self) -> usize {
        self.generate_batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn sample_size(&self) -> usize {
        self.generate_sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE)
    }

    pub fn pool_size(&self) -> usize {
        self.repair_pool_size
            .filter(|&n| n >= 1)
            .unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Resolve the database file for a catalog rooted at `root`
    pub fn database_path(&self, root: &Path) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root.join(path),
            None => root.join(CATALOG_DIR).join(DATABASE_FILE),
        }
    }
}
