//! Catalog directory discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::store::{CatalogStore, StoreError};

/// Marker directory at the root of a catalog
pub const CATALOG_DIR: &str = ".partcat";

/// A partcat catalog on disk
#[derive(Debug)]
pub struct Project {
    /// Directory holding `.partcat/`
    root: PathBuf,
}

impl Project {
    /// Find the catalog root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the catalog root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(CATALOG_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.partcat/` with a default config and an empty database
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(CATALOG_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_layout(root)
    }

    /// Initialize even if `.partcat/` exists
    ///
    /// The config file is rewritten; an existing database keeps its parts.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_layout(root)
    }

    fn write_layout(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.catalog_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        project.open_store(&Config::default())?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# partcat catalog configuration

# SQLite database, relative to the catalog root
# database: .partcat/catalog.db

# Page size for `partcat list` when --limit is not given
# default_page_size: 50

# Parts created by `partcat generate` when --count is not given
# generate_batch_size: 1000

# Generated parts echoed back in the response
# generate_sample_size: 5

# Newest parts used as the pool for `partcat repair`
# repair_pool_size: 100

# tracing filter, overridden by RUST_LOG
# log_filter: partcat=warn
"#
    }

    /// Get the catalog root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the `.partcat` directory
    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join(CATALOG_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.catalog_dir().join("config.yaml")
    }

    /// Open the catalog database named by the config
    pub fn open_store(&self, config: &Config) -> Result<CatalogStore, ProjectError> {
        Ok(CatalogStore::open(&config.database_path(&self.root))?)
    }
}

/// Errors that can occur during catalog operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a partcat catalog (searched from {searched_from:?}). Run 'partcat init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("partcat catalog already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
