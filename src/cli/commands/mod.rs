//! CLI command implementations

pub mod add;
pub mod completions;
pub mod generate;
pub mod init;
pub mod list;
pub mod main_part;
pub mod repair;
pub mod show;
pub mod where_used;

use miette::Result;
use tracing::debug;

use crate::cli::output::{fail, store_failure, Failure};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::PartId;
use crate::core::project::{Project, ProjectError};
use crate::core::store::CatalogStore;

/// An opened catalog: its settings and its database
pub(crate) struct Catalog {
    pub config: Config,
    pub store: CatalogStore,
}

/// Locate the catalog from `--catalog` or the working directory and open it
pub(crate) fn open_catalog(global: &GlobalOpts) -> Result<Catalog> {
    let project = match &global.catalog {
        Some(dir) => Project::discover_from(dir),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let config = Config::load(Some(&project));
    let store = match project.open_store(&config) {
        Ok(store) => store,
        Err(ProjectError::Store(e)) => store_failure(&e, global.format),
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    debug!(root = %project.root().display(), "opened catalog");
    Ok(Catalog { config, store })
}

/// Parse a part id argument, answering malformed input with a client error
pub(crate) fn parse_part_id(raw: &str, global: &GlobalOpts) -> PartId {
    match raw.parse::<PartId>() {
        Ok(id) => id,
        Err(e) => fail(
            Failure::Client,
            &format!("Invalid part id '{}': {}", raw, e),
            global.format,
        ),
    }
}
