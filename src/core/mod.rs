//! Core module - catalog engine and supporting types

pub mod config;
pub mod filter;
pub mod generate;
pub mod identity;
pub mod paginate;
pub mod project;
pub mod reconcile;
pub mod store;

pub use config::Config;
pub use filter::{compile, coerce_tags, CompiledFilter, Field, ListParams, Predicate, TagValue};
pub use identity::{IdParseError, PartId};
pub use paginate::{paginate, Page, PageRequest, Pagination};
pub use project::{Project, ProjectError};
pub use reconcile::{reconcile, CanonicalEntry, CanonicalPool, ReconcileReport, SelectionMode};
pub use store::{CatalogStore, FindOptions, PartStore, StoreError};
