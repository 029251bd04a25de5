//! partcat: a parts catalog with filtered listing and child-part reconciliation
//!
//! Parts carry embedded bill-of-materials entries that point at other parts.
//! The library compiles loose query parameters into predicate trees, pages
//! through a SQLite document store, and links child entries back to the
//! canonical parts they name.

pub mod cli;
pub mod core;
pub mod entities;
