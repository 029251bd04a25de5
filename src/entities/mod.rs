//! Entity type definitions
//!
//! - [`Part`] - a catalog part with its documentation and child-part list

pub mod part;

pub use part::{ChildPartRef, Contact, DocumentationRecord, DocumentationType, Part, PartError};
