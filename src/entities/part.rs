//! Part entity - catalog parts with embedded child-part references

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::PartId;

/// Maximum number of file references on a documentation record
pub const MAX_DOCUMENT_FILES: usize = 5;

/// Kind of documentation attached to a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentationType {
    CertificateOfConformance,
    MaterialCertificate,
    RohsCertificate,
    ReachCertificate,
    TestReport,
    InspectionReport,
    Datasheet,
    UserManual,
    InstallationManual,
    MaintenanceManual,
}

impl DocumentationType {
    /// Get all documentation kinds
    pub fn all() -> &'static [DocumentationType] {
        &[
            DocumentationType::CertificateOfConformance,
            DocumentationType::MaterialCertificate,
            DocumentationType::RohsCertificate,
            DocumentationType::ReachCertificate,
            DocumentationType::TestReport,
            DocumentationType::InspectionReport,
            DocumentationType::Datasheet,
            DocumentationType::UserManual,
            DocumentationType::InstallationManual,
            DocumentationType::MaintenanceManual,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentationType::CertificateOfConformance => "certificateOfConformance",
            DocumentationType::MaterialCertificate => "materialCertificate",
            DocumentationType::RohsCertificate => "rohsCertificate",
            DocumentationType::ReachCertificate => "reachCertificate",
            DocumentationType::TestReport => "testReport",
            DocumentationType::InspectionReport => "inspectionReport",
            DocumentationType::Datasheet => "datasheet",
            DocumentationType::UserManual => "userManual",
            DocumentationType::InstallationManual => "installationManual",
            DocumentationType::MaintenanceManual => "maintenanceManual",
        }
    }
}

impl std::fmt::Display for DocumentationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Invalid documentation type: {}", s))
    }
}

/// Documentation attached to a part (certificate, manual, report)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRecord {
    #[serde(rename = "type")]
    pub doc_type: DocumentationType,

    pub value: String,

    pub date_added: DateTime<Utc>,

    /// File references, at most five
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_by: Option<String>,
}

/// Supplier contact details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Child part entry embedded in a parent's bill of materials
///
/// Entries have no identity of their own. They are only ever replaced as a
/// whole list, see [`Part::replace_child_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPartRef {
    pub part_number: String,

    pub part_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Canonical part this entry stands for
    #[serde(default)]
    pub main_part_id: Option<PartId>,
}

fn default_quantity() -> u32 {
    1
}

impl ChildPartRef {
    /// Create an unlinked placeholder entry
    pub fn placeholder(part_number: impl Into<String>, part_name: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            part_name: part_name.into(),
            description: None,
            supplier: None,
            quantity: 1,
            main_part_id: None,
        }
    }
}

/// A catalog part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: PartId,

    /// Human-readable code, unique across the catalog
    pub part_number: String,

    #[serde(default)]
    pub alternative_part_numbers: Vec<String>,

    pub part_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: Vec<String>,

    #[serde(default)]
    pub sub_category: Vec<String>,

    #[serde(default)]
    pub supplier: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    /// Free-form specification bag
    #[serde(default)]
    pub specifications: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub documentation: Vec<DocumentationRecord>,

    #[serde(default)]
    pub child_parts: Vec<ChildPartRef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Create a new part with required fields
    pub fn new(part_number: impl Into<String>, part_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PartId::new(),
            part_number: part_number.into(),
            alternative_part_numbers: Vec::new(),
            part_name: part_name.into(),
            description: String::new(),
            category: Vec::new(),
            sub_category: Vec::new(),
            supplier: Vec::new(),
            contact: None,
            specifications: BTreeMap::new(),
            documentation: Vec::new(),
            child_parts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the whole child list and bump the update timestamp
    pub fn replace_child_parts(&mut self, children: Vec<ChildPartRef>) {
        self.child_parts = children;
        self.updated_at = Utc::now();
    }

    /// Normalize the tag sets so each tag appears once, keeping first-seen order
    pub fn dedup_tags(&mut self) {
        dedup_in_place(&mut self.category);
        dedup_in_place(&mut self.sub_category);
        dedup_in_place(&mut self.supplier);
    }

    /// Check the structural invariants of a part
    pub fn validate(&self) -> Result<(), PartError> {
        if self.part_number.trim().is_empty() {
            return Err(PartError::MissingPartNumber);
        }

        if let Some(child) = self.child_parts.iter().find(|c| c.quantity == 0) {
            return Err(PartError::ZeroQuantity(child.part_number.clone()));
        }

        if let Some(doc) = self
            .documentation
            .iter()
            .find(|d| d.files.len() > MAX_DOCUMENT_FILES)
        {
            return Err(PartError::TooManyFiles {
                doc_type: doc.doc_type,
                count: doc.files.len(),
            });
        }

        Ok(())
    }
}

fn dedup_in_place(tags: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
}

/// Structural problems with a part record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartError {
    #[error("part number must not be empty")]
    MissingPartNumber,

    #[error("child part '{0}' has quantity 0 (must be at least 1)")]
    ZeroQuantity(String),

    #[error("{doc_type} documentation lists {count} files (at most 5 allowed)")]
    TooManyFiles {
        doc_type: DocumentationType,
        count: usize,
    },
}
