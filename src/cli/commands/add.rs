//! `partcat add` command - insert a part from a YAML or JSON file

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::commands::open_catalog;
use crate::cli::output::{fail, print_envelope, store_failure, Failure};
use crate::cli::GlobalOpts;
use crate::core::identity::PartId;
use crate::core::store::{PartStore, StoreError};
use crate::entities::part::Part;

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Part file (.yaml, .yml, or .json); id and timestamps are assigned
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct AddResponse<'a> {
    success: bool,
    message: &'a str,
    data: &'a Part,
}

/// Parse a part file into a JSON value, picking the parser by extension
fn read_document(path: &Path) -> Result<Result<serde_json::Value, String>> {
    let contents = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    Ok(if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_yml::from_str(&contents).map_err(|e| e.to_string())
    })
}

/// Build a new part from a parsed document, assigning id and timestamps
fn part_from_document(mut doc: serde_json::Value) -> Result<Part, String> {
    let fields = doc
        .as_object_mut()
        .ok_or_else(|| "part file must contain a mapping".to_string())?;
    let now = serde_json::to_value(Utc::now()).map_err(|e| e.to_string())?;
    fields.insert("id".into(), PartId::new().to_string().into());
    fields.insert("createdAt".into(), now.clone());
    fields.insert("updatedAt".into(), now);

    let mut part: Part = serde_json::from_value(doc).map_err(|e| e.to_string())?;
    part.dedup_tags();
    part.validate().map_err(|e| e.to_string())?;
    Ok(part)
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let part = match read_document(&args.file)?.and_then(part_from_document) {
        Ok(part) => part,
        Err(message) => fail(
            Failure::Client,
            &format!("Invalid part: {}", message),
            global.format,
        ),
    };

    let mut catalog = open_catalog(global)?;
    match catalog.store.insert_many(std::slice::from_ref(&part)) {
        Ok(_) => {}
        Err(StoreError::DuplicatePartNumber(pn)) => fail(
            Failure::Client,
            &format!("Part number '{}' already exists", pn),
            global.format,
        ),
        Err(e) => store_failure(&e, global.format),
    }

    if global.format.is_structured() {
        print_envelope(
            &AddResponse {
                success: true,
                message: "Part created",
                data: &part,
            },
            global.format,
        )
    } else {
        if !global.quiet {
            println!(
                "{} Created part {} ({})",
                style("✓").green(),
                style(&part.part_number).yellow(),
                style(part.id).cyan()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_part_from_document_assigns_identity() {
        let doc = json!({
            "id": "PART-SHOULD-BE-REPLACED",
            "partNumber": "BRK-100",
            "partName": "Bracket",
            "category": ["Mechanical", "Mechanical", "Structural"],
            "childParts": [{"partNumber": "SCR-M3", "partName": "Screw", "quantity": 4}]
        });
        let part = part_from_document(doc).unwrap();
        assert_eq!(part.part_number, "BRK-100");
        assert_eq!(part.category, vec!["Mechanical", "Structural"]);
        assert_eq!(part.child_parts[0].quantity, 4);
        assert!(part.child_parts[0].main_part_id.is_none());
        assert_eq!(part.created_at, part.updated_at);
    }

    #[test]
    fn test_part_from_document_rejects_bad_input() {
        assert!(part_from_document(json!(["not", "a", "mapping"])).is_err());
        assert!(part_from_document(json!({"partName": "No number"})).is_err());
        let zero = json!({
            "partNumber": "BRK-101",
            "partName": "Bracket",
            "childParts": [{"partNumber": "X", "partName": "x", "quantity": 0}]
        });
        let err = part_from_document(zero).unwrap_err();
        assert!(err.contains("quantity 0"));
    }

    #[test]
    fn test_read_document_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let yaml = tmp.path().join("part.yaml");
        std::fs::write(&yaml, "partNumber: P-1\npartName: Plate\n").unwrap();
        let json_path = tmp.path().join("part.JSON");
        std::fs::write(&json_path, r#"{"partNumber": "P-2", "partName": "Pin"}"#).unwrap();

        let from_yaml = read_document(&yaml).unwrap().unwrap();
        assert_eq!(from_yaml["partNumber"], "P-1");
        let from_json = read_document(&json_path).unwrap().unwrap();
        assert_eq!(from_json["partName"], "Pin");
    }
}
