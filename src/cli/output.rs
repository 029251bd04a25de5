//! Response envelopes and part rendering
//!
//! Structured formats (`auto`, `json`, `yaml`) print the whole response
//! envelope on stdout. Table formats print only the parts it carries.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};
use tracing::error;

use crate::cli::helpers::{format_short_id, join_tags, truncate_str};
use crate::cli::OutputFormat;
use crate::core::store::StoreError;
use crate::entities::part::Part;

/// Why a request did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Malformed input from the caller
    Client,
    NotFound,
    /// Store failure; details go to the log, not the caller
    Server,
}

impl Failure {
    pub fn exit_code(self) -> i32 {
        match self {
            Failure::Client => 2,
            Failure::NotFound | Failure::Server => 1,
        }
    }
}

/// `{ "success": false, "message": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub success: bool,
    pub message: &'a str,
}

/// Print a failure envelope and exit with the matching code
pub fn fail(kind: Failure, message: &str, format: OutputFormat) -> ! {
    let envelope = ErrorEnvelope {
        success: false,
        message,
    };
    if format == OutputFormat::Yaml {
        print!("{}", serde_yml::to_string(&envelope).unwrap_or_default());
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&envelope).unwrap_or_default()
        );
    }
    std::process::exit(kind.exit_code());
}

/// Log a store error and answer with a generic server error
pub fn store_failure(err: &StoreError, format: OutputFormat) -> ! {
    error!(error = %err, "store operation failed");
    fail(Failure::Server, "Internal server error", format)
}

/// Unwrap a store result or answer with a server error
pub fn or_server_error<T>(result: Result<T, StoreError>, format: OutputFormat) -> T {
    match result {
        Ok(value) => value,
        Err(e) => store_failure(&e, format),
    }
}

/// Print a response envelope in a structured format
pub fn print_envelope<T: Serialize>(envelope: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(envelope).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let json = serde_json::to_string_pretty(envelope).into_diagnostic()?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Print parts as a table in one of the table formats
pub fn print_parts(parts: &[Part], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Tsv => print_tsv(parts, quiet),
        OutputFormat::Csv => print_csv(parts)?,
        OutputFormat::Md => print_md(parts),
        OutputFormat::Id => {
            for part in parts {
                println!("{}", part.id);
            }
        }
        OutputFormat::Auto | OutputFormat::Json | OutputFormat::Yaml => {
            print_envelope(&parts, format)?;
        }
    }
    Ok(())
}

fn print_tsv(parts: &[Part], quiet: bool) {
    println!(
        "{:<17} {:<20} {:<28} {:<22} {:<22} {:>5} {:<10}",
        style("ID").bold(),
        style("PART #").bold(),
        style("NAME").bold(),
        style("CATEGORY").bold(),
        style("SUPPLIER").bold(),
        style("KIDS").bold(),
        style("CREATED").bold()
    );
    println!("{}", "-".repeat(130));

    for part in parts {
        println!(
            "{:<17} {:<20} {:<28} {:<22} {:<22} {:>5} {:<10}",
            style(format_short_id(&part.id)).cyan(),
            truncate_str(&part.part_number, 20),
            truncate_str(&part.part_name, 28),
            truncate_str(&join_tags(&part.category), 22),
            truncate_str(&join_tags(&part.supplier), 22),
            part.child_parts.len(),
            part.created_at.format("%Y-%m-%d")
        );
    }

    if !quiet {
        println!();
        println!("{} part(s) shown.", style(parts.len()).cyan());
    }
}

fn print_csv(parts: &[Part]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer
        .write_record([
            "id",
            "part_number",
            "part_name",
            "category",
            "sub_category",
            "supplier",
            "child_parts",
            "created_at",
        ])
        .into_diagnostic()?;

    for part in parts {
        writer
            .write_record([
                part.id.to_string(),
                part.part_number.clone(),
                part.part_name.clone(),
                part.category.join(";"),
                part.sub_category.join(";"),
                part.supplier.join(";"),
                part.child_parts.len().to_string(),
                part.created_at.to_rfc3339(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()
}

fn print_md(parts: &[Part]) {
    let mut table = Builder::default();
    table.push_record(["ID", "Part #", "Name", "Category", "Supplier", "Children"]);
    for part in parts {
        table.push_record([
            format_short_id(&part.id),
            part.part_number.clone(),
            part.part_name.clone(),
            join_tags(&part.category),
            join_tags(&part.supplier),
            part.child_parts.len().to_string(),
        ]);
    }
    println!("{}", table.build().with(Style::markdown()));
}

/// Print one part in full
pub fn print_part(part: &Part, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Id => println!("{}", part.id),
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            print_parts(std::slice::from_ref(part), format, true)?
        }
        OutputFormat::Auto | OutputFormat::Json | OutputFormat::Yaml => {
            print_envelope(part, format)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Failure::Client.exit_code(), 2);
        assert_eq!(Failure::NotFound.exit_code(), 1);
        assert_eq!(Failure::Server.exit_code(), 1);
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ErrorEnvelope {
            success: false,
            message: "Part not found",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "Part not found"}));
    }
}
