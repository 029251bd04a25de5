//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs, completions::CompletionsArgs, generate::GenerateArgs, init::InitArgs,
    list::ListArgs, main_part::MainPartArgs, repair::RepairArgs, show::ShowArgs,
    where_used::WhereUsedArgs,
};

#[derive(Parser)]
#[command(name = "partcat")]
#[command(author, version, about = "Parts catalog with filtered listing and child-part reconciliation")]
#[command(long_about = "Keeps a catalog of mechanical and electrical parts in a local SQLite database. \
Lists parts with loose query filters and pagination, bulk-generates sample data, and links \
bill-of-materials entries back to the parts they name.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Catalog root (default: auto-detect by finding .partcat/)
    #[arg(long, global = true, env = "PARTCAT_CATALOG")]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new catalog
    Init(InitArgs),

    /// List parts with filters and pagination
    List(ListArgs),

    /// Bulk-generate synthetic parts and link their child references
    Generate(GenerateArgs),

    /// Re-link every parent's child references against a canonical pool
    Repair(RepairArgs),

    /// Look up the canonical part a child reference points at
    MainPart(MainPartArgs),

    /// Find parents whose child parts reference a part
    WhereUsed(WhereUsedArgs),

    /// Add a part from a YAML or JSON file
    Add(AddArgs),

    /// Show one part
    Show(ShowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON response envelope
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// Aligned columns for the terminal
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// True for formats that print the full response envelope
    pub fn is_structured(self) -> bool {
        matches!(self, OutputFormat::Auto | OutputFormat::Json | OutputFormat::Yaml)
    }
}
