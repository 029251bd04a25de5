//! `partcat init` command - Initialize a new catalog

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the config even if .partcat/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            if !global.quiet {
                println!(
                    "{} Initialized partcat catalog at {}",
                    style("✓").green(),
                    style(project.root().display()).cyan()
                );
                println!();
                println!("Next steps:");
                println!(
                    "  {} Generate sample parts",
                    style("partcat generate --count 100").yellow()
                );
                println!("  {} Browse the catalog", style("partcat list").yellow());
            }
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} partcat catalog already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("partcat init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
