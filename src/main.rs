use clap::Parser;
use miette::Result;
use partcat::cli::commands;
use partcat::cli::{Cli, Commands, GlobalOpts};
use partcat::core::{Config, Project};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping to `head` terminates quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::List(args) => commands::list::run(args, &global),
        Commands::Generate(args) => commands::generate::run(args, &global),
        Commands::Repair(args) => commands::repair::run(args, &global),
        Commands::MainPart(args) => commands::main_part::run(args, &global),
        Commands::WhereUsed(args) => commands::where_used::run(args, &global),
        Commands::Add(args) => commands::add::run(args, &global),
        Commands::Show(args) => commands::show::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr so stdout carries only command output
///
/// `RUST_LOG` wins, then `--verbose`, then `log_filter` from config.
fn init_logging(global: &GlobalOpts) {
    let directive = if global.verbose {
        "partcat=debug".to_string()
    } else {
        let project = match &global.catalog {
            Some(dir) => Project::discover_from(dir).ok(),
            None => Project::discover().ok(),
        };
        Config::load(project.as_ref())
            .log_filter
            .unwrap_or_else(|| "partcat=warn".to_string())
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();
}
