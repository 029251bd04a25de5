//! `partcat generate` command - bulk-generate linked sample parts

use miette::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cli::commands::open_catalog;
use crate::cli::output::{or_server_error, print_envelope, print_parts};
use crate::cli::GlobalOpts;
use crate::core::generate::generate_and_link;
use crate::entities::part::Part;

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Number of parts to create (default: generate_batch_size from config)
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Seed for reproducible part contents
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse<'a> {
    success: bool,
    message: String,
    count: usize,
    linked_count: usize,
    failed_count: usize,
    data: &'a [Part],
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;
    let count = args.count.unwrap_or_else(|| catalog.config.batch_size());
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    let outcome = or_server_error(
        generate_and_link(
            &mut catalog.store,
            count,
            catalog.config.sample_size(),
            &mut rng,
        ),
        global.format,
    );

    if global.format.is_structured() {
        print_envelope(
            &GenerateResponse {
                success: true,
                message: format!("Successfully generated {} parts", outcome.created),
                count: outcome.created,
                linked_count: outcome.report.updated,
                failed_count: outcome.report.failed,
                data: &outcome.sample,
            },
            global.format,
        )
    } else {
        print_parts(&outcome.sample, global.format, global.quiet)
    }
}
