//! `partcat show` command - print one part

use miette::Result;

use crate::cli::commands::{open_catalog, parse_part_id};
use crate::cli::output::{fail, or_server_error, print_part, Failure};
use crate::cli::GlobalOpts;
use crate::core::store::PartStore;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part id (PART-<ULID>)
    pub id: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = parse_part_id(&args.id, global);
    let catalog = open_catalog(global)?;

    match or_server_error(catalog.store.get(&id), global.format) {
        Some(part) => print_part(&part, global.format),
        None => fail(Failure::NotFound, "Part not found", global.format),
    }
}
