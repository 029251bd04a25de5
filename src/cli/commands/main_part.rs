//! `partcat main-part` command - resolve a child reference to its part

use miette::Result;
use serde::Serialize;

use crate::cli::commands::{open_catalog, parse_part_id};
use crate::cli::output::{fail, or_server_error, print_envelope, print_part, Failure};
use crate::cli::GlobalOpts;
use crate::core::filter::{CompiledFilter, Field, Predicate};
use crate::core::store::PartStore;
use crate::entities::part::Part;

#[derive(clap::Args, Debug)]
pub struct MainPartArgs {
    /// The `mainPartId` of a child entry (PART-<ULID>)
    pub id: String,
}

#[derive(Debug, Serialize)]
struct MainPartResponse<'a> {
    success: bool,
    data: &'a Part,
}

pub fn run(args: MainPartArgs, global: &GlobalOpts) -> Result<()> {
    // Reject malformed ids before touching the catalog
    let id = parse_part_id(&args.id, global);
    let catalog = open_catalog(global)?;

    let filter = CompiledFilter::from(Predicate::Equals {
        field: Field::Id,
        value: id.to_string(),
    });
    let Some(part) = or_server_error(catalog.store.find_one(&filter), global.format) else {
        fail(Failure::NotFound, "Main part not found", global.format)
    };

    if global.format.is_structured() {
        print_envelope(
            &MainPartResponse {
                success: true,
                data: &part,
            },
            global.format,
        )
    } else {
        print_part(&part, global.format)
    }
}
