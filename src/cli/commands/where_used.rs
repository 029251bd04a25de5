//! `partcat where-used` command - parents that reference a part

use miette::Result;
use serde::Serialize;

use crate::cli::commands::{open_catalog, parse_part_id};
use crate::cli::output::{or_server_error, print_envelope, print_parts};
use crate::cli::GlobalOpts;
use crate::core::filter::{CompiledFilter, Field, Predicate};
use crate::core::paginate::{paginate, PageRequest, Pagination};
use crate::entities::part::Part;

#[derive(clap::Args, Debug)]
pub struct WhereUsedArgs {
    /// Part id to search for in child references
    pub id: String,

    /// Page number, 1-based
    #[arg(long, allow_hyphen_values = true)]
    pub page: Option<String>,

    /// Page size
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WhereUsedResponse<'a> {
    success: bool,
    count: usize,
    total: usize,
    pagination: &'a Pagination,
    data: &'a [Part],
}

pub fn run(args: WhereUsedArgs, global: &GlobalOpts) -> Result<()> {
    let id = parse_part_id(&args.id, global);
    let catalog = open_catalog(global)?;

    let filter = CompiledFilter::from(Predicate::Equals {
        field: Field::ChildMainPartId,
        value: id.to_string(),
    });
    let request = PageRequest::from_raw(
        args.page.as_deref(),
        args.limit.as_deref(),
        catalog.config.page_size(),
    );
    let page = or_server_error(paginate(&catalog.store, &filter, &request), global.format);

    if global.format.is_structured() {
        print_envelope(
            &WhereUsedResponse {
                success: true,
                count: page.count(),
                total: page.total,
                pagination: &page.pagination,
                data: &page.data,
            },
            global.format,
        )
    } else {
        print_parts(&page.data, global.format, global.quiet)
    }
}
