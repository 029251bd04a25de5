//! `partcat list` command - filtered, paginated listing

use miette::Result;
use serde::Serialize;
use tracing::debug;

use crate::cli::commands::open_catalog;
use crate::cli::output::{or_server_error, print_envelope, print_parts};
use crate::cli::GlobalOpts;
use crate::core::filter::{compile, param, CompiledFilter, ListParams};
use crate::core::paginate::{paginate, PageRequest, Pagination};
use crate::entities::part::Part;

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Page number, 1-based (invalid values fall back to 1)
    #[arg(long, allow_hyphen_values = true)]
    pub page: Option<String>,

    /// Page size (invalid values fall back to the configured default)
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<String>,

    /// Search seven text fields at once; other filters are ignored
    #[arg(long, short = 's')]
    pub global_search: Option<String>,

    /// Substring of the part number
    #[arg(long)]
    pub part_number: Option<String>,

    /// Substring of the part name
    #[arg(long)]
    pub part_name: Option<String>,

    /// Substring of the description
    #[arg(long)]
    pub description: Option<String>,

    /// Substring of any alternative part number
    #[arg(long)]
    pub alternative_part_number: Option<String>,

    /// Category tag, or a JSON array of tags that must all be present
    #[arg(long, allow_hyphen_values = true)]
    pub category: Option<String>,

    /// Sub-category tag, or a JSON array of tags
    #[arg(long, allow_hyphen_values = true)]
    pub sub_category: Option<String>,

    /// Supplier tag, or a JSON array of tags
    #[arg(long, allow_hyphen_values = true)]
    pub supplier: Option<String>,

    /// Created on or after (RFC 3339 or YYYY-MM-DD); needs --end-date
    #[arg(long)]
    pub start_date: Option<String>,

    /// Created on or before (RFC 3339 or YYYY-MM-DD); needs --start-date
    #[arg(long)]
    pub end_date: Option<String>,

    /// Raw query parameter, e.g. `--param subCategory=Gear` (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

impl ListArgs {
    /// Collect flags into query parameters; named flags win over `--param`
    pub fn to_params(&self) -> ListParams {
        let mut params = ListParams::from_pairs(self.params.iter().cloned());
        params.set_opt(param::PAGE, self.page.as_deref());
        params.set_opt(param::LIMIT, self.limit.as_deref());
        params.set_opt(param::GLOBAL_SEARCH, self.global_search.as_deref());
        params.set_opt(param::PART_NUMBER, self.part_number.as_deref());
        params.set_opt(param::PART_NAME, self.part_name.as_deref());
        params.set_opt(param::DESCRIPTION, self.description.as_deref());
        params.set_opt(
            param::ALTERNATIVE_PART_NUMBER,
            self.alternative_part_number.as_deref(),
        );
        params.set_opt(param::CATEGORY, self.category.as_deref());
        params.set_opt(param::SUB_CATEGORY, self.sub_category.as_deref());
        params.set_opt(param::SUPPLIER, self.supplier.as_deref());
        params.set_opt(param::START_DATE, self.start_date.as_deref());
        params.set_opt(param::END_DATE, self.end_date.as_deref());
        params
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<'a> {
    success: bool,
    count: usize,
    total: usize,
    pagination: &'a Pagination,
    filters: &'a CompiledFilter,
    data: &'a [Part],
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let params = args.to_params();

    let filter = compile(&params);
    let request = PageRequest::from_raw(
        params.get(param::PAGE),
        params.get(param::LIMIT),
        catalog.config.page_size(),
    );
    debug!(?filter, page = request.page, limit = request.limit, "list parts");

    let page = or_server_error(paginate(&catalog.store, &filter, &request), global.format);

    if global.format.is_structured() {
        print_envelope(
            &ListResponse {
                success: true,
                count: page.count(),
                total: page.total,
                pagination: &page.pagination,
                filters: &filter,
                data: &page.data,
            },
            global.format,
        )
    } else {
        print_parts(&page.data, global.format, global.quiet)
    }
}
