//! `partcat repair` command - re-link child references across the catalog
//!
//! Walks every parent page by page and rebuilds its child list against a
//! canonical pool. The default random mode reassigns children to arbitrary
//! recent parts and exists to exercise the update path; `--by-code` links
//! each child to the part its part number names.

use console::style;
use miette::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cli::commands::open_catalog;
use crate::cli::output::{or_server_error, print_envelope};
use crate::cli::GlobalOpts;
use crate::core::filter::CompiledFilter;
use crate::core::paginate::{paginate, PageRequest};
use crate::core::reconcile::{reconcile, CanonicalPool, ReconcileReport, SelectionMode};
use crate::core::store::PartStore;

#[derive(clap::Args, Debug)]
pub struct RepairArgs {
    /// Link children by part number against the whole catalog
    #[arg(long)]
    pub by_code: bool,

    /// Newest parts in the random pool (default: repair_pool_size from config)
    #[arg(long, conflicts_with = "by_code", value_parser = parse_pool_size)]
    pub pool_size: Option<usize>,

    /// Seed for reproducible random picks
    #[arg(long)]
    pub seed: Option<u64>,
}

fn parse_pool_size(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("pool size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid pool size '{}': {}", s, e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairResponse {
    success: bool,
    message: String,
    updated_count: usize,
    failed_count: usize,
}

pub fn run(args: RepairArgs, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;
    let (mode, pool_limit) = if args.by_code {
        (SelectionMode::ByCode, None)
    } else {
        (
            SelectionMode::Random,
            Some(args.pool_size.unwrap_or_else(|| catalog.config.pool_size())),
        )
    };
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    let pool = CanonicalPool::new(or_server_error(
        catalog.store.canonical_pool(pool_limit),
        global.format,
    ));

    let page_size = catalog.config.page_size();
    let mut report = ReconcileReport::default();
    let mut page_number = 1;
    loop {
        let page = or_server_error(
            paginate(
                &catalog.store,
                &CompiledFilter::None,
                &PageRequest::new(page_number, page_size),
            ),
            global.format,
        );
        report.merge(reconcile(
            &mut catalog.store,
            &page.data,
            &pool,
            mode,
            &mut rng,
        ));
        if !page.pagination.has_more {
            break;
        }
        page_number += 1;
    }

    if global.format.is_structured() {
        print_envelope(
            &RepairResponse {
                success: true,
                message: format!(
                    "Successfully updated {} parts with child part references",
                    report.updated
                ),
                updated_count: report.updated,
                failed_count: report.failed,
            },
            global.format,
        )
    } else {
        println!(
            "{} Updated {} of {} parts ({} failed)",
            style("✓").green(),
            style(report.updated).cyan(),
            report.examined,
            report.failed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_must_be_positive() {
        assert_eq!(parse_pool_size("25"), Ok(25));
        assert!(parse_pool_size("0").is_err());
        assert!(parse_pool_size("-3").is_err());
        assert!(parse_pool_size("lots").is_err());
    }
}
