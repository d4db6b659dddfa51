//! Paginated collection listing.

use anyhow::{anyhow, bail, Context, Result};
use console::style;
use serde::Serialize;
use serde_json::Value;

use crate::cli::context::CliContext;
use crate::cli::display::{output, record_table, render_list, CommandOutput};
use crate::cli::types::ListArgs;
use crate::domain::models::{FetchResult, FilterClause, FilterSet, PageSize};
use crate::services::{CollectionController, ControllerOptions, FetchOutcome};

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub request_path: String,
    pub page: u32,
    pub records: Vec<Value>,
    pub total: u64,
    pub pages: u32,
}

impl ListOutput {
    fn new(request_path: String, page: u32, result: &FetchResult<Value>) -> Self {
        Self {
            request_path,
            page,
            records: result.records.clone(),
            total: result.info.total,
            pages: result.info.pages,
        }
    }

    fn pager(&self) -> String {
        (1..=self.pages)
            .map(|n| {
                if n == self.page {
                    style(format!("[{n}]")).bold().to_string()
                } else {
                    n.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        let table = record_table(&self.records);
        let mut text = render_list("record", &table, self.total);
        if self.pages > 0 {
            text.push_str(&format!(
                "\n\nPage {} of {}  {}",
                self.page,
                self.pages,
                self.pager()
            ));
        }
        text
    }
}

/// Turn `--filter` and `--param` arguments into a filter set.
pub fn build_filters(filters: &[String], params: &[String]) -> Result<FilterSet> {
    let mut set = FilterSet::new();
    for raw in filters {
        let clause: FilterClause = raw
            .parse()
            .with_context(|| format!("Invalid --filter '{raw}'"))?;
        set = set.clause(clause);
    }
    for raw in params {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid --param '{raw}', expected key=value"))?;
        set = set.param(key, value);
    }
    Ok(set)
}

pub async fn execute(ctx: &CliContext, args: ListArgs, json_mode: bool) -> Result<()> {
    let controller: CollectionController<Value> = CollectionController::new(
        ctx.client.clone(),
        ctx.cache.clone(),
        args.endpoint,
        ControllerOptions::from(&ctx.config.pagination),
    );

    if let Some(limit) = args.limit {
        let size: PageSize = limit.parse()?;
        controller.set_page_size(size);
    }
    controller.set_sort_key(args.sort);
    controller.commit_search_term(args.search);
    controller.set_filters(&build_filters(&args.filters, &args.params)?);
    // Last, so a reset-on-change policy does not discard it.
    controller.set_page(args.page);

    let request_path = controller.request_path();
    let outcome = controller
        .fetch()
        .await
        .with_context(|| format!("GET {request_path} failed"))?;

    let FetchOutcome::Applied(result) = outcome else {
        bail!("Fetch was cancelled before it completed");
    };

    let out = ListOutput::new(request_path, controller.state().page, &result);
    output(&out, json_mode);
    Ok(())
}
