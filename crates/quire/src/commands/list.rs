//! `list` command implementation.

use clap::Args;
use quire_catalog::{DocumentRecord, ListQuery, SortField, parse_page};

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Collection id, e.g. `blog`.
    collection: String,

    /// Page number; invalid values fall back to 1.
    #[arg(short, long, default_value = "1")]
    page: String,

    /// Records per page (default: from configuration).
    #[arg(long)]
    per_page: Option<usize>,

    /// Sort field (default: from configuration).
    #[arg(long, value_parser = parse_sort_field)]
    sort: Option<SortField>,

    /// Print the page as JSON.
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or JSON encoding fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let catalog = global.open_catalog()?;
        let query = ListQuery {
            page: parse_page(&self.page),
            per_page: self.per_page,
            sort: self.sort,
        };
        let sort = query
            .sort
            .unwrap_or_else(|| catalog.sort_field(&self.collection));
        let page = catalog.list(&self.collection, &query);

        if self.json {
            let page = page.map(|record| record.public_json());
            output.print(&serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        output.highlight(&format!(
            "{}: page {}/{} ({} documents, sorted by {sort})",
            self.collection,
            page.page,
            page.total_pages.max(1),
            page.total_items,
        ));
        if page.items.is_empty() {
            output.warning("No documents on this page");
        }
        for record in &page.items {
            output.print(&summary_line(record));
            output.print_dim(&format!("    {}", record.url));
        }
        Ok(())
    }
}

fn parse_sort_field(raw: &str) -> Result<SortField, String> {
    SortField::parse(raw).ok_or_else(|| {
        let names: Vec<&str> = SortField::ALL.into_iter().map(SortField::as_str).collect();
        format!("unknown sort field `{raw}` (expected one of: {})", names.join(", "))
    })
}

fn summary_line(record: &DocumentRecord) -> String {
    let date = [
        &record.publish_date,
        &record.creation_date,
        &record.last_modified,
    ]
    .into_iter()
    .find(|d| !d.is_empty())
    .map_or("-", String::as_str);
    format!("{}  {date}  {}", record.identifier, record.title)
}
