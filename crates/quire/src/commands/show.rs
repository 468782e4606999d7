//! `show` command implementation.

use clap::Args;
use quire_catalog::{DocumentRecord, parse_hash_id};

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Collection id, e.g. `blog`.
    collection: String,

    /// Document identifier, or a URL or filename ending in one.
    document: String,

    /// Print the document as JSON.
    #[arg(long)]
    json: bool,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not in the collection.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let catalog = global.open_catalog()?;
        let identifier = identifier_from_arg(&self.document);
        let record = catalog
            .document(&self.collection, &identifier)
            .ok_or_else(|| {
                CliError::NotFound(format!(
                    "document `{identifier}` not found in collection `{}`",
                    self.collection
                ))
            })?;

        if self.json {
            output.print(&serde_json::to_string_pretty(&record.public_json())?);
            return Ok(());
        }

        print_record(&record, output);
        Ok(())
    }
}

/// `my-post-abc1234567` and `/blog/my-post-abc1234567` both name `abc1234567`;
/// anything else is taken as the identifier itself.
fn identifier_from_arg(arg: &str) -> String {
    parse_hash_id(arg).unwrap_or_else(|| arg.trim().to_lowercase())
}

fn print_record(record: &DocumentRecord, output: &Output) {
    output.highlight(&record.title);
    let fields = [
        ("identifier", record.identifier.clone()),
        ("url", record.url.clone()),
        ("author", record.author.clone()),
        ("category", record.category.clone()),
        ("tags", record.tags.join(", ")),
        ("published", record.publish_date.clone()),
        ("created", record.creation_date.clone()),
        ("modified", record.last_modified.clone()),
        ("source", record.source_path.display().to_string()),
    ];
    for (name, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        output.print_dim(&format!("{name:>10}: {value}"));
    }
    if !record.summary.is_empty() {
        output.info(&record.summary);
    }
    output.separator();
    output.print(&record.content);
}
