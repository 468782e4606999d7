//! `resolve` command implementation.

use clap::Args;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Collection id, e.g. `blog`.
    collection: String,

    /// Request path, e.g. `/blog/my-post-abc1234567`.
    path: String,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// Prints the identifier of the document the path points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve to an indexed document.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let catalog = global.open_catalog()?;
        let identifier = catalog
            .resolve_request(&self.collection, &self.path)
            .ok_or_else(|| {
                CliError::NotFound(format!(
                    "`{}` does not resolve to a document in `{}`",
                    self.path, self.collection
                ))
            })?;
        output.print(&identifier);
        Ok(())
    }
}
