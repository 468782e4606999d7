//! `clear-cache` command implementation.

use clap::Args;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the clear-cache command.
#[derive(Args)]
pub(crate) struct ClearCacheArgs {
    /// Collection to clear (default: all collections).
    collection: Option<String>,
}

impl ClearCacheArgs {
    /// Execute the clear-cache command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let catalog = global.open_catalog()?;
        if global.no_cache {
            output.warning("--no-cache is set, nothing to clear");
            return Ok(());
        }

        match self.collection {
            Some(collection) => {
                if catalog.invalidate(&collection) {
                    output.success(&format!("Cleared cached index for `{collection}`"));
                } else {
                    output.info(&format!("No cached index for `{collection}`"));
                }
            }
            None => {
                catalog.invalidate_all();
                output.success(&format!(
                    "Cleared all cached indexes in {}",
                    catalog.config().cache_dir().display()
                ));
            }
        }
        Ok(())
    }
}
