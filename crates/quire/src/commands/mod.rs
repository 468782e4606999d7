//! CLI command implementations.

mod clear_cache;
mod list;
mod resolve;
mod show;

use std::path::PathBuf;

use clap::Args;
use quire_cache::{Cache, FileCache, NullCache};
use quire_catalog::Catalog;
use quire_config::{CliSettings, Config};

pub(crate) use clear_cache::ClearCacheArgs;
pub(crate) use list::ListArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use show::ShowArgs;

use crate::VERSION;
use crate::error::CliError;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long, global = true, env = "QUIRE_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Override a configuration value, e.g. `collections.blog.per_page=5`.
    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        global = true,
        value_parser = parse_key_value
    )]
    pub(crate) set: Vec<(String, String)>,

    /// Bypass the index cache.
    #[arg(long, global = true)]
    pub(crate) no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

impl GlobalArgs {
    /// Load configuration with command line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            cache_enabled: self.no_cache.then_some(false),
            overrides: self.set.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Open the catalog over the on-disk cache, or no cache with `--no-cache`.
    pub(crate) fn open_catalog(&self) -> Result<Catalog, CliError> {
        let config = self.load_config()?;
        tracing::debug!(
            config_path = ?config.config_path,
            cache_dir = %config.cache_dir().display(),
            no_cache = self.no_cache,
            "Opening catalog"
        );
        let cache = self.cache(&config);
        Ok(Catalog::new(config, cache.as_ref()))
    }

    fn cache(&self, config: &Config) -> Box<dyn Cache> {
        if self.no_cache {
            Box::new(NullCache)
        } else {
            Box::new(FileCache::new(config.cache_dir(), VERSION))
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}
