use std::process;

use clap::Parser;
use jiff::Timestamp;
use tracing_subscriber::EnvFilter;

use quartermaster::account::resolve_session;
use quartermaster::catalog::{self, Catalog, CatalogCache, FileSource};
use quartermaster::cli::{self, Cli};
use quartermaster::config::Config;
use quartermaster::storage;
use quartermaster::tracker::Tracker;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config::load()?;
    let root = config
        .data_dir()
        .ok_or("could not determine home directory")?;

    let catalog = load_catalog(&config);
    if catalog.is_empty() {
        eprintln!("Catalog is empty; set `catalog` in {}", config_path_hint());
    }

    let session = resolve_session(cli.account.as_deref(), cli.guest, config.account.as_deref());
    tracing::debug!(user = %session.user_id, signed_in = session.signed_in, "session resolved");

    let store = storage::open(&root, session.signed_in)
        .map_err(|e| format!("failed to open storage: {e}"))?;
    let mut tracker = Tracker::load(store.as_ref(), session.user_id, &catalog)
        .map_err(|e| format!("failed to load progress: {e}"))?;

    cli::run(cli.command, &mut tracker)
}

/// Cached snapshot, refreshed from the configured dump when stale.
fn load_catalog(config: &Config) -> Catalog {
    let cache = config.cache_path().map(CatalogCache::new);
    let current = cache
        .as_ref()
        .map_or_else(Catalog::empty, CatalogCache::load_or_empty);

    let Some(path) = &config.catalog else {
        return current;
    };
    let now = Timestamp::now();
    let refreshed = catalog::refresh(current, &FileSource::new(path), &config.refresh_policy(), now);
    if let Some(cache) = &cache
        && refreshed.fetched_at() == Some(now)
        && let Err(e) = cache.save(&refreshed)
    {
        tracing::warn!(error = %e, "failed to write catalog cache");
    }
    refreshed
}

fn config_path_hint() -> String {
    Config::path().map_or_else(|| "the config file".to_string(), |p| p.display().to_string())
}
