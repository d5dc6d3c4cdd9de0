use std::path::Path;
use std::rc::Rc;

use clap::Parser;
use color_eyre::Result;
use studydash::audio::LoggingAudio;
use studydash::clock::SystemClock;
use studydash::cli::{self, Cli};
use studydash::store::StoreError;
use studydash::{Config, Dashboard, KeyValueStore, MemoryStore, Profile, SqliteStore};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match &cli.config {
        Some(path) => Config::load_from_path(&studydash::utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let store = open_store(&config.get_database_path());
    let mut dashboard = Dashboard::new(
        &config,
        store,
        Box::new(LoggingAudio),
        Rc::new(SystemClock),
    );

    match cli.command {
        Some(command) => cli::run(command, &mut dashboard)?,
        None => cli::print_summary(&dashboard),
    }

    Ok(())
}

/// Open the SQLite store, falling back to memory so the session still works
fn open_store(path: &Path) -> Rc<dyn KeyValueStore> {
    let opened = path
        .to_str()
        .ok_or_else(|| StoreError::Unavailable("database path is not valid UTF-8".to_string()))
        .and_then(SqliteStore::new);

    match opened {
        Ok(store) => Rc::new(store),
        Err(error) => {
            warn!(path = %path.display(), %error, "storage unavailable, changes will not be saved");
            Rc::new(MemoryStore::new())
        }
    }
}
