use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheet_catalog_server::catalog_store::{SqliteCatalogStore, DEFAULT_READ_POOL_SIZE};
use sheet_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use sheet_catalog_server::server::{
    config::{DEFAULT_PIECE_CACHE_TTL_SEC, DEFAULT_PORT},
    run_server, RequestsLoggingLevel,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database file. Created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Lifetime of cached single-piece lookups in seconds. 0 disables the cache.
    #[clap(long, default_value_t = DEFAULT_PIECE_CACHE_TTL_SEC)]
    pub piece_cache_ttl_sec: u64,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// Allowed CORS origin. Can be repeated.
    #[clap(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        CliConfig {
            db_path: args.db_path,
            port: args.port,
            logging_level: args.logging_level,
            piece_cache_ttl_sec: args.piece_cache_ttl_sec,
            read_pool_size: args.read_pool_size,
            cors_origins: args.cors_origins,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.into(), file_config)?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        app_config.db_path
    );
    let store = SqliteCatalogStore::new(&app_config.db_path, app_config.read_pool_size)?;

    info!(
        "Ready to serve at port {} (piece cache ttl {}s)",
        app_config.port, app_config.piece_cache_ttl_sec
    );
    run_server(
        app_config.server_config(),
        Arc::new(store.persons()),
        Arc::new(store.pieces()),
    )
    .await
}
