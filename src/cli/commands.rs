//! CLI command implementations
//!
//! Boot order for `serve`: config → store → router → listener. Any failure
//! before the listener is bound aborts the process.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::config::{ServiceConfig, StoreBackend};
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger, Severity};
use crate::store::{MemoryOrganizationStore, OrganizationStore, PgOrganizationStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let level = Severity::parse(&cli.log_level).ok_or_else(|| {
        CliError::config_error(format!("Unknown log level '{}'", cli.log_level))
    })?;
    Logger::set_min_severity(level);

    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::InitSchema { config } => init_schema(config.as_deref()),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

/// Boot the store and serve HTTP until Ctrl-C
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    log_event(Event::BootStart);

    let result = load_config(config_path).and_then(|config| {
        let rt = runtime()?;
        rt.block_on(async {
            let store = open_store(&config).await?;
            let server = HttpServer::new(&config, store)?;
            server
                .start()
                .await
                .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))?;
            Ok::<(), CliError>(())
        })
    });

    if let Err(ref e) = result {
        log_event_with_fields(Event::BootFailed, &[("error", &e.to_string())]);
    }
    result
}

/// Create the PostgreSQL tables if missing
pub fn init_schema(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    if config.store.backend != StoreBackend::Postgres {
        return Err(CliError::config_error(
            "init-schema requires the postgres store backend",
        ));
    }

    runtime()?.block_on(async {
        let store = PgOrganizationStore::connect(&config.database).await?;
        store.init_schema().await?;
        Ok::<(), CliError>(())
    })
}

/// Validate configuration and print it with secrets redacted
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    println!("{}", config_summary(&config));
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("addr", &config.http.socket_addr()),
            ("store", config.store.backend.as_str()),
        ],
    );
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

async fn open_store(config: &ServiceConfig) -> CliResult<Arc<dyn OrganizationStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let store = PgOrganizationStore::connect(&config.database).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let fixture = config
                .store
                .fixture
                .as_deref()
                .ok_or_else(|| CliError::config_error("store.fixture is required"))?;
            let store = MemoryOrganizationStore::from_json_file(fixture)?;
            log_event_with_fields(
                Event::StoreConnected,
                &[
                    ("backend", "memory"),
                    ("organizations", &store.len().to_string()),
                ],
            );
            Ok(Arc::new(store))
        }
    }
}

fn config_summary(config: &ServiceConfig) -> serde_json::Value {
    let database = match config.store.backend {
        StoreBackend::Postgres => json!(config.database.redacted_url()),
        StoreBackend::Memory => serde_json::Value::Null,
    };

    json!({
        "http": {
            "addr": config.http.socket_addr(),
            "cors_origins": config.http.cors_origins,
        },
        "database": database,
        "api": {
            "key_header": config.api.key_header,
            "key": "***",
        },
        "store": {
            "backend": config.store.backend.as_str(),
            "fixture": config.store.fixture.as_ref().map(|p| p.display().to_string()),
        },
    })
}
