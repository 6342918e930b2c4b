//! Campus Coffee POS directory - CLI server
//!
//! Headless REST service suitable for deployment as a systemd service,
//! Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/campus-coffee/config.toml)
//! campus-coffee-cli
//!
//! # Custom config path and port
//! campus-coffee-cli --config /etc/campus-coffee/config.toml --port 8081
//!
//! # Throwaway instance without a database
//! campus-coffee-cli --in-memory
//!
//! # Validate config without starting
//! campus-coffee-cli --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use campus_coffee::config::{AppConfig, CONFIG_ENV_VAR};
use campus_coffee::server::{init_tracing, ServerHandle, ServerOptions};

/// Campus Coffee POS directory server.
#[derive(Parser, Debug)]
#[command(
    name = "campus-coffee-cli",
    version,
    about = "REST directory of campus coffee points of sale",
    long_about = "Campus Coffee - REST API for creating, listing and updating the \
                  cafeterias, coffee shops, bakeries and vending machines on campus.\n\n\
                  Default config: ~/.config/campus-coffee/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Keep records in memory instead of the configured database.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(campus_coffee::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.check {
                eprintln!("Configuration is invalid: {}", e);
                std::process::exit(1);
            }
            init_tracing(&AppConfig::default());
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Unique names: {}", config.pos.unique_names);
        println!("   Admin reset : {}", config.admin.reset_enabled);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        in_memory: cli.in_memory,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
