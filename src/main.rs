//! Campus Coffee POS service.
//!
//! Reads configuration from `$CAMPUS_COFFEE_CONFIG` or
//! `~/.config/campus-coffee/config.toml`. The `campus-coffee-cli` binary
//! offers the same startup with command line overrides.

use tracing::{error, info};

use campus_coffee::server::{init_tracing, ServerHandle, ServerOptions};
use campus_coffee::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..Default::default()
    })
    .await?;

    handle.install_signal_handler();
    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
