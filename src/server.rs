//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: storage setup and migrations,
//! service wiring, the REST API, metrics and graceful shutdown. The binaries
//! only parse arguments and hand an [`AppConfig`] over.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{PosService, PosServiceConfig};
use crate::config::AppConfig;
use crate::domain::PosRepository;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig, InMemoryPosRepository, SeaOrmPosRepository};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::errors::InfraError;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Keep records in process memory instead of the configured database.
    pub in_memory: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            in_memory: false,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running POS directory server.
///
/// # Examples
///
/// ```rust,no_run
/// use campus_coffee::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub service: Arc<PosService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is bound to (resolves port 0).
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, InfraError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting Campus Coffee POS service...");

        let prometheus_handle = prometheus_handle()?;

        // ── Storage ────────────────────────────────────────────
        let (repo, db): (Arc<dyn PosRepository>, Option<DatabaseConnection>) = if opts.in_memory {
            warn!("Using in-memory storage; records are lost on exit");
            (Arc::new(InMemoryPosRepository::new()), None)
        } else {
            let db_config = DatabaseConfig::from(&app_cfg.database);
            let db = init_database(&db_config).await?;

            if opts.auto_migrate {
                info!("Running database migrations...");
                Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }

            (Arc::new(SeaOrmPosRepository::new(db.clone())), Some(db))
        };

        let service = Arc::new(PosService::new(
            repo,
            PosServiceConfig::from(&app_cfg.pos),
        ));

        if app_cfg.admin.reset_enabled && app_cfg.admin.token.is_none() {
            warn!("Admin reset endpoint enabled without a token; anyone can clear the directory");
        }

        // ── REST API ───────────────────────────────────────────
        let state = ApiState::new(service.clone(), prometheus_handle)
            .with_admin_token(app_cfg.admin.token.clone());
        let router = create_api_router(state, app_cfg.admin.reset_enabled);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    ///
    /// In-flight requests get `server.shutdown_timeout` seconds to finish.
    pub async fn wait(self) {
        let grace = Duration::from_secs(self.shutdown.timeout_secs());
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => match result {
                Ok(()) => info!("REST API server stopped"),
                Err(e) => error!("REST API server task panicked: {}", e),
            },
            _ = wait_then_grace(self.shutdown.signal(), grace) => {
                warn!("Shutdown grace period of {:?} elapsed; aborting open connections", grace);
                api_task.abort();
            }
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("Campus Coffee POS service shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down Campus Coffee POS service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

async fn wait_then_grace(signal: ShutdownSignal, grace: Duration) {
    signal.wait().await;
    tokio::time::sleep(grace).await;
}

/// The global metrics recorder can only be installed once per process;
/// restarts within the same process reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, InfraError> {
    static PROM_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| {
            let installed = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| e.to_string());
            if installed.is_ok() {
                info!("Prometheus metrics recorder installed");
            }
            installed
        })
        .clone()
        .map_err(|e| InfraError::Config(format!("failed to install Prometheus recorder: {}", e)))
}

/// Initialize tracing from the logging section. `RUST_LOG` wins when set.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_options() -> ServerOptions {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 1;
        ServerOptions {
            config,
            auto_migrate: false,
            in_memory: true,
        }
    }

    #[tokio::test]
    async fn starts_and_stops_in_memory() {
        let handle = ServerHandle::start(in_memory_options()).await.unwrap();
        assert_ne!(handle.local_addr.port(), 0);
        assert!(handle.is_running());

        let stream = tokio::net::TcpStream::connect(handle.local_addr).await;
        assert!(stream.is_ok());
        drop(stream);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn starts_against_sqlite_and_migrates() {
        let mut opts = in_memory_options();
        opts.in_memory = false;
        opts.auto_migrate = true;
        opts.config.database.url = "sqlite::memory:".to_string();
        opts.config.database.max_connections = 1;

        let handle = ServerHandle::start(opts).await.unwrap();
        assert!(handle.service.retrieve_all().await.unwrap().is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let mut opts = in_memory_options();
        opts.config.logging.format = "xml".to_string();
        assert!(ServerHandle::start(opts).await.is_err());
    }
}
