use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::db::{pool, MemoryReadingStore, ReadingRepository, ReadingStore};
use crate::scheduler;
use crate::services::{ReadingService, WeatherService};
use crate::weather::{WeatherAcquisition, WeatherSource, SIVAS};

/// Application with its spawned tasks and the resources they share.
///
/// The database pool is owned here rather than held globally; it is closed
/// once the server has stopped.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub record_scheduler_handle: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
    pool: Option<PgPool>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// Connects the datastore (or falls back to memory), selects the weather
    /// source, binds the listener and spawns:
    /// - HTTP API server (Axum)
    /// - Record scheduler, when `RECORD_INTERVAL_MINUTES` is non-zero
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let pool = match &config.database_url {
            Some(url) => Some(pool::connect(url, config.database_max_connections).await?),
            None => None,
        };
        let store: Arc<dyn ReadingStore> = match &pool {
            Some(pool) => Arc::new(ReadingRepository::new(pool.clone())),
            None => {
                warn!("DATABASE_URL is not set, readings will be kept in memory only");
                Arc::new(MemoryReadingStore::new())
            }
        };

        let source = WeatherSource::from_config(&config, SIVAS)?;
        info!("Weather source: {}", source.name());
        let acquisition = WeatherAcquisition::new(source, SIVAS);

        let weather_service = WeatherService::new(acquisition, store.clone());
        let reading_service = ReadingService::new(store);

        let record_scheduler_handle = if config.record_interval_minutes > 0 {
            let service = weather_service.clone();
            let interval = config.record_interval_minutes;
            Some(tokio::spawn(async move {
                scheduler::start_record_scheduler(service, interval).await;
            }))
        } else {
            info!("Record scheduler disabled");
            None
        };

        let app_state = AppState {
            weather_service,
            reading_service,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Starting HTTP server on {}", local_addr);

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            record_scheduler_handle,
            local_addr,
            pool,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run until the server stops, then release what the application owns.
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        let result = self.server_handle.await;

        if let Some(handle) = self.record_scheduler_handle {
            handle.abort();
        }
        if let Some(pool) = self.pool {
            pool.close().await;
            info!("Database connection closed");
        }

        result??;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
