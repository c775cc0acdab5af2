/// Store selection and the serve loop
///
/// With `DATABASE_URL` set the server connects to PostgreSQL and applies
/// pending migrations; without it, it runs on the in-memory store.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use teamboard_shared::db::{migrations, pool};
use teamboard_shared::store::{memory::MemoryStore, postgres::PgStore, Store};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::{build_router, AppState};
use crate::config::Config;

/// An opened store, plus the pool behind it when it is PostgreSQL
pub struct Backend {
    pub store: Arc<dyn Store>,
    db: Option<PgPool>,
}

impl Backend {
    /// Closes the PostgreSQL pool, if any
    pub async fn close(self) {
        if let Some(db) = self.db {
            pool::close_pool(&db).await;
        }
    }
}

/// Opens the configured store
///
/// For PostgreSQL this creates the database if it is missing and applies
/// pending migrations before returning.
pub async fn connect_store(config: &Config) -> anyhow::Result<Backend> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
        return Ok(Backend {
            store: Arc::new(MemoryStore::new()),
            db: None,
        });
    };

    migrations::ensure_database_exists(url)
        .await
        .context("Failed to create database")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: url.to_string(),
        max_connections: config.database.max_connections,
        ..pool::DatabaseConfig::default()
    })
    .await
    .context("Failed to connect to PostgreSQL")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to apply database migrations")?;

    let status = migrations::get_migration_status(&db).await?;
    info!(
        applied_migrations = status.applied_migrations,
        latest_version = ?status.latest_version,
        "Database schema ready"
    );

    Ok(Backend {
        store: Arc::new(PgStore::new(db.clone())),
        db: Some(db),
    })
}

/// Binds, serves until Ctrl+C or SIGTERM, then closes the store
pub async fn run(config: Config) -> anyhow::Result<()> {
    let backend = connect_store(&config).await?;
    let address = config.bind_address();

    let state = AppState::new(backend.store.clone(), config);
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, store = backend.store.backend_name(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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
