use leadline::config::Config;
use leadline::domain::lead::LeadRepository;
use leadline::infrastructure::llm::{turn_backend_from_config, OpenAiRealtimeConnector};
use leadline::infrastructure::persistence::MemoryLeadRepository;
use leadline::infrastructure::telephony::telephony_from_config;
use leadline::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
use leadline::infrastructure::persistence::{create_pool, run_migrations, DatabaseConfig, PgLeadRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Leadline call orchestrator");

    // Load configuration
    let config = Arc::new(Config::load().map_err(|e| anyhow::anyhow!(e))?);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // Lead store: Postgres when configured, in-memory otherwise
    #[cfg(feature = "postgres")]
    let store: Arc<dyn LeadRepository> = if config.database.url.is_empty() {
        warn!("No database configured, using in-memory lead store");
        Arc::new(MemoryLeadRepository::new())
    } else {
        let db_config = DatabaseConfig::with_url(config.database.url.clone());
        let pool = create_pool(&db_config).await?;
        run_migrations(&pool).await?;
        info!("Lead repository initialized");
        Arc::new(PgLeadRepository::new(pool))
    };

    #[cfg(not(feature = "postgres"))]
    let store: Arc<dyn LeadRepository> = {
        warn!("Built without postgres support, using in-memory lead store");
        Arc::new(MemoryLeadRepository::new())
    };

    // External collaborators
    let control = telephony_from_config(&config.telephony);
    let turn_backend = turn_backend_from_config(&config.backend);
    let realtime = Arc::new(OpenAiRealtimeConnector::new(
        config.backend.api_key.clone(),
        config.backend.realtime_model.clone(),
    ));

    // Metrics exporter
    let prometheus_handle = init_metrics();

    let state = AppState {
        store,
        control,
        turn_backend,
        realtime,
        config: config.clone(),
    };
    let app = build_router(state, prometheus_handle);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
