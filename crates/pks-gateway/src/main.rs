//! PKS Gateway Server Binary
//!
//! Runs the HTTP gateway for PKS endpoint registration.

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use pks_gateway::{create_router, AdapterRegistry, AppState, EndpointStore, GatewayConfig, MemoryStore};

#[tokio::main]
async fn main() {
    let config = GatewayConfig::from_env().expect("Invalid gateway configuration");

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let store = open_store(&config).await;
    let adapters = Arc::new(build_adapters(&config));

    info!(
        name = ?config.gateway_name,
        port = config.port,
        adapter_path = %config.adapter_path,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        "Starting PKS gateway"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(store, adapters, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "PKS gateway listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(feature = "postgres")]
async fn open_store(config: &GatewayConfig) -> Arc<dyn EndpointStore> {
    match &config.database_url {
        Some(url) => Arc::new(
            pks_gateway::storage::PostgresStore::new(url)
                .await
                .expect("Failed to connect to PostgreSQL"),
        ),
        None => {
            info!("No database configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &GatewayConfig) -> Arc<dyn EndpointStore> {
    if config.database_url.is_some() {
        warn!("PKS_GATEWAY_DATABASE_URL ignored: built without the postgres feature");
    }
    Arc::new(MemoryStore::new())
}

fn build_adapters(config: &GatewayConfig) -> AdapterRegistry {
    #[allow(unused_mut)]
    let mut adapters = AdapterRegistry::new();

    if config.http_adapter {
        #[cfg(feature = "http-adapter")]
        adapters.register(
            config.adapter_path.clone(),
            pks_gateway::adapters::HttpConnectivityChecker::new(config.connect_timeout)
                .expect("Failed to build HTTP client"),
        );

        #[cfg(not(feature = "http-adapter"))]
        warn!("PKS_GATEWAY_HTTP_ADAPTER ignored: built without the http-adapter feature");
    }

    if !adapters.has_adapter(&config.adapter_path) {
        warn!(
            path = %config.adapter_path,
            "No connectivity adapter registered; unconfirmed registrations will fail"
        );
    }

    adapters
}
