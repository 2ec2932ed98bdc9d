//! Contact VCF service - Entry point.

use contact_store::{ContactPersistence, ContactStore, JsonFileStore, MemoryStore};
use contact_vcf_server::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    if config.log.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting Contact VCF service");

    let normalizer = match config.phone.normalizer() {
        Ok(n) => n,
        Err(e) => {
            error!("Invalid phone configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize storage
    let backend: Arc<dyn ContactPersistence> = if config.storage.persist {
        let file = JsonFileStore::new(config.storage.path.clone());
        info!("Persisting contacts to {:?}", file.path());
        Arc::new(file)
    } else {
        info!("Persistence disabled, using in-memory storage");
        Arc::new(MemoryStore::new())
    };

    let store = ContactStore::new(backend, normalizer)
        .with_name_prefix(config.contacts.name_prefix.clone());

    // Fail fast on an unreadable contacts file
    match store.count().await {
        Ok(counts) => info!(
            total = counts.total,
            pending = counts.pending,
            approved = counts.approved,
            rejected = counts.rejected,
            "Loaded contact book"
        ),
        Err(e) => {
            error!("Failed to load contacts: {}", e);
            std::process::exit(1);
        }
    }

    // Create application state
    let state = AppState::new(store, config.export.filename.clone());

    // Create rate limiters from config
    let rate_limit = RateLimitState::new(
        config.rate_limit.global_per_minute,
        config.rate_limit.submit_per_minute,
    );

    // Create router with rate limiting
    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
