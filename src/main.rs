use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use provider_coverage::config::Settings;
use provider_coverage::core::{Catalog, RadiusSearch};
use provider_coverage::routes::{self, AppState};
use provider_coverage::services::SessionStore;
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    match log_format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    info!("Starting provider coverage service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // No degraded mode without a catalog
    let delimiter = settings
        .catalog
        .delimiter_byte()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let catalog = Catalog::load_with_delimiter(&settings.catalog.path, delimiter).map_err(|e| {
        error!("Failed to load city catalog from {}: {}", settings.catalog.path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;

    info!(
        "City catalog loaded: {} cities ({} distinct names, {} rows dropped)",
        catalog.len(),
        catalog.city_names().len(),
        catalog.report().dropped()
    );

    let resolver = RadiusSearch::new(settings.search.distance_model);
    info!("Radius search using {:?} distances", resolver.model());

    let sessions = SessionStore::new(
        settings.sessions.capacity,
        settings.sessions.idle_ttl(),
    );

    info!(
        "Session store initialized (capacity: {}, idle TTL: {}s)",
        settings.sessions.capacity, settings.sessions.idle_ttl_secs
    );

    // Build application state
    let app_state = AppState {
        catalog: Arc::new(catalog),
        resolver,
        sessions,
        search: settings.search.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
