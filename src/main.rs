use axum::Server;
use config::Config;
use std::net::SocketAddr;
use tracing::{error, info};

mod api;
mod config;
mod db;
mod errors;
mod logging;
mod schema;
mod services;
mod validation;

/// Result type for API
pub type Result<T> = std::result::Result<T, errors::ApiError>;

/// Static configuration instance for the API
static CONFIG: once_cell::sync::Lazy<Config> = once_cell::sync::Lazy::new(|| {
    dotenv::dotenv().ok();
    envy::from_env::<Config>().expect("Failed to load configuration")
});

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(err) = logging::setup_logging(CONFIG.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {:#}", err);
        return;
    }

    // Database and Redis connect lazily on first use
    let db_client =
        match db::DbClient::with_config(&CONFIG.database_url, &CONFIG.redis_url, CONFIG.db_pool_size)
        {
            Ok(client) => client.with_variant_cache_ttl(CONFIG.variant_cache_ttl_secs),
            Err(err) => {
                error!("Failed to create database client: {}", err);
                return;
            }
        };

    // Setup API router and start server
    let app = match api::initialize_router(db_client) {
        Ok(app) => app,
        Err(err) => {
            error!("Failed to build router: {}", err);
            return;
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server starting on {}", addr);

    if let Err(err) = Server::bind(&addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
    {
        error!("Server stopped with error: {}", err);
    }
}
