mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::{Compress, Logger}, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use database::{DocumentStore, MemoryStore, MongoDB};
use services::{PaymentProcessor, StripeClient, TokenService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting TopTool server...");

    let store: Arc<dyn DocumentStore> = if config.uses_memory_store() {
        log::warn!("⚠️  Using in-memory store, data is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        let db = MongoDB::new(&config.database_url, &config.database_name)
            .await
            .map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?;
        log::info!("✅ MongoDB connected successfully ({})", config.database_name);
        Arc::new(db)
    };

    let stripe = StripeClient::new(
        &config.stripe_api_base,
        &config.stripe_secret_key,
        config.stripe_timeout,
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let payments: Arc<dyn PaymentProcessor> = Arc::new(stripe);

    let store_data: web::Data<dyn DocumentStore> = web::Data::from(store);
    let payments_data: web::Data<dyn PaymentProcessor> = web::Data::from(payments);
    let tokens_data = web::Data::new(TokenService::new(&config.token_secret, config.token_ttl));
    let policy = config.access;
    let policy_data = web::Data::new(policy);

    if !policy.enforce_ownership {
        log::warn!("⚠️  Ownership checks disabled, any token can read any user's data");
    }

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(tokens_data.clone())
            .app_data(payments_data.clone())
            .app_data(policy_data.clone())
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(|cfg| api::configure(cfg, policy))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
