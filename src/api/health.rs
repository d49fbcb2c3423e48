use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::DocumentStore;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

/// GET / - banner used by uptime probes on the old deployment
pub async fn index() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("TOPTOOL")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; `database` reports store reachability", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<dyn DocumentStore>) -> impl Responder {
    let database = match db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            log::warn!("⚠️  Health check: store unreachable: {}", e);
            "unreachable"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if database == "connected" { "healthy" } else { "degraded" }.to_string(),
        service: "toptool-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
