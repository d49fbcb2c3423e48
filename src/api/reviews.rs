use actix_web::{web, HttpResponse};
use mongodb::bson::doc;
use serde_json::{Map, Value};

use super::body_to_document;
use crate::database::{documents_to_json, Collection, DocumentStore, InsertOutcome};
use crate::middleware::Claims;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    responses((status = 200, description = "Every review"))
)]
pub async fn get_reviews(db: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    log::info!("⭐ GET /reviews");

    let reviews = db.find(Collection::Reviews, doc! {}).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(reviews)))
}

/// POST /review - reviews are insert-only
#[utoipa::path(
    post,
    path = "/review",
    tag = "Reviews",
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_review(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("⭐ POST /review - by {}", user.email);

    let review = body_to_document(body.into_inner())?;
    let result = db.insert_one(Collection::Reviews, review).await?;
    Ok(HttpResponse::Ok().json(result))
}
