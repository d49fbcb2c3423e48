use actix_web::{web, HttpResponse};
use mongodb::bson::doc;
use serde_json::{Map, Value};

use super::{body_to_document, body_to_set_fields, parse_object_id};
use crate::config::AccessPolicy;
use crate::database::{
    document_to_json, documents_to_json, Collection, DeleteOutcome, DocumentStore, InsertOutcome,
    UpdateOutcome,
};
use crate::middleware::Claims;
use crate::models::order;
use crate::services::role_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Every order"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_orders(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, AppError> {
    log::info!("📦 GET /orders - by {}", user.email);

    let orders = db.find(Collection::Orders, doc! {}).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(orders)))
}

#[utoipa::path(
    get,
    path = "/orders/{email}",
    tag = "Orders",
    params(("email" = String, Path, description = "Buyer email")),
    responses(
        (status = 200, description = "Orders placed under this email"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or another user's orders")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_orders_by_email(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("📦 GET /orders/{} - by {}", email, user.email);

    role_service::authorize_email_access(db.get_ref(), &policy, &user, &email).await?;

    let orders = db
        .find(Collection::Orders, doc! { "email": email.as_str() })
        .await?;
    Ok(HttpResponse::Ok().json(documents_to_json(orders)))
}

#[utoipa::path(
    get,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses(
        (status = 200, description = "The order, or null when absent"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("📦 GET /order/{} - by {}", id, user.email);

    let oid = parse_object_id(&id)?;
    let found = db.find_one(Collection::Orders, doc! { "_id": oid }).await?;
    Ok(HttpResponse::Ok().json(found.map(document_to_json)))
}

#[utoipa::path(
    post,
    path = "/order",
    tag = "Orders",
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("➕ POST /order - by {}", user.email);

    let placed = body_to_document(body.into_inner())?;
    let result = db.insert_one(Collection::Orders, placed).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// PATCH /order/{id} - merge the body's fields into the order (e.g. `paid`, `transactionId`)
#[utoipa::path(
    patch,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔧 PATCH /order/{} - by {}", id, user.email);

    let oid = parse_object_id(&id)?;
    let fields = body_to_set_fields(body.into_inner())?;
    let result = db
        .update_one(Collection::Orders, doc! { "_id": oid }, doc! { "$set": fields }, false)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    patch,
    path = "/unpaid/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses((status = 200, description = "Sets paid=false and status=null", body = UpdateOutcome))
)]
pub async fn mark_unpaid(
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("↩️  PATCH /unpaid/{}", id);

    let oid = parse_object_id(&id)?;
    let result = db
        .update_one(Collection::Orders, doc! { "_id": oid }, order::unpaid_update(), false)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    patch,
    path = "/shipped/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses((status = 200, description = "Sets status=\"shipped\"", body = UpdateOutcome))
)]
pub async fn mark_shipped(
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🚚 PATCH /shipped/{}", id);

    let oid = parse_object_id(&id)?;
    let result = db
        .update_one(Collection::Orders, doc! { "_id": oid }, order::shipped_update(), false)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    delete,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /order/{} - by {}", id, user.email);

    let oid = parse_object_id(&id)?;
    let result = db.delete_one(Collection::Orders, doc! { "_id": oid }).await?;
    Ok(HttpResponse::Ok().json(result))
}
