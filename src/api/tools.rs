use actix_web::{web, HttpResponse};
use mongodb::bson::doc;
use serde_json::{Map, Value};

use super::{body_to_document, parse_object_id};
use crate::database::{document_to_json, documents_to_json, Collection, DeleteOutcome, DocumentStore, InsertOutcome};
use crate::middleware::Claims;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/tools",
    tag = "Tools",
    responses((status = 200, description = "Every tool listing"))
)]
pub async fn get_tools(db: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    log::info!("🧰 GET /tools");

    let tools = db.find(Collection::Tools, doc! {}).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(tools)))
}

#[utoipa::path(
    get,
    path = "/tool/{id}",
    tag = "Tools",
    params(("id" = String, Path, description = "Tool ObjectId")),
    responses(
        (status = 200, description = "The tool, or null when absent"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_tool(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🧰 GET /tool/{} - by {}", id, user.email);

    let oid = parse_object_id(&id)?;
    let tool = db.find_one(Collection::Tools, doc! { "_id": oid }).await?;
    Ok(HttpResponse::Ok().json(tool.map(document_to_json)))
}

#[utoipa::path(
    post,
    path = "/tool",
    tag = "Tools",
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_tool(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("➕ POST /tool - by {}", user.email);

    let tool = body_to_document(body.into_inner())?;
    let result = db.insert_one(Collection::Tools, tool).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    delete,
    path = "/tool/{id}",
    tag = "Tools",
    params(("id" = String, Path, description = "Tool ObjectId")),
    responses(
        (status = 200, description = "Delete acknowledgement; deletedCount is 0 when absent", body = DeleteOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_tool(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /tool/{} - by {}", id, user.email);

    let oid = parse_object_id(&id)?;
    let result = db.delete_one(Collection::Tools, doc! { "_id": oid }).await?;
    Ok(HttpResponse::Ok().json(result))
}
