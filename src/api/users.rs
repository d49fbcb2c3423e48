use actix_web::{web, HttpResponse};
use mongodb::bson::doc;
use serde_json::{Map, Value};

use super::body_to_set_fields;
use crate::config::AccessPolicy;
use crate::database::{document_to_json, documents_to_json, Collection, DeleteOutcome, DocumentStore};
use crate::middleware::Claims;
use crate::models::UserUpsertResponse;
use crate::services::{role_service, token_service::TokenService};
use crate::utils::AppError;

/// PUT /user/{email} - register or update a user, and hand back a fresh token
///
/// Upserts on `email` with `$set` of the body, so a second call merges into the
/// existing record instead of creating another one. Without a token only a new
/// email can be registered; updating an existing record needs that user's (or an
/// admin's) token. `email` always follows the path and `role` is only writable
/// by admins.
#[utoipa::path(
    put,
    path = "/user/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "User email (logical key)")),
    responses(
        (status = 200, description = "Upsert acknowledgement and a one-hour token", body = UserUpsertResponse),
        (status = 401, description = "No token and the user already exists"),
        (status = 403, description = "Invalid token or another user's record")
    )
)]
pub async fn upsert_user(
    user: Option<web::ReqData<Claims>>,
    db: web::Data<dyn DocumentStore>,
    tokens: web::Data<TokenService>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let email = email.into_inner();
    log::info!("👤 PUT /user/{}", email);

    let filter = doc! { "email": &email };

    match &user {
        Some(user) => {
            role_service::authorize_email_access(db.get_ref(), &policy, user, &email).await?
        }
        None if policy.enforce_ownership => {
            if db.find_one(Collection::Users, filter.clone()).await?.is_some() {
                log::warn!("🚫 Anonymous upsert of existing user {}", email);
                return Err(AppError::Unauthenticated);
            }
        }
        None => {}
    }

    let mut fields = body_to_set_fields(body.into_inner())?;
    fields.insert("email", email.as_str());
    if fields.contains_key("role") {
        let caller_is_admin = match &user {
            Some(user) => role_service::is_admin(db.get_ref(), &user.email).await?,
            None => false,
        };
        if !caller_is_admin {
            log::warn!("🚫 Ignoring role change on {} by a non-admin", email);
            fields.remove("role");
        }
    }

    let result = db
        .update_one(Collection::Users, filter, doc! { "$set": fields }, true)
        .await?;

    let token = tokens.issue(&email)?;

    if result.upserted_count > 0 {
        log::info!("✅ User registered: {}", email);
    }

    Ok(HttpResponse::Ok().json(UserUpsertResponse { result, token }))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "Every user record"))
)]
pub async fn get_users(db: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /users");

    let users = db.find(Collection::Users, doc! {}).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(users)))
}

#[utoipa::path(
    get,
    path = "/user/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "The user, or null when absent"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or another user's record")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /user/{} - by {}", email, user.email);

    role_service::authorize_email_access(db.get_ref(), &policy, &user, &email).await?;

    let found = db
        .find_one(Collection::Users, doc! { "email": email.as_str() })
        .await?;
    Ok(HttpResponse::Ok().json(found.map(document_to_json)))
}

#[utoipa::path(
    delete,
    path = "/user/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or another user's record")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /user/{} - by {}", email, user.email);

    role_service::authorize_email_access(db.get_ref(), &policy, &user, &email).await?;

    let result = db
        .delete_one(Collection::Users, doc! { "email": email.as_str() })
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
