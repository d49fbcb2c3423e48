pub mod admin;
pub mod health;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod swagger;
pub mod tools;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use actix_web::{guard, web};
use mongodb::bson::{oid::ObjectId, Document};
use serde_json::{Map, Value};

use crate::config::AccessPolicy;
use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Registers every route. Shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig, policy: AccessPolicy) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid JSON body: {}", err)).into()
    }))
    .route("/", web::get().to(health::index))
    .route("/health", web::get().to(health::health_check))
    // ==================== TOOLS ====================
    .route("/tools", web::get().to(tools::get_tools))
    .service(
        web::resource("/tool")
            .wrap(AuthMiddleware::required())
            .route(web::post().to(tools::create_tool)),
    )
    .service(
        web::resource("/tool/{id}")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(tools::get_tool))
            .route(web::delete().to(tools::delete_tool)),
    )
    // ==================== USERS ====================
    .route("/users", web::get().to(users::get_users))
    // Token-minting route. Ungated it still reads a token when one is sent.
    .service(
        web::resource("/user/{email}")
            .guard(guard::Put())
            .wrap(if policy.gate_user_upsert {
                AuthMiddleware::required()
            } else {
                AuthMiddleware::optional()
            })
            .route(web::put().to(users::upsert_user)),
    )
    .service(
        web::resource("/user/{email}")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(users::get_user))
            .route(web::delete().to(users::delete_user)),
    )
    .service(
        web::resource("/admin/{email}")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(admin::get_admin))
            .route(web::put().to(admin::make_admin)),
    )
    // ==================== ORDERS ====================
    .service(
        web::resource("/orders")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(orders::get_orders)),
    )
    .service(
        web::resource("/orders/{email}")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(orders::get_orders_by_email)),
    )
    .service(
        web::resource("/order")
            .wrap(AuthMiddleware::required())
            .route(web::post().to(orders::create_order)),
    )
    .service(
        web::resource("/order/{id}")
            .wrap(AuthMiddleware::required())
            .route(web::get().to(orders::get_order))
            .route(web::patch().to(orders::update_order))
            .route(web::delete().to(orders::delete_order)),
    )
    .route("/unpaid/{id}", web::patch().to(orders::mark_unpaid))
    .route("/shipped/{id}", web::patch().to(orders::mark_shipped))
    // ==================== REVIEWS ====================
    .route("/reviews", web::get().to(reviews::get_reviews))
    .service(
        web::resource("/review")
            .wrap(AuthMiddleware::required())
            .route(web::post().to(reviews::create_review)),
    )
    // ==================== PAYMENTS ====================
    .service(
        web::resource("/create-payment-intent")
            .wrap(AuthMiddleware::required())
            .route(web::post().to(payments::create_payment_intent)),
    );
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}

/// Request body as a stored document.
pub(crate) fn body_to_document(body: Map<String, Value>) -> Result<Document, AppError> {
    mongodb::bson::to_document(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Unsupported body: {}", e)))
}

/// Request body as `$set` fields. `_id` is immutable and dropped.
pub(crate) fn body_to_set_fields(body: Map<String, Value>) -> Result<Document, AppError> {
    let mut fields = body_to_document(body)?;
    fields.remove("_id");
    Ok(fields)
}
