use actix_web::{web, HttpResponse};
use mongodb::bson::doc;

use crate::config::AccessPolicy;
use crate::database::{Collection, DocumentStore, UpdateOutcome};
use crate::middleware::Claims;
use crate::models::{AdminStatus, ROLE_ADMIN};
use crate::services::role_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/admin/{email}",
    tag = "Admin",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Whether the user has the admin role; unknown users are not admins", body = AdminStatus),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or another user's email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_admin(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛡️  GET /admin/{} - by {}", email, user.email);

    role_service::authorize_email_access(db.get_ref(), &policy, &user, &email).await?;

    let admin = role_service::is_admin(db.get_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(AdminStatus { admin }))
}

/// PUT /admin/{email} - promote a user. Never creates a user record.
#[utoipa::path(
    put,
    path = "/admin/{email}",
    tag = "Admin",
    params(("email" = String, Path, description = "Email of the user to promote")),
    responses(
        (status = 200, description = "Update acknowledgement; matchedCount is 0 for unknown users", body = UpdateOutcome),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn make_admin(
    user: web::ReqData<Claims>,
    db: web::Data<dyn DocumentStore>,
    policy: web::Data<AccessPolicy>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛡️  PUT /admin/{} - by {}", email, user.email);

    role_service::require_admin(db.get_ref(), &policy, &user).await?;

    let result = db
        .update_one(
            Collection::Users,
            doc! { "email": email.as_str() },
            doc! { "$set": { "role": ROLE_ADMIN } },
            false,
        )
        .await?;

    if result.matched_count > 0 {
        log::info!("✅ {} promoted to admin by {}", email, user.email);
    }

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{init_app, TestContext};
    use crate::config::AccessPolicy;
    use crate::database::{Collection, DocumentStore};
    use actix_web::{http::StatusCode, test};
    use mongodb::bson::doc;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_admin_flag_follows_role() {
        let cx = TestContext::new();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "boss@example.com", "role": "admin" })
            .await
            .unwrap();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "mod@example.com", "role": "Admin" })
            .await
            .unwrap();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "plain@example.com" })
            .await
            .unwrap();
        let app = init_app!(cx);

        for (email, expected) in [
            ("boss@example.com", true),
            ("mod@example.com", false),
            ("plain@example.com", false),
        ] {
            let req = test::TestRequest::get()
                .uri(&format!("/admin/{}", email))
                .insert_header(cx.bearer(email))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body, json!({ "admin": expected }), "{}", email);
        }
    }

    #[actix_web::test]
    async fn test_unknown_user_is_not_admin() {
        let cx = TestContext::new();
        let app = init_app!(cx);

        let req = test::TestRequest::get()
            .uri("/admin/ghost@example.com")
            .insert_header(cx.bearer("ghost@example.com"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "admin": false }));
    }

    #[actix_web::test]
    async fn test_admin_promotes_user() {
        let cx = TestContext::new();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "boss@example.com", "role": "admin" })
            .await
            .unwrap();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "helper@example.com", "name": "Helper" })
            .await
            .unwrap();
        let app = init_app!(cx);

        let req = test::TestRequest::put()
            .uri("/admin/helper@example.com")
            .insert_header(cx.bearer("boss@example.com"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["matchedCount"], 1);
        assert_eq!(body["modifiedCount"], 1);

        let helper = cx
            .store
            .find_one(Collection::Users, doc! { "email": "helper@example.com" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(helper.get_str("role").unwrap(), "admin");
        assert_eq!(helper.get_str("name").unwrap(), "Helper");
    }

    #[actix_web::test]
    async fn test_non_admin_cannot_promote() {
        let cx = TestContext::new();
        cx.store
            .insert_one(Collection::Users, doc! { "email": "plain@example.com" })
            .await
            .unwrap();
        let app = init_app!(cx);

        let req = test::TestRequest::put()
            .uri("/admin/plain@example.com")
            .insert_header(cx.bearer("plain@example.com"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let plain = cx
            .store
            .find_one(Collection::Users, doc! { "email": "plain@example.com" })
            .await
            .unwrap()
            .unwrap();
        assert!(plain.get("role").is_none());
    }

    #[actix_web::test]
    async fn test_promoting_unknown_user_creates_nothing() {
        let cx = TestContext::with_policy(AccessPolicy {
            enforce_ownership: false,
            ..AccessPolicy::default()
        });
        let app = init_app!(cx);

        let req = test::TestRequest::put()
            .uri("/admin/ghost@example.com")
            .insert_header(cx.bearer("anyone@example.com"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["matchedCount"], 0);
        assert_eq!(body["upsertedCount"], 0);
        assert!(cx.store.find(Collection::Users, doc! {}).await.unwrap().is_empty());
    }
}
