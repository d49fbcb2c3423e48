use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TopTool Marketplace API",
        version = "1.0.0",
        description = "Tool listings, users, orders, reviews and card payments for the TopTool marketplace.\n\n**Authentication:** most endpoints require `Authorization: Bearer <token>`. Tokens are returned by `PUT /user/{email}` and expire after one hour. A missing header is answered with 401, an invalid or expired token with 403."
    ),
    paths(
        crate::api::health::health_check,

        crate::api::tools::get_tools,
        crate::api::tools::get_tool,
        crate::api::tools::create_tool,
        crate::api::tools::delete_tool,

        crate::api::users::upsert_user,
        crate::api::users::get_users,
        crate::api::users::get_user,
        crate::api::users::delete_user,

        crate::api::admin::get_admin,
        crate::api::admin::make_admin,

        crate::api::orders::get_orders,
        crate::api::orders::get_orders_by_email,
        crate::api::orders::get_order,
        crate::api::orders::create_order,
        crate::api::orders::update_order,
        crate::api::orders::mark_unpaid,
        crate::api::orders::mark_shipped,
        crate::api::orders::delete_order,

        crate::api::reviews::get_reviews,
        crate::api::reviews::create_review,

        crate::api::payments::create_payment_intent,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::database::InsertOutcome,
            crate::database::UpdateOutcome,
            crate::database::DeleteOutcome,
            crate::models::AdminStatus,
            crate::models::UserUpsertResponse,
            crate::models::PaymentIntentRequest,
            crate::models::PaymentIntentResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and store reachability."),
        (name = "Tools", description = "Tool listings. Listing is public; reading one, adding and removing need a token."),
        (name = "Users", description = "User records keyed by email. `PUT /user/{email}` registers or updates and returns a token."),
        (name = "Admin", description = "Admin role lookup and promotion."),
        (name = "Orders", description = "Orders and their payment/shipping state."),
        (name = "Reviews", description = "Insert-only customer reviews."),
        (name = "Payments", description = "Stripe payment intents for card checkout."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by PUT /user/{email}"))
                        .build()
                ),
            );
        }
    }
}
