use actix_web::{web, HttpResponse};

use crate::middleware::Claims;
use crate::models::{PaymentIntentRequest, PaymentIntentResponse};
use crate::services::payment_service::{self, PaymentProcessor, CURRENCY, PAYMENT_METHOD_TYPES};
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret for confirming the card payment", body = PaymentIntentResponse),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token"),
        (status = 500, description = "Payment processor failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_payment_intent(
    user: web::ReqData<Claims>,
    payments: web::Data<dyn PaymentProcessor>,
    request: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("💳 POST /create-payment-intent - {} by {}", request.total_price, user.email);

    let amount = payment_service::to_minor_units(request.total_price)?;
    let intent = payments
        .create_payment_intent(amount, CURRENCY, PAYMENT_METHOD_TYPES)
        .await?;

    Ok(HttpResponse::Ok().json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{init_app, TestContext};
    use actix_web::{http::header::ContentType, http::StatusCode, test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_price_is_sent_in_cents() {
        let cx = TestContext::new();
        let app = init_app!(cx);

        let req = test::TestRequest::post()
            .uri("/create-payment-intent")
            .insert_header(cx.bearer("buyer@example.com"))
            .set_json(json!({ "totalPrice": 19.99 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "clientSecret": "pi_test_1_secret_abc" }));

        let calls = cx.payments.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 1999);
        assert_eq!(calls[0].1, "usd");
        assert_eq!(calls[0].2, vec!["card".to_string()]);
    }

    #[actix_web::test]
    async fn test_missing_price_is_bad_request() {
        let cx = TestContext::new();
        let app = init_app!(cx);

        let req = test::TestRequest::post()
            .uri("/create-payment-intent")
            .insert_header(cx.bearer("buyer@example.com"))
            .set_json(json!({ "price": 10 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(cx.payments.calls.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_out_of_range_price_is_rejected_before_processor() {
        let cx = TestContext::new();
        let app = init_app!(cx);

        let req = test::TestRequest::post()
            .uri("/create-payment-intent")
            .insert_header(cx.bearer("buyer@example.com"))
            .insert_header(ContentType::json())
            .set_payload(r#"{"totalPrice": 1e400}"#)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(cx.payments.calls.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_processor_failure_is_opaque_server_error() {
        let cx = TestContext::with_failing_payments();
        let app = init_app!(cx);

        let req = test::TestRequest::post()
            .uri("/create-payment-intent")
            .insert_header(cx.bearer("buyer@example.com"))
            .set_json(json!({ "totalPrice": 5 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }
}
