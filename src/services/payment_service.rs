use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::models::PaymentIntent;
use crate::utils::AppError;

pub const CURRENCY: &str = "usd";
pub const PAYMENT_METHOD_TYPES: &[&str] = &["card"];

/// Converts a price in currency units to integer minor units (cents).
/// Rounds, so 19.99 becomes 1999 rather than 1998.
///
/// Over HTTP a NaN or out-of-range `totalPrice` never gets here: serde_json
/// refuses it and the JSON extractor answers 400. The finiteness check covers
/// other callers.
pub fn to_minor_units(price: f64) -> Result<i64, AppError> {
    if !price.is_finite() {
        return Err(AppError::InvalidRequest("totalPrice must be a number".to_string()));
    }
    Ok((price * 100.0).round() as i64)
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, AppError>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Stripe `POST /v1/payment_intents` over its form-encoded REST API.
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(api_base: &str, secret_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Payment(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, AppError> {
        log::info!("💳 Creating payment intent: {} {}", amount, currency);

        let mut form: Vec<(&str, String)> = vec![
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
        ];
        for method in payment_method_types {
            form.push(("payment_method_types[]", method.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to reach Stripe: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<StripeErrorBody>().await {
                Ok(body) => format!(
                    "{} {}",
                    body.error.code.unwrap_or_default(),
                    body.error.message.unwrap_or_default()
                ),
                Err(_) => String::new(),
            };
            return Err(AppError::Payment(format!("Stripe returned {}: {}", status, detail.trim())));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to parse Stripe response: {}", e)))?;

        log::info!("✅ Payment intent created: {}", intent.id);
        Ok(intent)
    }
}
