use actix_web::web;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Arc, Mutex};

use crate::config::AccessPolicy;
use crate::database::{DocumentStore, MemoryStore};
use crate::models::PaymentIntent;
use crate::services::payment_service::PaymentProcessor;
use crate::services::token_service::TokenService;
use crate::utils::AppError;

pub const TEST_SECRET: &str = "handler-test-secret";

/// Records every intent request instead of calling Stripe.
#[derive(Default)]
pub struct RecordingProcessor {
    pub calls: Mutex<Vec<(i64, String, Vec<String>)>>,
    pub fail: bool,
}

#[async_trait]
impl PaymentProcessor for RecordingProcessor {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, AppError> {
        if self.fail {
            return Err(AppError::Payment("card_declined".to_string()));
        }

        let mut calls = self.calls.lock().unwrap();
        calls.push((
            amount,
            currency.to_string(),
            payment_method_types.iter().map(|m| m.to_string()).collect(),
        ));

        let id = format!("pi_test_{}", calls.len());
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_abc", id),
            id,
        })
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub tokens: web::Data<TokenService>,
    pub payments: Arc<RecordingProcessor>,
    pub policy: AccessPolicy,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(AccessPolicy::default())
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            tokens: web::Data::new(TokenService::new(TEST_SECRET, Duration::hours(1))),
            payments: Arc::new(RecordingProcessor::default()),
            policy,
        }
    }

    pub fn with_failing_payments() -> Self {
        Self {
            payments: Arc::new(RecordingProcessor {
                fail: true,
                ..RecordingProcessor::default()
            }),
            ..Self::new()
        }
    }

    pub fn store_data(&self) -> web::Data<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        web::Data::from(store)
    }

    pub fn payments_data(&self) -> web::Data<dyn PaymentProcessor> {
        let payments: Arc<dyn PaymentProcessor> = self.payments.clone();
        web::Data::from(payments)
    }

    /// `Authorization` header carrying a fresh token for `email`.
    pub fn bearer(&self, email: &str) -> (&'static str, String) {
        let token = self.tokens.issue(email).unwrap();
        ("Authorization", format!("Bearer {}", token))
    }
}

/// Builds the full application around a `TestContext`.
macro_rules! init_app {
    ($cx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($cx.store_data())
                .app_data($cx.tokens.clone())
                .app_data($cx.payments_data())
                .app_data(actix_web::web::Data::new($cx.policy))
                .configure(|cfg| crate::api::configure(cfg, $cx.policy)),
        )
        .await
    };
}

pub(crate) use init_app;
