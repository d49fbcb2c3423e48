use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("UnAuthorized access")]
    Unauthenticated,
    #[error("Forbidden access")]
    Forbidden,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Payment processor error: {0}")]
    Payment(String),
    #[error("Token error: {0}")]
    Token(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Payment(_) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthenticated | AppError::Forbidden => self.to_string(),
            AppError::InvalidRequest(msg) => msg.clone(),
            // Upstream details stay in the log
            _ => {
                log::error!("❌ {}", self);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_gate_errors_keep_client_messages() {
        let res = AppError::Unauthenticated.error_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"message":"UnAuthorized access"}"#);

        let res = AppError::Forbidden.error_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"message":"Forbidden access"}"#);
    }

    #[actix_web::test]
    async fn test_upstream_errors_hide_detail() {
        let res = AppError::Payment("card_declined: secret detail".into()).error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret detail"));
        assert!(text.contains("Internal server error"));
    }
}
