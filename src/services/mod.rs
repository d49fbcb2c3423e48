pub mod payment_service;
pub mod role_service;
pub mod token_service;

pub use payment_service::{PaymentProcessor, StripeClient};
pub use token_service::TokenService;
