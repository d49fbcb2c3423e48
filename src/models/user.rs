use serde::{Deserialize, Serialize};

use crate::database::UpdateOutcome;

/// Value of a user's `role` field that grants admin rights. Any other value, or none, does not.
pub const ROLE_ADMIN: &str = "admin";

/// Response of `GET /admin/{email}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Response of `PUT /user/{email}`: the upsert acknowledgement plus a fresh token for that email.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserUpsertResponse {
    pub result: UpdateOutcome,
    pub token: String,
}
