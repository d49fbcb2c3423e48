use mongodb::bson::doc;

use crate::config::AccessPolicy;
use crate::database::{Collection, DocumentStore, StoreError};
use crate::middleware::Claims;
use crate::models::ROLE_ADMIN;
use crate::utils::AppError;

/// `true` only when a user with this email exists and its `role` is exactly `"admin"`.
/// An unknown email is simply not an admin.
pub async fn is_admin(store: &dyn DocumentStore, email: &str) -> Result<bool, StoreError> {
    let user = store
        .find_one(Collection::Users, doc! { "email": email })
        .await?;

    Ok(user
        .as_ref()
        .and_then(|u| u.get_str("role").ok())
        .map(|role| role == ROLE_ADMIN)
        .unwrap_or(false))
}

/// Gate for routes scoped to one user's email: the caller must be that user or an admin.
pub async fn authorize_email_access(
    store: &dyn DocumentStore,
    policy: &AccessPolicy,
    claims: &Claims,
    email: &str,
) -> Result<(), AppError> {
    if !policy.enforce_ownership || claims.email == email {
        return Ok(());
    }

    if is_admin(store, &claims.email).await? {
        return Ok(());
    }

    log::warn!("🚫 {} tried to access records of {}", claims.email, email);
    Err(AppError::Forbidden)
}

/// Gate for role changes: only admins may promote.
pub async fn require_admin(
    store: &dyn DocumentStore,
    policy: &AccessPolicy,
    claims: &Claims,
) -> Result<(), AppError> {
    if !policy.enforce_ownership || is_admin(store, &claims.email).await? {
        return Ok(());
    }

    log::warn!("🚫 {} is not an admin", claims.email);
    Err(AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn claims(email: &str) -> Claims {
        Claims {
            email: email.to_string(),
            iat: 0,
            exp: usize::MAX,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Users, doc! { "email": "boss@example.com", "role": "admin" })
            .await
            .unwrap();
        store
            .insert_one(Collection::Users, doc! { "email": "mod@example.com", "role": "moderator" })
            .await
            .unwrap();
        store
            .insert_one(Collection::Users, doc! { "email": "plain@example.com" })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_only_admin_role_counts() {
        let store = seeded().await;

        assert!(is_admin(&store, "boss@example.com").await.unwrap());
        assert!(!is_admin(&store, "mod@example.com").await.unwrap());
        assert!(!is_admin(&store, "plain@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_admin() {
        let store = seeded().await;
        assert!(!is_admin(&store, "ghost@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_email_access() {
        let store = seeded().await;
        let policy = AccessPolicy::default();

        assert!(authorize_email_access(&store, &policy, &claims("plain@example.com"), "plain@example.com")
            .await
            .is_ok());
        assert!(authorize_email_access(&store, &policy, &claims("boss@example.com"), "plain@example.com")
            .await
            .is_ok());
        assert!(matches!(
            authorize_email_access(&store, &policy, &claims("plain@example.com"), "boss@example.com").await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_disabled_policy_allows_everyone() {
        let store = seeded().await;
        let policy = AccessPolicy {
            enforce_ownership: false,
            ..AccessPolicy::default()
        };

        assert!(authorize_email_access(&store, &policy, &claims("plain@example.com"), "boss@example.com")
            .await
            .is_ok());
        assert!(require_admin(&store, &policy, &claims("plain@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_require_admin() {
        let store = seeded().await;
        let policy = AccessPolicy::default();

        assert!(require_admin(&store, &policy, &claims("boss@example.com")).await.is_ok());
        assert!(require_admin(&store, &policy, &claims("mod@example.com")).await.is_err());
    }
}
