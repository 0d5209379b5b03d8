//! User management — registration, credential updates and upgrades.

use chirpy_core::auth::password::hash_password;
use chirpy_core::models::auth::User;
use chirpy_core::store::UserStore;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reject blank emails and passwords before touching the store.
fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    Ok(())
}

/// Register a new user.
pub async fn create_user(store: &dyn UserStore, email: &str, password: &str) -> AppResult<User> {
    validate_credentials(email, password)?;
    let password_hash = hash_password(password)?;
    let user = store.create_user(email, &password_hash).await?;
    info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Replace the email and password of `user_id`.
pub async fn update_user(
    store: &dyn UserStore,
    user_id: Uuid,
    email: &str,
    password: &str,
) -> AppResult<User> {
    validate_credentials(email, password)?;
    let password_hash = hash_password(password)?;
    let user = store
        .update_user(user_id, email, &password_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(user_id = %user.id, "user credentials updated");
    Ok(user)
}

/// Mark `user_id` as upgraded.
pub async fn upgrade_user(store: &dyn UserStore, user_id: Uuid) -> AppResult<()> {
    if !store.upgrade_user(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = %user_id, "user upgraded");
    Ok(())
}
