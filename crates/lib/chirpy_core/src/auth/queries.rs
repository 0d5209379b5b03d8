//! Auth-related database queries.
//!
//! Refresh tokens are stored as SHA-256 digests; the plaintext never reaches
//! the database.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::auth::{RefreshToken, User, UserWithPassword};
use crate::store::{Result, StoreError};

type UserRow = (Uuid, String, bool, DateTime<Utc>, DateTime<Utc>);

fn user_from_row((id, email, is_chirpy_red, created_at, updated_at): UserRow) -> User {
    User {
        id,
        email,
        is_chirpy_red,
        created_at,
        updated_at,
    }
}

/// Map unique-constraint violations to `Conflict`, everything else to `Db`.
fn conflict_or_db(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Db(e)
}

/// SHA-256 hash a refresh token for storage.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fetch a user and password hash by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserWithPassword>> {
    let row = sqlx::query_as::<_, (Uuid, String, bool, DateTime<Utc>, DateTime<Utc>, String)>(
        "SELECT id, email, is_chirpy_red, created_at, updated_at, hashed_password \
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, email, red, created, updated, password_hash)| UserWithPassword {
        user: user_from_row((id, email, red, created, updated)),
        password_hash,
    }))
}

/// Create a new user.
pub async fn create_user(pool: &PgPool, email: &str, password_hash: &str) -> Result<User> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, hashed_password) VALUES ($1, $2) \
         RETURNING id, email, is_chirpy_red, created_at, updated_at",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db(e, "user"))?;
    Ok(user_from_row(row))
}

/// Replace email and password hash of a user.
pub async fn update_user(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    password_hash: &str,
) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET email = $2, hashed_password = $3, updated_at = now() \
         WHERE id = $1 \
         RETURNING id, email, is_chirpy_red, created_at, updated_at",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_or_db(e, "user"))?;
    Ok(row.map(user_from_row))
}

/// Set the upgraded flag. Returns false if no such user.
pub async fn upgrade_user(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET is_chirpy_red = true, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store a refresh token hash.
pub async fn store_refresh_token(
    pool: &PgPool,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken> {
    let (created_at, expires_at) = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>)>(
        "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3) \
         RETURNING created_at, expires_at",
    )
    .bind(hash_refresh_token(token))
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db(e, "refresh token"))?;
    Ok(RefreshToken {
        token: token.to_string(),
        user_id,
        created_at,
        expires_at,
        revoked_at: None,
    })
}

/// Owner of a non-revoked, non-expired refresh token.
pub async fn find_user_id_by_valid_refresh_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<Uuid>> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM refresh_tokens \
         WHERE token_hash = $1 \
           AND revoked_at IS NULL \
           AND expires_at > now()",
    )
    .bind(hash_refresh_token(token))
    .fetch_optional(pool)
    .await?;
    Ok(user_id)
}

/// Revoke a refresh token. The first revocation time is kept.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<()> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now(), updated_at = now() \
         WHERE token_hash = $1 AND revoked_at IS NULL",
    )
    .bind(hash_refresh_token(token))
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_sha256_hex() {
        let hash = hash_refresh_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
