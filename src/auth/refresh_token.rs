/// Stored Refresh Token Management
///
/// One refresh token is considered valid per account at a time: the one
/// whose SHA-256 digest sits on the `user_accounts` row. The digest is
/// overwritten on each successful login (never store plaintext), and a
/// presented refresh token must hash to the stored value or it is
/// treated as a stale, rotated-out copy.

use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::error::{AppError, AuthError};

/// Hash a refresh token using SHA-256
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Overwrite the stored refresh-token digest for a user
///
/// # Errors
/// Returns `UserNotFound` if no account row exists for the user
pub async fn store_refresh_token(
    pool: &PgPool,
    user_id: i64,
    token: &str,
) -> Result<(), AppError> {
    let token_hash = hash_token(token);

    let result = sqlx::query(
        r#"
        UPDATE user_accounts
        SET refresh_token_hash = $1
        WHERE user_id = $2
        "#,
    )
    .bind(&token_hash)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::warn!(user_id = user_id, "No account row to store refresh token on");
        return Err(AppError::Auth(AuthError::UserNotFound));
    }

    Ok(())
}

/// Fetch the stored refresh-token digest for a user, if any
pub async fn fetch_refresh_token_hash(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<String>, AppError> {
    let stored = sqlx::query_scalar::<_, Option<String>>(
        "SELECT refresh_token_hash FROM user_accounts WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(stored.flatten())
}

/// Compare a presented refresh token against the stored digest
///
/// Pure decision step of the filter's refresh path: no stored value
/// means no account (or a never-logged-in one) for the claimed subject;
/// a digest mismatch means the presented token was rotated out.
pub fn check_stored_refresh(presented: &str, stored: Option<&str>) -> Result<(), AuthError> {
    match stored {
        None => Err(AuthError::UserNotFound),
        Some(stored_hash) => {
            if hash_token(presented) == stored_hash {
                Ok(())
            } else {
                Err(AuthError::RefreshTokenIncorrect)
            }
        }
    }
}
