/// JWT Claims structure
///
/// Represents the payload of a session token containing user identity
/// and standard JWT claims (RFC 7519).

use serde::{Deserialize, Serialize};
use crate::error::{AppError, AuthError};

/// Role granted to every signed-in member
pub const ROLE_USER: &str = "ROLE_USER";

/// Claims carried by both access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (numeric user id as string)
    pub sub: String,
    /// Granted role
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims for a user
    ///
    /// # Arguments
    /// * `user_id` - Numeric user id
    /// * `role` - Granted role
    /// * `expiry_seconds` - Token expiration in seconds from now
    /// * `issuer` - Issuer identifier
    pub fn new(user_id: i64, role: &str, expiry_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
        }
    }

    /// Extract the numeric user id from the subject claim
    ///
    /// A subject that does not parse is treated as an invalid token,
    /// not as a server error.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::Auth(AuthError::RefreshTokenExpired))
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

/// The authenticated identity attached to a request after the filter
/// accepts its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: String,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        Ok(Self {
            user_id: claims.user_id()?,
            role: claims.role.clone(),
        })
    }
}
