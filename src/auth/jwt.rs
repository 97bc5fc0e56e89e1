/// JWT Token Generation and Validation
///
/// Handles creation and validation of the access/refresh token pair.
/// Both tokens are HS256-signed JWTs carrying the same claim shape;
/// they differ only in lifetime.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// An access/refresh token pair minted at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a fresh access/refresh pair for a user
///
/// Access tokens are short-lived, refresh tokens long-lived; both TTLs
/// come from configuration. Pure function of inputs plus current time.
///
/// # Errors
/// Returns error if token signing fails
pub fn issue_token_pair(
    user_id: i64,
    role: &str,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    let access_token = sign(
        &Claims::new(user_id, role, config.access_token_expiry, &config.issuer),
        config,
    )?;
    let refresh_token = sign(
        &Claims::new(user_id, role, config.refresh_token_expiry, &config.issuer),
        config,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Reissue only the access token, same signing discipline as
/// `issue_token_pair`. Used by the filter's silent-refresh path.
pub fn generate_access_token(
    user_id: i64,
    role: &str,
    config: &JwtSettings,
) -> Result<String, AppError> {
    sign(
        &Claims::new(user_id, role, config.access_token_expiry, &config.issuer),
        config,
    )
}

fn sign(claims: &Claims, config: &JwtSettings) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Decode and verify a token, returning its claims
///
/// Fails closed: parse errors, signature mismatches, wrong issuer and
/// past expiry all come back as `Err`. Leeway is zero so validity flips
/// exactly at the `exp` timestamp.
pub fn decode_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        AppError::Auth(AuthError::AccessTokenExpired)
    })
}

/// True when the token decodes, verifies and has not expired
pub fn is_valid_token(token: &str, config: &JwtSettings) -> bool {
    decode_token(token, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::ROLE_USER;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 1209600,
            issuer: "cineffi".to_string(),
        }
    }

    #[test]
    fn test_issue_pair_and_validate_both() {
        let config = get_test_config();

        let pair = issue_token_pair(42, ROLE_USER, &config).expect("Failed to issue pair");

        assert!(is_valid_token(&pair.access_token, &config));
        assert!(is_valid_token(&pair.refresh_token, &config));

        let claims = decode_token(&pair.access_token, &config).expect("Failed to decode");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, ROLE_USER);
        assert_eq!(claims.iss, "cineffi");
    }

    #[test]
    fn test_pair_lifetimes_differ() {
        let config = get_test_config();

        let pair = issue_token_pair(42, ROLE_USER, &config).expect("Failed to issue pair");
        let access = decode_token(&pair.access_token, &config).unwrap();
        let refresh = decode_token(&pair.refresh_token, &config).unwrap();

        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_renewed_access_token_is_valid() {
        let config = get_test_config();

        let token = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");
        let claims = decode_token(&token, &config).expect("Failed to decode");

        assert_eq!(claims.user_id().unwrap(), 42);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let config = get_test_config();

        assert!(!is_valid_token("invalid.token.here", &config));
        assert!(!is_valid_token("", &config));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let config = get_test_config();

        let token = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");
        let tampered = format!("{}X", token);

        assert!(!is_valid_token(&tampered, &config));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let config = get_test_config();
        let token = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");

        let mut other = get_test_config();
        other.secret = "a-completely-different-signing-secret-value".to_string();

        assert!(!is_valid_token(&token, &other));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let mut config = get_test_config();
        let token = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");

        config.issuer = "someone-else".to_string();

        assert!(!is_valid_token(&token, &config));
    }

    #[test]
    fn test_expiry_boundary() {
        let mut config = get_test_config();

        // Still inside the window: valid
        config.access_token_expiry = 2;
        let fresh = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");
        assert!(is_valid_token(&fresh, &config));

        // Already past exp at issue time: invalid with zero leeway
        config.access_token_expiry = -2;
        let expired = generate_access_token(42, ROLE_USER, &config).expect("Failed to generate");
        assert!(!is_valid_token(&expired, &config));
    }
}
