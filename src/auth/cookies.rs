/// Session Cookie Construction
///
/// Both tokens travel as http-only cookies. `SameSite=None` + `Secure`
/// because the frontend is served from a different origin.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

use crate::configuration::JwtSettings;

/// Cookie name for the access token (short-lived)
pub const ACCESS_COOKIE: &str = "access";

/// Cookie name for the refresh token (long-lived)
pub const REFRESH_COOKIE: &str = "refresh";

/// Build the access-token cookie, max-age = access TTL
pub fn access_cookie(token: &str, config: &JwtSettings) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, token, config.access_token_expiry)
}

/// Build the refresh-token cookie, max-age = refresh TTL
pub fn refresh_cookie(token: &str, config: &JwtSettings) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, token, config.refresh_token_expiry)
}

/// Build a max-age-0 cookie that clears `name` on the client
pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    session_cookie(name, "", 0)
}

fn session_cookie(name: &'static str, value: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, value.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 1209600,
            issuer: "cineffi".to_string(),
        }
    }

    #[test]
    fn test_access_cookie_attributes() {
        let config = get_test_config();
        let cookie = access_cookie("token-value", &config);

        assert_eq!(cookie.name(), "access");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(1800)));
    }

    #[test]
    fn test_refresh_cookie_uses_refresh_ttl() {
        let config = get_test_config();
        let cookie = refresh_cookie("token-value", &config);

        assert_eq!(cookie.name(), "refresh");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(1209600)));
    }

    #[test]
    fn test_expired_cookie_clears() {
        let cookie = expired_cookie(ACCESS_COOKIE);

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
