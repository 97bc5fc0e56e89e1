/// Kakao OAuth Client
///
/// Exchanges an authorization code for a provider access token, then
/// fetches the account email with it. Transport failures, non-2xx
/// statuses and undecodable payloads all surface as upstream-auth
/// errors; a failed call never yields a half-built login.

use serde::Deserialize;

use crate::configuration::KakaoSettings;
use crate::error::{AppError, OAuthError};

#[derive(Clone)]
pub struct KakaoClient {
    http_client: reqwest::Client,
    rest_api_key: String,
    redirect_url: String,
    auth_base_url: String,
    api_base_url: String,
}

/// Token endpoint response shape
#[derive(Debug, Deserialize)]
pub struct KakaoTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Profile endpoint response shape; only the email is consumed
#[derive(Debug, Deserialize)]
struct KakaoProfile {
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
}

impl KakaoClient {
    pub fn new(settings: &KakaoSettings, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            rest_api_key: settings.rest_api_key.clone(),
            redirect_url: settings.redirect_url.clone(),
            auth_base_url: settings.auth_base_url.clone(),
            api_base_url: settings.api_base_url.clone(),
        }
    }

    /// Exchange an authorization code for a provider access token
    ///
    /// POST form-encoded to the token endpoint, per the provider's
    /// authorization-code grant.
    pub async fn request_token(&self, code: &str) -> Result<KakaoTokenResponse, AppError> {
        let url = format!("{}/oauth/token", self.auth_base_url);
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.rest_api_key.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Kakao token request failed: {}", e);
                AppError::OAuth(OAuthError::TokenExchange(e.to_string()))
            })?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Kakao token endpoint returned error: {}", e);
                AppError::OAuth(OAuthError::TokenExchange(e.to_string()))
            })?;

        response
            .json::<KakaoTokenResponse>()
            .await
            .map_err(|e| AppError::OAuth(OAuthError::MalformedResponse(e.to_string())))
    }

    /// Fetch the account email with a provider access token
    pub async fn request_email(&self, provider_token: &str) -> Result<String, AppError> {
        let url = format!("{}/v2/user/me", self.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(provider_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Kakao profile request failed: {}", e);
                AppError::OAuth(OAuthError::ProfileFetch(e.to_string()))
            })?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Kakao profile endpoint returned error: {}", e);
                AppError::OAuth(OAuthError::ProfileFetch(e.to_string()))
            })?;

        let profile = response
            .json::<KakaoProfile>()
            .await
            .map_err(|e| AppError::OAuth(OAuthError::MalformedResponse(e.to_string())))?;

        profile
            .kakao_account
            .and_then(|account| account.email)
            .ok_or_else(|| {
                AppError::OAuth(OAuthError::MalformedResponse(
                    "kakao_account.email missing from profile".to_string(),
                ))
            })
    }

    /// Given an authorization code, return the account email
    pub async fn fetch_email(&self, code: &str) -> Result<String, AppError> {
        let token = self.request_token(code).await?;
        self.request_email(&token.access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_decodes() {
        let body = r#"{
            "token_type": "bearer",
            "access_token": "provider-access",
            "expires_in": 21599,
            "refresh_token": "provider-refresh"
        }"#;

        let parsed: KakaoTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "provider-access");
        assert_eq!(parsed.expires_in, Some(21599));
    }

    #[test]
    fn test_profile_email_decodes() {
        let body = r#"{
            "id": 1234567,
            "kakao_account": { "email": "member@example.com" }
        }"#;

        let parsed: KakaoProfile = serde_json::from_str(body).unwrap();
        let email = parsed.kakao_account.and_then(|a| a.email);
        assert_eq!(email.as_deref(), Some("member@example.com"));
    }

    #[test]
    fn test_profile_without_email_is_detectable() {
        let body = r#"{ "id": 1234567, "kakao_account": {} }"#;

        let parsed: KakaoProfile = serde_json::from_str(body).unwrap();
        assert!(parsed.kakao_account.and_then(|a| a.email).is_none());
    }

    #[test]
    fn test_malformed_token_payload_fails() {
        // Missing access_token must not decode into the happy shape
        let body = r#"{ "error": "invalid_grant" }"#;

        assert!(serde_json::from_str::<KakaoTokenResponse>(body).is_err());
    }
}
