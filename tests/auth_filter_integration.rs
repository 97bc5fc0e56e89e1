use std::net::TcpListener;

use cineffi::auth::{generate_access_token, issue_token_pair, ROLE_USER};
use cineffi::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, KakaoSettings, Settings,
};
use cineffi::startup::run;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;

pub struct TestApp {
    pub address: String,
    pub jwt: JwtSettings,
}

/// Spawn the app on a random port with a lazily-connecting pool.
///
/// The filter only touches the database on the stored-refresh lookup,
/// so every path exercised here works without a live Postgres; the
/// stored-token comparison itself is unit-tested next to its module.
fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings(port);
    let pool = PgPoolOptions::new()
        .connect_lazy(&settings.database.connection_string())
        .expect("Failed to build lazy pool");

    let jwt = settings.jwt.clone();
    let server = run(listener, pool, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, jwt }
}

fn test_settings(port: u16) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "127.0.0.1".to_string(),
            database_name: "cineffi_test".to_string(),
        },
        application: ApplicationSettings { port },
        jwt: JwtSettings {
            secret: "integration-test-secret-with-enough-length".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 1209600,
            issuer: "cineffi".to_string(),
        },
        kakao: KakaoSettings {
            rest_api_key: "test-key".to_string(),
            redirect_url: "http://localhost:3000/auth/kakao/callback".to_string(),
            auth_base_url: "http://127.0.0.1:1".to_string(),
            api_base_url: "http://127.0.0.1:1".to_string(),
        },
    }
}

async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body.get("code")
        .and_then(|c| c.as_str())
        .expect("Error body has no code")
        .to_string()
}

// --- Public routes ---

#[tokio::test]
async fn public_route_needs_no_cookies() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

// --- Protected routes, rejection paths ---

#[tokio::test]
async fn protected_route_without_cookies_returns_access_token_expired() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/userinfo", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("ACCESS_TOKEN_EXPIRED", error_code(response).await);
}

#[tokio::test]
async fn unknown_path_defaults_to_requiring_auth() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/made/up/path", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("ACCESS_TOKEN_EXPIRED", error_code(response).await);
}

#[tokio::test]
async fn garbage_access_token_without_refresh_is_rejected() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/userinfo", &app.address))
        .header("Cookie", "access=not.a.token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("ACCESS_TOKEN_EXPIRED", error_code(response).await);
}

#[tokio::test]
async fn garbage_refresh_token_is_rejected_as_expired() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/userinfo", &app.address))
        .header("Cookie", "access=not.a.token; refresh=also.not.a.token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("REFRESH_TOKEN_EXPIRED", error_code(response).await);
}

#[tokio::test]
async fn expired_session_pair_is_rejected_as_refresh_expired() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    // Both tokens already past their exp at issue time
    let mut stale = app.jwt.clone();
    stale.access_token_expiry = -10;
    stale.refresh_token_expiry = -10;
    let pair = issue_token_pair(42, ROLE_USER, &stale).expect("Failed to issue pair");

    let response = client
        .get(&format!("{}/api/auth/userinfo", &app.address))
        .header(
            "Cookie",
            format!("access={}; refresh={}", pair.access_token, pair.refresh_token),
        )
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("REFRESH_TOKEN_EXPIRED", error_code(response).await);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let mut forged = app.jwt.clone();
    forged.secret = "a-different-secret-nobody-configured-here".to_string();
    let token = generate_access_token(42, ROLE_USER, &forged).expect("Failed to generate");

    let response = client
        .get(&format!("{}/api/auth/userinfo", &app.address))
        .header("Cookie", format!("access={}", token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!("ACCESS_TOKEN_EXPIRED", error_code(response).await);
}

// --- Authenticated flow without the refresh path ---

#[tokio::test]
async fn logout_with_valid_access_token_clears_both_cookies() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let token = generate_access_token(42, ROLE_USER, &app.jwt).expect("Failed to generate");

    let response = client
        .post(&format!("{}/api/auth/logout", &app.address))
        .header("Cookie", format!("access={}", token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let set_cookies: Vec<String> = response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();

    assert_eq!(2, set_cookies.len());
    assert!(set_cookies.iter().any(|c| c.starts_with("access=")));
    assert!(set_cookies.iter().any(|c| c.starts_with("refresh=")));
    for cookie in &set_cookies {
        assert!(
            cookie.contains("Max-Age=0"),
            "logout cookie must expire immediately: {}",
            cookie
        );
    }
}
