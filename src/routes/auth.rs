/// Authentication Routes
///
/// Handles signup, email login, Kakao login, logout, duplication checks
/// and current user information. Successful logins answer with the
/// access/refresh cookie pair and store the refresh-token digest on the
/// account row.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    access_cookie, expired_cookie, hash_password, issue_token_pair, refresh_cookie,
    store_refresh_token, verify_password, KakaoClient, Principal, ACCESS_COOKIE, REFRESH_COOKIE,
    ROLE_USER,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::validators::{is_valid_email, is_valid_nickname};

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

/// Email login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Kakao login request carrying the authorization code
#[derive(Deserialize)]
pub struct KakaoLoginRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct EmailCheckRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct NicknameCheckRequest {
    pub nickname: String,
}

#[derive(Serialize)]
pub struct DuplicationResponse {
    pub is_duplicate: bool,
}

/// Profile payload returned after login and from the userinfo endpoint
#[derive(Serialize)]
pub struct UserInfoResponse {
    pub user_id: i64,
    pub nickname: String,
    pub level: i32,
    pub is_bad: bool,
    pub is_certified: bool,
}

/// POST /api/auth/signup
///
/// Register with email, password and nickname.
///
/// # Errors
/// - 400: Validation errors (invalid email/password/nickname)
/// - 409: Email or nickname already taken
pub async fn signup(
    form: web::Json<SignupRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("signup");

    let email = is_valid_email(&form.email)?;
    let nickname = is_valid_nickname(&form.nickname)?;
    let password_hash = hash_password(&form.password)?;

    if email_exists(pool.get_ref(), &email).await? {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "email already registered".to_string(),
        )));
    }
    if nickname_exists(pool.get_ref(), &nickname).await? {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "nickname already taken".to_string(),
        )));
    }

    let user_id = join_user(pool.get_ref(), &email, Some(&password_hash), &nickname, false).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user_id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().finish())
}

/// POST /api/auth/login
///
/// Email login. On success issues a fresh token pair, overwrites the
/// stored refresh digest and sets both session cookies.
///
/// # Security Notes
/// - Same error for "no such account" and "wrong password"
///   (prevents user enumeration)
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("email_login");

    let email = is_valid_email(&form.email)?;

    let account = sqlx::query_as::<_, (i64, Option<String>)>(
        "SELECT user_id, password_hash FROM user_accounts WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let (user_id, password_hash) = account;

    // Kakao-joined accounts carry no password
    let password_hash = password_hash.ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let response = open_session(pool.get_ref(), jwt_config.get_ref(), user_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user_id,
        "User logged in"
    );

    Ok(response)
}

/// POST /api/auth/login/kakao
///
/// Kakao login: exchange the authorization code for the account email;
/// first-time members are joined automatically with a generated
/// nickname and a pre-verified, passwordless account.
///
/// # Errors
/// - 502: Upstream provider call failed or returned a malformed payload
pub async fn login_kakao(
    form: web::Json<KakaoLoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
    kakao: web::Data<KakaoClient>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("kakao_login");

    let email = kakao.fetch_email(&form.code).await?;

    let user_id = match get_user_id_by_email(pool.get_ref(), &email).await? {
        Some(id) => id,
        None => {
            let nickname = generate_nickname(pool.get_ref()).await?;
            let id = join_user(pool.get_ref(), &email, None, &nickname, true).await?;
            tracing::info!(
                request_id = %context.request_id,
                user_id = id,
                "Kakao member auto-joined"
            );
            id
        }
    };

    let response = open_session(pool.get_ref(), jwt_config.get_ref(), user_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user_id,
        "Kakao login completed"
    );

    Ok(response)
}

/// POST /api/auth/logout
///
/// Clears both session cookies with max-age 0. Deliberately touches no
/// persisted state; the stored refresh digest is only replaced at the
/// next login.
pub async fn logout(principal: web::ReqData<Principal>) -> Result<HttpResponse, AppError> {
    tracing::info!(user_id = principal.user_id, "User logged out");

    Ok(HttpResponse::Ok()
        .cookie(expired_cookie(ACCESS_COOKIE))
        .cookie(expired_cookie(REFRESH_COOKIE))
        .finish())
}

/// GET /api/auth/userinfo
///
/// Current authenticated user's profile. The principal is injected by
/// the authentication filter.
pub async fn userinfo(
    principal: web::ReqData<Principal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let profile = fetch_profile(pool.get_ref(), principal.user_id).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/auth/email/check
pub async fn check_email(
    form: web::Json<EmailCheckRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let is_duplicate = email_exists(pool.get_ref(), &email).await?;

    Ok(HttpResponse::Ok().json(DuplicationResponse { is_duplicate }))
}

/// POST /api/auth/nickname/check
pub async fn check_nickname(
    form: web::Json<NicknameCheckRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let nickname = is_valid_nickname(&form.nickname)?;
    let is_duplicate = nickname_exists(pool.get_ref(), &nickname).await?;

    Ok(HttpResponse::Ok().json(DuplicationResponse { is_duplicate }))
}

/// Issue a token pair for the user, persist the refresh digest and
/// build the cookie-bearing response with the profile payload.
async fn open_session(
    pool: &PgPool,
    jwt_config: &JwtSettings,
    user_id: i64,
) -> Result<HttpResponse, AppError> {
    let pair = issue_token_pair(user_id, ROLE_USER, jwt_config)?;
    store_refresh_token(pool, user_id, &pair.refresh_token).await?;

    let profile = fetch_profile(pool, user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(access_cookie(&pair.access_token, jwt_config))
        .cookie(refresh_cookie(&pair.refresh_token, jwt_config))
        .json(profile))
}

async fn fetch_profile(pool: &PgPool, user_id: i64) -> Result<UserInfoResponse, AppError> {
    let row = sqlx::query_as::<_, (String, i32, bool, bool)>(
        "SELECT nickname, level, is_bad, is_certified FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Auth(AuthError::UserNotFound))?;

    Ok(UserInfoResponse {
        user_id,
        nickname: row.0,
        level: row.1,
        is_bad: row.2,
        is_certified: row.3,
    })
}

async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM user_accounts WHERE email = $1)",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

async fn nickname_exists(pool: &PgPool, nickname: &str) -> Result<bool, AppError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
            .bind(nickname)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

async fn get_user_id_by_email(pool: &PgPool, email: &str) -> Result<Option<i64>, AppError> {
    let user_id =
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM user_accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(user_id)
}

/// Create the user row and its account row together
async fn join_user(
    pool: &PgPool,
    email: &str,
    password_hash: Option<&str>,
    nickname: &str,
    is_authenticated: bool,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (nickname) VALUES ($1) RETURNING id",
    )
    .bind(nickname)
    .fetch_one(&mut tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_accounts (user_id, email, password_hash, is_authenticated)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(password_hash)
    .bind(is_authenticated)
    .execute(&mut tx)
    .await?;

    tx.commit().await?;

    Ok(user_id)
}

/// 랜덤 비중복 닉네임 생성기 (동물 이름 + 숫자)
async fn generate_nickname(pool: &PgPool) -> Result<String, AppError> {
    use rand::Rng;

    const ANIMALS: [&str; 4] = ["강아지", "고양이", "앵무새", "토끼"];

    loop {
        let number = rand::thread_rng().gen_range(0..100000u32);
        let animal = ANIMALS[(number % 4) as usize];
        let candidate = format!("{}{}", animal, number);

        if !nickname_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
}
