/// Request Authentication Filter
///
/// Every inbound request passes through here. Public paths proceed
/// untouched; protected paths must carry a valid access-token cookie or
/// a refresh token that matches the one stored for the account, in
/// which case a fresh access token is minted and set on the response.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::{
    access_cookie, check_stored_refresh, decode_token, fetch_refresh_token_hash,
    generate_access_token, Principal, ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::middleware::route_policy::{classify, AccessPolicy};

/// JWT filter applied to the whole app
///
/// Classifies the route itself, so it wraps every request rather than
/// being attached per-scope.
pub struct JwtFilter {
    jwt_config: JwtSettings,
    pool: PgPool,
}

impl JwtFilter {
    pub fn new(jwt_config: JwtSettings, pool: PgPool) -> Self {
        Self { jwt_config, pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtFilterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtFilterService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
            pool: self.pool.clone(),
        }))
    }
}

pub struct JwtFilterService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
    pool: PgPool,
}

impl<S, B> Service<ServiceRequest> for JwtFilterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        // Public routes never touch the session cookies
        if classify(req.path()) == AccessPolicy::Public {
            return Box::pin(async move { service.call(req).await });
        }

        let jwt_config = self.jwt_config.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            let access = req.cookie(ACCESS_COOKIE).map(|c| c.value().to_string());
            let refresh = req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string());

            // Valid access token: authenticate and continue
            if let Some(token) = access {
                if let Ok(claims) = decode_token(&token, &jwt_config) {
                    let principal = Principal::from_claims(&claims)?;
                    req.extensions_mut().insert(principal);
                    return service.call(req).await;
                }
            }

            // Access token absent or invalid; without a refresh token
            // the session is simply over
            let refresh = match refresh {
                Some(token) => token,
                None => return Err(AppError::Auth(AuthError::AccessTokenExpired).into()),
            };

            let claims = decode_token(&refresh, &jwt_config)
                .map_err(|_| AppError::Auth(AuthError::RefreshTokenExpired))?;
            let user_id = claims.user_id()?;

            // Single-stored-token invariant: the presented refresh token
            // must be the one currently on the account row
            let stored = fetch_refresh_token_hash(&pool, user_id).await?;
            check_stored_refresh(&refresh, stored.as_deref()).map_err(AppError::Auth)?;

            let new_access = generate_access_token(user_id, &claims.role, &jwt_config)?;
            let renewed = access_cookie(&new_access, &jwt_config);

            tracing::info!(user_id = user_id, "Access token renewed from refresh token");

            req.extensions_mut().insert(Principal {
                user_id,
                role: claims.role.clone(),
            });

            let mut res = service.call(req).await?;
            let cookie_value = HeaderValue::from_str(&renewed.to_string())
                .map_err(|e| AppError::Internal(format!("Cookie encoding failed: {}", e)))?;
            res.headers_mut().append(header::SET_COOKIE, cookie_value);

            Ok(res)
        })
    }
}
