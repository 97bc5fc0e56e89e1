/// User Routes
///
/// Member profile views.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, DatabaseError};

#[derive(Serialize)]
pub struct UserProfileResponse {
    pub user_id: i64,
    pub nickname: String,
    pub level: i32,
    pub is_bad: bool,
    pub is_certified: bool,
    pub review_count: i64,
}

/// GET /api/users/{id}
pub async fn get_user_profile(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let row = sqlx::query_as::<_, (String, i32, bool, bool, i64)>(
        r#"
        SELECT u.nickname, u.level, u.is_bad, u.is_certified,
               (SELECT COUNT(*) FROM reviews r WHERE r.user_id = u.id)
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(UserProfileResponse {
        user_id,
        nickname: row.0,
        level: row.1,
        is_bad: row.2,
        is_certified: row.3,
        review_count: row.4,
    }))
}
