/// Review Routes
///
/// Review creation, the public recent feed, the most-liked feed and the
/// per-member like toggle. One review per member per movie.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::Principal;
use crate::error::{AppError, DatabaseError, ValidationError};

const FEED_PAGE_SIZE: i64 = 20;
const MAX_CONTENT_LENGTH: usize = 1000;
const MAX_RATING: i16 = 10;

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub movie_id: i64,
    pub content: String,
    pub rating: i16,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub review_id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub user_id: i64,
    pub nickname: String,
    pub content: String,
    pub rating: i16,
    pub like_count: i64,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct LikeToggleResponse {
    pub liked: bool,
}

/// POST /api/reviews/create
pub async fn create_review(
    form: web::Json<CreateReviewRequest>,
    principal: web::ReqData<Principal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let content = form.content.trim();

    if content.is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "content".to_string(),
        )));
    }
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "content".to_string(),
            MAX_CONTENT_LENGTH,
        )));
    }
    if !(0..=MAX_RATING).contains(&form.rating) {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "rating".to_string(),
        )));
    }

    // The unique (user_id, movie_id) constraint turns a second review
    // into a 409
    let review_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO reviews (movie_id, user_id, content, rating)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(form.movie_id)
    .bind(principal.user_id)
    .bind(content)
    .bind(form.rating)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        user_id = principal.user_id,
        movie_id = form.movie_id,
        review_id = review_id,
        "Review created"
    );

    Ok(HttpResponse::Created().json(serde_json::json!({ "review_id": review_id })))
}

/// GET /api/reviews/new
///
/// Public feed of the most recent reviews.
pub async fn new_reviews(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let reviews = fetch_feed(pool.get_ref(), "r.created_at DESC").await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /api/reviews/hot
///
/// Most-liked reviews.
pub async fn hot_reviews(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let reviews = fetch_feed(pool.get_ref(), "like_count DESC, r.created_at DESC").await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// DELETE /api/reviews/{id}
///
/// Owner-only removal; likes go with the review.
pub async fn delete_review(
    path: web::Path<i64>,
    principal: web::ReqData<Principal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();

    let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
        .bind(review_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "review".to_string(),
        )));
    }

    tracing::info!(
        user_id = principal.user_id,
        review_id = review_id,
        "Review deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/reviews/{id}/likes
pub async fn like_review(
    path: web::Path<i64>,
    principal: web::ReqData<Principal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();

    let removed = sqlx::query("DELETE FROM review_likes WHERE review_id = $1 AND user_id = $2")
        .bind(review_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?
        .rows_affected();

    if removed > 0 {
        return Ok(HttpResponse::Ok().json(LikeToggleResponse { liked: false }));
    }

    sqlx::query("INSERT INTO review_likes (review_id, user_id) VALUES ($1, $2)")
        .bind(review_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LikeToggleResponse { liked: true }))
}

async fn fetch_feed(pool: &PgPool, order_by: &str) -> Result<Vec<ReviewResponse>, AppError> {
    // order_by comes only from the two literal call sites above
    let query = format!(
        r#"
        SELECT r.id, r.movie_id, m.title, r.user_id, u.nickname, r.content, r.rating,
               (SELECT COUNT(*) FROM review_likes rl WHERE rl.review_id = r.id) AS like_count,
               r.created_at
        FROM reviews r
        JOIN movies m ON m.id = r.movie_id
        JOIN users u ON u.id = r.user_id
        ORDER BY {}
        LIMIT {}
        "#,
        order_by, FEED_PAGE_SIZE
    );

    let rows = sqlx::query_as::<
        _,
        (
            i64,
            i64,
            String,
            i64,
            String,
            String,
            i16,
            i64,
            chrono::DateTime<chrono::Utc>,
        ),
    >(&query)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(review_id, movie_id, movie_title, user_id, nickname, content, rating, like_count, created_at)| {
                ReviewResponse {
                    review_id,
                    movie_id,
                    movie_title,
                    user_id,
                    nickname,
                    content,
                    rating,
                    like_count,
                    created_at: created_at.to_rfc3339(),
                }
            },
        )
        .collect())
}
