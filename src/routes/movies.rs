/// Movie Routes
///
/// Title search, detail view and the per-member like toggle.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::Principal;
use crate::error::{AppError, DatabaseError};

const SEARCH_PAGE_SIZE: i64 = 30;

#[derive(Deserialize)]
pub struct MovieSearchQuery {
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct MovieSummary {
    pub movie_id: i64,
    pub title: String,
    pub release_date: Option<chrono::NaiveDate>,
    pub director_name: Option<String>,
}

#[derive(Serialize)]
pub struct MovieDetailResponse {
    pub movie_id: i64,
    pub title: String,
    pub release_date: Option<chrono::NaiveDate>,
    pub director_name: Option<String>,
    pub like_count: i64,
    pub review_count: i64,
}

#[derive(Serialize)]
pub struct LikeToggleResponse {
    pub liked: bool,
}

/// GET /api/movies?query=
///
/// Public title search; without a query returns the most recent titles.
pub async fn list_movies(
    query: web::Query<MovieSearchQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let pattern = query
        .query
        .as_deref()
        .map(|q| format!("%{}%", q.trim()))
        .unwrap_or_else(|| "%".to_string());

    let rows = sqlx::query_as::<_, (i64, String, Option<chrono::NaiveDate>, Option<String>)>(
        r#"
        SELECT id, title, release_date, director_name
        FROM movies
        WHERE title ILIKE $1
        ORDER BY release_date DESC NULLS LAST
        LIMIT $2
        "#,
    )
    .bind(&pattern)
    .bind(SEARCH_PAGE_SIZE)
    .fetch_all(pool.get_ref())
    .await?;

    let movies: Vec<MovieSummary> = rows
        .into_iter()
        .map(|(movie_id, title, release_date, director_name)| MovieSummary {
            movie_id,
            title,
            release_date,
            director_name,
        })
        .collect();

    Ok(HttpResponse::Ok().json(movies))
}

/// GET /api/movies/{id}
pub async fn get_movie(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let movie_id = path.into_inner();

    let row = sqlx::query_as::<_, (String, Option<chrono::NaiveDate>, Option<String>, i64, i64)>(
        r#"
        SELECT m.title, m.release_date, m.director_name,
               (SELECT COUNT(*) FROM movie_likes ml WHERE ml.movie_id = m.id),
               (SELECT COUNT(*) FROM reviews r WHERE r.movie_id = m.id)
        FROM movies m
        WHERE m.id = $1
        "#,
    )
    .bind(movie_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("movie".to_string())))?;

    Ok(HttpResponse::Ok().json(MovieDetailResponse {
        movie_id,
        title: row.0,
        release_date: row.1,
        director_name: row.2,
        like_count: row.3,
        review_count: row.4,
    }))
}

/// POST /api/movies/{id}/likes
///
/// Toggle the caller's like on a movie.
pub async fn like_movie(
    path: web::Path<i64>,
    principal: web::ReqData<Principal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let movie_id = path.into_inner();

    let removed = sqlx::query("DELETE FROM movie_likes WHERE movie_id = $1 AND user_id = $2")
        .bind(movie_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?
        .rows_affected();

    if removed > 0 {
        return Ok(HttpResponse::Ok().json(LikeToggleResponse { liked: false }));
    }

    sqlx::query("INSERT INTO movie_likes (movie_id, user_id) VALUES ($1, $2)")
        .bind(movie_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?;

    tracing::debug!(
        user_id = principal.user_id,
        movie_id = movie_id,
        "Movie liked"
    );

    Ok(HttpResponse::Ok().json(LikeToggleResponse { liked: true }))
}
