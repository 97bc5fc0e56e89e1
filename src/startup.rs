use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::KakaoClient;
use crate::configuration::Settings;
use crate::middleware::{JwtFilter, RequestLogger};
use crate::routes::{
    check_email, check_nickname, create_review, delete_review, get_movie, get_user_profile,
    health_check, hot_reviews, like_movie, like_review, list_movies, login, login_kakao, logout,
    new_reviews, signup, userinfo,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    configuration: Settings,
) -> Result<Server, std::io::Error> {
    let jwt_config = configuration.jwt.clone();
    let kakao_client = KakaoClient::new(&configuration.kakao, reqwest::Client::new());

    let pool = web::Data::new(connection.clone());
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let kakao_data = web::Data::new(kakao_client);

    let server = HttpServer::new(move || {
        App::new()
            // The filter classifies routes itself, so it wraps the whole
            // app; the loggers wrap the filter and see rejections too
            .wrap(JwtFilter::new(jwt_config.clone(), connection.clone()))
            .wrap(RequestLogger)
            .wrap(Logger::default())

            // Shared state
            .app_data(pool.clone())
            .app_data(jwt_config_data.clone())
            .app_data(kakao_data.clone())

            .route("/health_check", web::get().to(health_check))

            // Session endpoints
            .route("/api/auth/signup", web::post().to(signup))
            .route("/api/auth/login", web::post().to(login))
            .route("/api/auth/login/kakao", web::post().to(login_kakao))
            .route("/api/auth/logout", web::post().to(logout))
            .route("/api/auth/userinfo", web::get().to(userinfo))
            .route("/api/auth/email/check", web::post().to(check_email))
            .route("/api/auth/nickname/check", web::post().to(check_nickname))

            // Members
            .route("/api/users/{id}", web::get().to(get_user_profile))

            // Movies
            .route("/api/movies", web::get().to(list_movies))
            .route("/api/movies/{id}", web::get().to(get_movie))
            .route("/api/movies/{id}/likes", web::post().to(like_movie))

            // Reviews
            .route("/api/reviews/create", web::post().to(create_review))
            .route("/api/reviews/new", web::get().to(new_reviews))
            .route("/api/reviews/hot", web::get().to(hot_reviews))
            .route("/api/reviews/{id}", web::delete().to(delete_review))
            .route("/api/reviews/{id}/likes", web::post().to(like_review))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
