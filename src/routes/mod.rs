mod auth;
mod health_check;
mod movies;
mod reviews;
mod users;

pub use auth::{check_email, check_nickname, login, login_kakao, logout, signup, userinfo};
pub use health_check::health_check;
pub use movies::{get_movie, like_movie, list_movies};
pub use reviews::{create_review, delete_review, hot_reviews, like_review, new_reviews};
pub use users::get_user_profile;
