/// Authentication module
///
/// Handles JWT token issuance/validation, session cookies, password
/// hashing, the stored-refresh-token invariant and the Kakao OAuth
/// client.

mod claims;
mod cookies;
mod jwt;
mod kakao;
mod password;
mod refresh_token;

pub use claims::Claims;
pub use claims::Principal;
pub use claims::ROLE_USER;
pub use cookies::access_cookie;
pub use cookies::expired_cookie;
pub use cookies::refresh_cookie;
pub use cookies::ACCESS_COOKIE;
pub use cookies::REFRESH_COOKIE;
pub use jwt::decode_token;
pub use jwt::generate_access_token;
pub use jwt::is_valid_token;
pub use jwt::issue_token_pair;
pub use jwt::TokenPair;
pub use kakao::KakaoClient;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::check_stored_refresh;
pub use refresh_token::fetch_refresh_token_hash;
pub use refresh_token::store_refresh_token;
