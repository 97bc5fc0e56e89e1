/// Middleware module
///
/// The request authentication filter, its route-classification table
/// and request logging.

mod jwt_filter;
mod request_logger;
pub mod route_policy;

pub use jwt_filter::JwtFilter;
pub use request_logger::RequestLogger;
