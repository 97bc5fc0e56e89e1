/// Route Access Classification
///
/// A single ordered table of (pattern, policy) pairs, evaluated once
/// per request, first match wins. Any path the table does not name
/// requires authentication: the default is deny.

use lazy_static::lazy_static;
use regex::Regex;

/// Access policy for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Proceed without touching session cookies
    Public,
    /// Must present a valid access token (or a refreshable session)
    RequiresAuth,
}

enum PathPattern {
    Exact(&'static str),
    Pattern(Regex),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == *exact,
            PathPattern::Pattern(re) => re.is_match(path),
        }
    }
}

lazy_static! {
    static ref ROUTE_TABLE: Vec<(PathPattern, AccessPolicy)> = vec![
        // Public allow-list
        (PathPattern::Exact("/health_check"), AccessPolicy::Public),
        (PathPattern::Exact("/api/auth/signup"), AccessPolicy::Public),
        (PathPattern::Exact("/api/auth/login"), AccessPolicy::Public),
        (PathPattern::Exact("/api/auth/login/kakao"), AccessPolicy::Public),
        (PathPattern::Exact("/api/auth/email/check"), AccessPolicy::Public),
        (PathPattern::Exact("/api/auth/nickname/check"), AccessPolicy::Public),
        (PathPattern::Exact("/api/movies"), AccessPolicy::Public),
        (PathPattern::Exact("/api/reviews/new"), AccessPolicy::Public),
        // Parameterized resource paths; same policy as the default,
        // kept explicit so the protected URL space is documented here
        (
            PathPattern::Pattern(Regex::new(r"^/api/users/\d+$").unwrap()),
            AccessPolicy::RequiresAuth,
        ),
        (
            PathPattern::Pattern(Regex::new(r"^/api/movies/\d+(/likes)?$").unwrap()),
            AccessPolicy::RequiresAuth,
        ),
        (
            PathPattern::Pattern(Regex::new(r"^/api/reviews/\d+(/likes)?$").unwrap()),
            AccessPolicy::RequiresAuth,
        ),
        (PathPattern::Exact("/api/auth/logout"), AccessPolicy::RequiresAuth),
        (PathPattern::Exact("/api/auth/userinfo"), AccessPolicy::RequiresAuth),
        (PathPattern::Exact("/api/reviews/create"), AccessPolicy::RequiresAuth),
        (PathPattern::Exact("/api/reviews/hot"), AccessPolicy::RequiresAuth),
    ];
}

/// Classify a request path. First table match wins; unmatched paths
/// require authentication.
pub fn classify(path: &str) -> AccessPolicy {
    for (pattern, policy) in ROUTE_TABLE.iter() {
        if pattern.matches(path) {
            return *policy;
        }
    }
    AccessPolicy::RequiresAuth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert_eq!(classify("/health_check"), AccessPolicy::Public);
        assert_eq!(classify("/api/auth/login"), AccessPolicy::Public);
        assert_eq!(classify("/api/auth/login/kakao"), AccessPolicy::Public);
        assert_eq!(classify("/api/movies"), AccessPolicy::Public);
        assert_eq!(classify("/api/reviews/new"), AccessPolicy::Public);
    }

    #[test]
    fn test_protected_exact_paths() {
        assert_eq!(classify("/api/auth/logout"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/auth/userinfo"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/reviews/create"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/reviews/hot"), AccessPolicy::RequiresAuth);
    }

    #[test]
    fn test_numeric_id_paths_require_auth() {
        assert_eq!(classify("/api/users/42"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/movies/42"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/movies/42/likes"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/reviews/42"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/reviews/42/likes"), AccessPolicy::RequiresAuth);
    }

    #[test]
    fn test_exact_match_does_not_leak_to_subpaths() {
        // "/api/movies" is public, its id-form is not
        assert_eq!(classify("/api/movies"), AccessPolicy::Public);
        assert_eq!(classify("/api/movies/7"), AccessPolicy::RequiresAuth);
        // non-numeric segment falls through to the default
        assert_eq!(classify("/api/movies/latest"), AccessPolicy::RequiresAuth);
    }

    #[test]
    fn test_unknown_paths_default_to_requires_auth() {
        assert_eq!(classify("/"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/api/chat/rooms"), AccessPolicy::RequiresAuth);
        assert_eq!(classify("/anything/else"), AccessPolicy::RequiresAuth);
    }
}
