//! Role extraction middleware for the `User-Role` header.

use axum::{
    Json,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bank_types::Role;

/// Header carrying the caller's role claim.
pub const ROLE_HEADER: &str = "User-Role";

/// Paths served without a role claim.
const OPEN_PATHS: [&str; 2] = ["/health", "/api-docs/openapi.json"];

/// Parses the role claim from the request headers.
///
/// Returns `None` when the header is absent, not valid UTF-8, or not one of
/// the known roles. Matching is case-sensitive.
pub fn extract_role(headers: &HeaderMap) -> Option<Role> {
    headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Rejects requests without a valid role claim.
///
/// On success the parsed [`Role`] is inserted as a request extension for the
/// handlers. Requests to `/health` and `/api-docs/openapi.json` pass through
/// untouched.
pub async fn role_middleware(mut request: Request<Body>, next: Next) -> Response {
    if OPEN_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    match extract_role(request.headers()) {
        Some(role) => {
            request.extensions_mut().insert(role);
            next.run(request).await
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Access denied");
            access_denied()
        }
    }
}

fn access_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({
            "error": "access denied",
            "code": 403
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_role_admin() {
        assert_eq!(extract_role(&headers("admin")), Some(Role::Admin));
    }

    #[test]
    fn test_extract_role_client() {
        assert_eq!(extract_role(&headers("client")), Some(Role::Client));
    }

    #[test]
    fn test_extract_role_is_case_sensitive() {
        assert_eq!(extract_role(&headers("Admin")), None);
    }

    #[test]
    fn test_extract_role_unknown() {
        assert_eq!(extract_role(&headers("auditor")), None);
        assert_eq!(extract_role(&headers("")), None);
    }

    #[test]
    fn test_extract_role_missing() {
        assert_eq!(extract_role(&HeaderMap::new()), None);
    }
}
