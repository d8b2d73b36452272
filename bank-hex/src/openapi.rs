//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use bank_types::dto::{AccountResponse, ErrorResponse, MutationRequest};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Apply a role-conditioned balance mutation
///
/// `admin` withdraws `amount`, `client` deposits it.
#[utoipa::path(
    post,
    path = "/bank",
    tag = "bank",
    request_body = MutationRequest,
    security(("user_role" = [])),
    responses(
        (status = 200, description = "Mutation committed", body = AccountResponse),
        (status = 400, description = "Negative amount or malformed body", body = ErrorResponse),
        (status = 403, description = "Missing or unknown role, or insufficient funds", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn apply_mutation() {}

/// OpenAPI documentation for the Bank API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bank Balance Service API",
        version = "1.0.0",
        description = "Single-account balance service. The `User-Role` header decides the direction of a mutation:\n\n```\nUser-Role: admin   # withdraw\nUser-Role: client  # deposit\n```",
        license(name = "MIT"),
    ),
    paths(health, apply_mutation),
    components(schemas(MutationRequest, AccountResponse, ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "bank", description = "Balance mutations"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the `User-Role` header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_role",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("User-Role"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_bank_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/bank"));
    }

    #[test]
    fn test_document_declares_role_header() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let scheme = &json["components"]["securitySchemes"]["user_role"];
        assert_eq!(scheme["type"], "apiKey");
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], "User-Role");
    }
}
