//! # Bank Client SDK
//!
//! A typed Rust client for the Bank API.

use bank_types::{AccountResponse, Money, MutationRequest, Role};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Header carrying the caller's role claim.
const ROLE_HEADER: &str = "User-Role";

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bank API client.
pub struct BankClient {
    base_url: String,
    http: Client,
}

impl BankClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Deposits `amount` (role `client`).
    pub async fn deposit(&self, amount: Money) -> Result<AccountResponse, ClientError> {
        self.apply(amount, Role::Client).await
    }

    /// Withdraws `amount` (role `admin`).
    pub async fn withdraw(&self, amount: Money) -> Result<AccountResponse, ClientError> {
        self.apply(amount, Role::Admin).await
    }

    /// Applies a mutation under an explicit role.
    pub async fn apply(&self, amount: Money, role: Role) -> Result<AccountResponse, ClientError> {
        let req = MutationRequest {
            amount: amount.amount(),
        };
        self.post("/bank", role, &req).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        role: Role,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(ROLE_HEADER, role.as_str())
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
