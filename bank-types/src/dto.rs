//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Account, AccountId};

/// Request to mutate the account balance.
///
/// The direction of the change is not part of the body: it is derived from
/// the caller's role (`admin` withdraws, `client` deposits).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct MutationRequest {
    /// Magnitude of the change in minor currency units (cents). Must be >= 0.
    #[schema(example = 4000)]
    pub amount: i64,
}

/// Account state returned after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    /// Account identifier
    #[schema(value_type = i64, example = 1)]
    pub id: AccountId,
    /// New balance in minor currency units (cents)
    #[schema(example = 6000)]
    pub balance: i64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            balance: account.balance.amount(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Insufficient funds")]
    pub error: String,
    #[schema(example = 403)]
    pub code: u16,
}
