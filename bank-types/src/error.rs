//! Error types for the bank service.

use crate::domain::AccountId;

/// Domain-level errors (business logic violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Negative values are not allowed")]
    NegativeAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Unknown role: {0:?}")]
    UnknownRole(String),

    #[error("Balance would exceed the representable range")]
    BalanceOverflow,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Ledger store errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Outcome kinds of a failed balance mutation.
///
/// Maps cleanly to HTTP status codes. `Infrastructure` carries the internal
/// detail for logging only; adapters must not expose it to callers.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Internal error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for MutationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientFunds {
                available,
                requested,
            } => MutationError::InsufficientFunds {
                available,
                requested,
            },
            DomainError::UnknownRole(role) => MutationError::Unauthorized(role),
            e => MutationError::Validation(e.to_string()),
        }
    }
}

impl From<StoreError> for MutationError {
    fn from(err: StoreError) -> Self {
        MutationError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_mutation_kinds() {
        assert!(matches!(
            MutationError::from(DomainError::NegativeAmount),
            MutationError::Validation(_)
        ));
        assert!(matches!(
            MutationError::from(DomainError::BalanceOverflow),
            MutationError::Validation(_)
        ));
        assert!(matches!(
            MutationError::from(DomainError::UnknownRole("guest".into())),
            MutationError::Unauthorized(_)
        ));
        assert!(matches!(
            MutationError::from(DomainError::InsufficientFunds {
                available: 1,
                requested: 2
            }),
            MutationError::InsufficientFunds {
                available: 1,
                requested: 2
            }
        ));
    }

    #[test]
    fn test_store_errors_are_infrastructure() {
        let not_found = StoreError::NotFound(AccountId::default());
        assert!(matches!(
            MutationError::from(not_found),
            MutationError::Infrastructure(_)
        ));
        assert!(matches!(
            MutationError::from(StoreError::Connection("pool timed out".into())),
            MutationError::Infrastructure(_)
        ));
    }
}
