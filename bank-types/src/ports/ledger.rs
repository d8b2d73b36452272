//! Ledger store port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) implement this trait.

use crate::domain::{Account, AccountId, Money};
use crate::error::StoreError;

/// Transaction-scoped access to account rows.
///
/// Every read and write happens inside a transaction handle obtained from
/// [`begin`](LedgerStore::begin). Writes become durable only after
/// [`commit`](LedgerStore::commit); [`rollback`](LedgerStore::rollback)
/// discards them and releases every lock the transaction holds.
///
/// Implementations must guarantee:
/// - `get_account` locks the row for the rest of the transaction, so two
///   transactions can never both read the same balance and then write it.
/// - Dropping a handle that was neither committed nor rolled back rolls it
///   back. A cancelled request must not leave an open transaction behind.
/// - No internal retries.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Transaction handle. Owned by exactly one unit of work.
    type Tx: Send;

    /// Acquires a connection from the pool and opens a transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Point lookup by primary key. A missing row is `StoreError::NotFound`.
    async fn get_account(&self, tx: &mut Self::Tx, id: AccountId) -> Result<Account, StoreError>;

    /// Overwrites the balance column of the given account.
    async fn update_account(
        &self,
        tx: &mut Self::Tx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError>;

    /// Commits the transaction. On failure the transaction is already terminated.
    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;

    /// Abandons the transaction.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError>;
}
