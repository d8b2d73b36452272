//! In-memory ledger adapter.
//!
//! Each account row sits behind its own async mutex. A transaction takes the
//! row lock on first touch and keeps it until commit, rollback or drop, which
//! gives the same writer serialization as `SELECT ... FOR UPDATE`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use bank_types::{Account, AccountId, LedgerStore, Money, StoreError};

/// In-memory ledger with row-level locking.
#[derive(Default)]
pub struct InMemoryLedger {
    rows: DashMap<AccountId, Arc<Mutex<Money>>>,
}

/// Transaction handle for [`InMemoryLedger`].
///
/// Staged writes live here until commit; dropping the handle discards them
/// and releases the row locks.
pub struct MemoryTx {
    locked: HashMap<AccountId, OwnedMutexGuard<Money>>,
    staged: HashMap<AccountId, Money>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding a single account.
    pub fn with_account(id: AccountId, balance: Money) -> Self {
        let ledger = Self::new();
        ledger.open_account(id, balance);
        ledger
    }

    /// Inserts (or replaces) an account row outside of any transaction.
    pub fn open_account(&self, id: AccountId, balance: Money) {
        self.rows.insert(id, Arc::new(Mutex::new(balance)));
    }

    /// Returns the committed balance, waiting for any open transaction on the row.
    pub async fn balance(&self, id: AccountId) -> Option<Money> {
        let row = self.row(id)?;
        let balance = *row.lock().await;
        Some(balance)
    }

    fn row(&self, id: AccountId) -> Option<Arc<Mutex<Money>>> {
        // Clone the Arc so the shard guard is released before awaiting the row lock.
        self.rows.get(&id).map(|r| Arc::clone(r.value()))
    }

    async fn lock_row(&self, tx: &mut MemoryTx, id: AccountId) -> Result<Money, StoreError> {
        if let Some(guard) = tx.locked.get(&id) {
            return Ok(tx.staged.get(&id).copied().unwrap_or(**guard));
        }

        let row = self.row(id).ok_or(StoreError::NotFound(id))?;
        let guard = row.lock_owned().await;
        let balance = *guard;
        tx.locked.insert(id, guard);
        Ok(balance)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx {
            locked: HashMap::new(),
            staged: HashMap::new(),
        })
    }

    async fn get_account(&self, tx: &mut MemoryTx, id: AccountId) -> Result<Account, StoreError> {
        let balance = self.lock_row(tx, id).await?;
        Ok(Account::new(id, balance))
    }

    async fn update_account(
        &self,
        tx: &mut MemoryTx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError> {
        self.lock_row(tx, id).await?;
        tx.staged.insert(id, balance);
        Ok(())
    }

    async fn commit(&self, mut tx: MemoryTx) -> Result<(), StoreError> {
        for (id, balance) in tx.staged.drain() {
            if let Some(guard) = tx.locked.get_mut(&id) {
                **guard = balance;
            }
        }
        Ok(())
    }

    async fn rollback(&self, _tx: MemoryTx) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn id() -> AccountId {
        AccountId::default()
    }

    fn money(amount: i64) -> Money {
        Money::new(amount).unwrap()
    }

    #[tokio::test]
    async fn test_read_unknown_account() {
        let ledger = InMemoryLedger::new();
        let mut tx = ledger.begin().await.unwrap();

        let result = ledger.get_account(&mut tx, id()).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_commit_persists_write() {
        let ledger = InMemoryLedger::with_account(id(), money(100));

        let mut tx = ledger.begin().await.unwrap();
        ledger.update_account(&mut tx, id(), money(60)).await.unwrap();
        ledger.commit(tx).await.unwrap();

        assert_eq!(ledger.balance(id()).await, Some(money(60)));
    }

    #[tokio::test]
    async fn test_rollback_discards_write() {
        let ledger = InMemoryLedger::with_account(id(), money(100));

        let mut tx = ledger.begin().await.unwrap();
        ledger.update_account(&mut tx, id(), money(60)).await.unwrap();
        ledger.rollback(tx).await.unwrap();

        assert_eq!(ledger.balance(id()).await, Some(money(100)));
    }

    #[tokio::test]
    async fn test_drop_discards_write() {
        let ledger = InMemoryLedger::with_account(id(), money(100));

        {
            let mut tx = ledger.begin().await.unwrap();
            ledger.update_account(&mut tx, id(), money(1)).await.unwrap();
        }

        assert_eq!(ledger.balance(id()).await, Some(money(100)));
    }

    #[tokio::test]
    async fn test_read_your_own_write() {
        let ledger = InMemoryLedger::with_account(id(), money(100));

        let mut tx = ledger.begin().await.unwrap();
        ledger.update_account(&mut tx, id(), money(70)).await.unwrap();
        let account = ledger.get_account(&mut tx, id()).await.unwrap();

        assert_eq!(account.balance, money(70));
    }

    #[tokio::test]
    async fn test_read_locks_row_until_commit() {
        let ledger = Arc::new(InMemoryLedger::with_account(id(), money(100)));

        let mut tx = ledger.begin().await.unwrap();
        ledger.get_account(&mut tx, id()).await.unwrap();

        let contender = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                let mut tx = ledger.begin().await.unwrap();
                let account = ledger.get_account(&mut tx, id()).await.unwrap();
                ledger.rollback(tx).await.unwrap();
                account.balance
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        ledger.update_account(&mut tx, id(), money(10)).await.unwrap();
        ledger.commit(tx).await.unwrap();

        assert_eq!(contender.await.unwrap(), money(10));
    }
}
