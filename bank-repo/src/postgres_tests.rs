//! PostgreSQL ledger integration tests.
//!
//! These need a live server and are ignored by default:
//! `DATABASE_URL=postgres://... cargo test -p bank-repo --features postgres -- --ignored`

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use sqlx::PgPool;

    use bank_types::{AccountId, LedgerStore, Money, StoreError};

    use crate::PostgresLedger;

    fn database_url() -> String {
        std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a PostgreSQL database")
    }

    async fn setup_ledger() -> PostgresLedger {
        PostgresLedger::new(&database_url()).await.unwrap()
    }

    /// Per-process row id so parallel tests and repeated runs do not collide.
    fn fixture_id(offset: i64) -> AccountId {
        AccountId::new(1_000_000 + i64::from(std::process::id()) * 10 + offset).unwrap()
    }

    async fn open_account(id: AccountId, balance: i64) {
        let pool = PgPool::connect(&database_url()).await.unwrap();
        sqlx::query(
            r#"INSERT INTO bank_account (id, balance) VALUES ($1, $2)
               ON CONFLICT (id) DO UPDATE SET balance = EXCLUDED.balance"#,
        )
        .bind(id.get())
        .bind(balance)
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    fn money(amount: i64) -> Money {
        Money::new(amount).unwrap()
    }

    async fn committed_balance(ledger: &PostgresLedger, id: AccountId) -> Money {
        let mut tx = ledger.begin().await.unwrap();
        let account = ledger.get_account(&mut tx, id).await.unwrap();
        ledger.rollback(tx).await.unwrap();
        account.balance
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_migration_seeds_default_account() {
        let ledger = setup_ledger().await;

        let mut tx = ledger.begin().await.unwrap();
        let result = ledger.get_account(&mut tx, AccountId::default()).await;
        ledger.rollback(tx).await.unwrap();

        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_commit_persists_and_rollback_discards() {
        let ledger = setup_ledger().await;
        let id = fixture_id(1);
        open_account(id, 10_000).await;

        let mut tx = ledger.begin().await.unwrap();
        ledger.update_account(&mut tx, id, money(6_000)).await.unwrap();
        ledger.commit(tx).await.unwrap();
        assert_eq!(committed_balance(&ledger, id).await, money(6_000));

        let mut tx = ledger.begin().await.unwrap();
        ledger.update_account(&mut tx, id, money(1)).await.unwrap();
        ledger.rollback(tx).await.unwrap();
        assert_eq!(committed_balance(&ledger, id).await, money(6_000));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_dropped_transaction_is_rolled_back() {
        let ledger = setup_ledger().await;
        let id = fixture_id(2);
        open_account(id, 10_000).await;

        {
            let mut tx = ledger.begin().await.unwrap();
            ledger.get_account(&mut tx, id).await.unwrap();
            ledger.update_account(&mut tx, id, money(1)).await.unwrap();
        }

        // The read below waits on the row lock until the queued ROLLBACK ran.
        assert_eq!(committed_balance(&ledger, id).await, money(10_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_read_for_update_serializes_writers() {
        let ledger = Arc::new(setup_ledger().await);
        let id = fixture_id(3);
        open_account(id, 100).await;

        let mut first = ledger.begin().await.unwrap();
        let account = ledger.get_account(&mut first, id).await.unwrap();

        let second = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                let mut tx = ledger.begin().await.unwrap();
                let account = ledger.get_account(&mut tx, id).await.unwrap();
                ledger.rollback(tx).await.unwrap();
                account.balance
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!second.is_finished());

        let new_balance = account.balance.checked_sub(money(60)).unwrap();
        ledger.update_account(&mut first, id, new_balance).await.unwrap();
        ledger.commit(first).await.unwrap();

        assert_eq!(second.await.unwrap(), money(40));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_unknown_account() {
        let ledger = setup_ledger().await;
        let missing = AccountId::new(i64::MAX).unwrap();

        let mut tx = ledger.begin().await.unwrap();
        let read = ledger.get_account(&mut tx, missing).await;
        let write = ledger.update_account(&mut tx, missing, money(1)).await;
        ledger.rollback(tx).await.unwrap();

        assert!(matches!(read, Err(StoreError::NotFound(found)) if found == missing));
        assert!(matches!(write, Err(StoreError::NotFound(_))));
    }
}
