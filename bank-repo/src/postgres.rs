//! PostgreSQL ledger adapter.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use bank_types::{Account, AccountId, LedgerStore, Money, StoreError};

use crate::types::{DbAccount, migration_statements};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL ledger with row-level locking.
pub struct PostgresLedger {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for stmt in migration_statements(sql) {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_bank_account_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresLedger {
    /// Creates a new PostgreSQL ledger with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LedgerStore for PostgresLedger {
    /// sqlx queues a `ROLLBACK` when an unfinished transaction is dropped.
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn get_account(&self, tx: &mut Self::Tx, id: AccountId) -> Result<Account, StoreError> {
        // Lock the row with FOR UPDATE; concurrent writers wait until we finish.
        let row: Option<DbAccount> =
            sqlx::query_as(r#"SELECT id, balance FROM bank_account WHERE id = $1 FOR UPDATE"#)
                .bind(id.get())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        row.ok_or(StoreError::NotFound(id))?.into_domain()
    }

    async fn update_account(
        &self,
        tx: &mut Self::Tx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(r#"UPDATE bank_account SET balance = $1 WHERE id = $2"#)
            .bind(balance.amount())
            .bind(id.get())
            .execute(&mut **tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError> {
        tx.rollback()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }
}
