//! SQLite ledger adapter.
//!
//! SQLite has no row locks, so every transaction is opened with
//! `BEGIN IMMEDIATE`: the write lock is taken up front and concurrent
//! mutations queue behind it (bounded by the busy timeout).
#![allow(clippy::collapsible_if)]

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use bank_types::{Account, AccountId, LedgerStore, Money, StoreError};

use crate::types::{DbAccount, migration_statements};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite ledger implementation.
pub struct SqliteLedger {
    pool: SqlitePool,
}

/// Transaction handle for [`SqliteLedger`]: a pooled connection inside `BEGIN IMMEDIATE`.
pub struct SqliteTx {
    conn: Option<PoolConnection<Sqlite>>,
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteLedger {
    /// Creates a new SQLite ledger with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if !is_in_memory(path) {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        let ledger = Self { pool };
        ledger.create_schema().await?;
        Ok(ledger)
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = include_str!("../migrations/0001_create_bank_account.sql");
        for stmt in migration_statements(ddl) {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

impl SqliteTx {
    fn conn(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| StoreError::Transaction("transaction already finished".into()))
    }

    async fn finish(mut self, stmt: &'static str) -> Result<(), StoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Err(StoreError::Transaction("transaction already finished".into()));
        };

        if let Err(e) = sqlx::query(stmt).execute(&mut *conn).await {
            // A failed COMMIT can leave SQLite inside the transaction.
            if let Err(rb) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                tracing::debug!(error = %rb, "closing sqlite connection after failed {}", stmt);
                drop(conn.detach());
            }
            return Err(StoreError::Transaction(e.to_string()));
        }
        Ok(())
    }
}

impl Drop for SqliteTx {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };

        // Abandoned mid-flight (e.g. the request was cancelled): roll back before
        // the connection goes back to the pool. Without a runtime, close it instead.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                        tracing::warn!(error = %e, "rollback of abandoned sqlite transaction failed");
                        drop(conn.detach());
                    }
                });
            }
            Err(_) => drop(conn.detach()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LedgerStore for SqliteLedger {
    type Tx = SqliteTx;

    async fn begin(&self) -> Result<SqliteTx, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        Ok(SqliteTx { conn: Some(conn) })
    }

    async fn get_account(&self, tx: &mut SqliteTx, id: AccountId) -> Result<Account, StoreError> {
        let row: Option<DbAccount> =
            sqlx::query_as(r#"SELECT id, balance FROM bank_account WHERE id = ?"#)
                .bind(id.get())
                .fetch_optional(tx.conn()?)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        row.ok_or(StoreError::NotFound(id))?.into_domain()
    }

    async fn update_account(
        &self,
        tx: &mut SqliteTx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(r#"UPDATE bank_account SET balance = ? WHERE id = ?"#)
            .bind(balance.amount())
            .bind(id.get())
            .execute(tx.conn()?)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn commit(&self, tx: SqliteTx) -> Result<(), StoreError> {
        tx.finish("COMMIT").await
    }

    async fn rollback(&self, tx: SqliteTx) -> Result<(), StoreError> {
        tx.finish("ROLLBACK").await
    }
}
