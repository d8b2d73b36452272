//! Database row types shared by the SQL adapters.

use sqlx::FromRow;

use bank_types::{Account, AccountId, Money, StoreError};

/// Row of the `bank_account` table.
#[derive(FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub balance: i64,
}

impl DbAccount {
    pub fn into_domain(self) -> Result<Account, StoreError> {
        let id = AccountId::new(self.id)
            .map_err(|e| StoreError::Database(format!("corrupt account row: {}", e)))?;
        let balance = Money::new(self.balance).map_err(|e| {
            StoreError::Database(format!("corrupt balance for account {}: {}", id, e))
        })?;
        Ok(Account::new(id, balance))
    }
}

/// Splits a migration file into statements; the files contain no `;` inside literals.
pub fn migration_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}
