//! Account domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money::Money;
use super::role::Role;
use crate::error::DomainError;

/// Identifier of an Account (positive integer primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Creates an AccountId, rejecting zero and negative values.
    pub fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::ValidationError(format!(
                "Account id must be positive, got {}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Returns the underlying integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(1)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::ValidationError(format!("Invalid account id: {}", s)))?;
        Self::new(id)
    }
}

/// A bank account holding a non-negative balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Money,
}

impl Account {
    pub fn new(id: AccountId, balance: Money) -> Self {
        Self { id, balance }
    }

    /// Credits (adds) money to the account.
    pub fn credit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Debits (subtracts) money from the account.
    pub fn debit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    /// Applies a role-conditioned mutation: admins withdraw, clients deposit.
    ///
    /// On error the balance is left untouched.
    pub fn apply(&mut self, role: Role, amount: Money) -> Result<(), DomainError> {
        match role {
            Role::Admin => self.debit(amount),
            Role::Client => self.credit(amount),
        }
    }
}
