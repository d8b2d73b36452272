//! Balance Mutation Service
//!
//! Runs one role-conditioned balance mutation as a single unit of work:
//! validate, lock-and-read, apply, write, commit.

use uuid::Uuid;

use bank_types::{
    Account, AccountId, DomainError, LedgerStore, Money, MutationError, MutationRequest, Role,
};

/// Application service for balance mutations.
///
/// Generic over `S: LedgerStore` - the adapter is injected at compile time.
/// The service is bound to one account id for its whole lifetime.
pub struct BalanceService<S: LedgerStore> {
    store: S,
    account_id: AccountId,
}

impl<S: LedgerStore> BalanceService<S> {
    /// Creates a service operating on the default account (id 1).
    pub fn new(store: S) -> Self {
        Self::with_account(store, AccountId::default())
    }

    /// Creates a service operating on the given account.
    pub fn with_account(store: S, account_id: AccountId) -> Self {
        Self { store, account_id }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies a role-conditioned mutation to the account balance.
    ///
    /// `admin` withdraws `req.amount`, `client` deposits it. Validation and
    /// role checks run before the store is touched. Once a transaction is
    /// open, every exit path either commits or rolls it back; if this future
    /// is dropped half-way, the store rolls back the abandoned handle.
    ///
    /// Each call runs in its own span with a fresh `mutation_id`.
    #[tracing::instrument(
        name = "apply_mutation",
        skip_all,
        fields(
            mutation_id = %Uuid::new_v4(),
            account_id = %self.account_id,
            amount = req.amount,
            role = role_claim,
        )
    )]
    pub async fn apply_mutation(
        &self,
        req: MutationRequest,
        role_claim: &str,
    ) -> Result<Account, MutationError> {
        let amount = Money::new(req.amount).map_err(|e| {
            tracing::info!("Invalid request: negative values are not allowed");
            MutationError::from(e)
        })?;

        let role: Role = role_claim.parse().map_err(|e: DomainError| {
            tracing::warn!("Access denied");
            MutationError::from(e)
        })?;

        let mut tx = self.store.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin transaction");
            MutationError::from(e)
        })?;

        let mut account = match self.store.get_account(&mut tx, self.account_id).await {
            Ok(account) => account,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read account");
                return Err(self.abort(tx, e.into()).await);
            }
        };

        let previous = account.balance;
        if let Err(e) = account.apply(role, amount) {
            match &e {
                DomainError::InsufficientFunds { .. } => tracing::warn!(
                    attempted = amount.amount(),
                    balance = previous.amount(),
                    "Insufficient funds"
                ),
                other => tracing::warn!(error = %other, "Mutation rejected"),
            }
            return Err(self.abort(tx, e.into()).await);
        }

        if let Err(e) = self
            .store
            .update_account(&mut tx, self.account_id, account.balance)
            .await
        {
            tracing::error!(error = %e, "Failed to update account");
            return Err(self.abort(tx, e.into()).await);
        }

        // A failed commit has already ended the transaction; no rollback here.
        self.store.commit(tx).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to commit transaction");
            MutationError::from(e)
        })?;

        tracing::info!(
            previous_balance = previous.amount(),
            new_balance = account.balance.amount(),
            "Transaction successful"
        );
        Ok(account)
    }

    /// Rolls back and returns the error that caused it. Rollback failures are
    /// logged only: the original error already decides the outcome.
    async fn abort(&self, tx: S::Tx, err: MutationError) -> MutationError {
        if let Err(e) = self.store.rollback(tx).await {
            tracing::error!(error = %e, "Failed to roll back transaction");
        }
        err
    }
}
