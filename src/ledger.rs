//! Prepaid loyalty-card ledger boundary. The engine never owns balances; it
//! asks this trait to move money and treats every call as independently
//! atomic. Cashback is tracked as its own auditable entries so a cancellation
//! can claw back exactly what a confirmation credited.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use ulid::Ulid;

use crate::model::Money;

#[derive(Debug)]
pub enum LedgerError {
    InsufficientFunds { balance: Money, required: Money },
    UnknownAccount(Ulid),
    Unavailable(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InsufficientFunds { balance, required } => {
                write!(f, "insufficient funds: balance {balance}, required {required}")
            }
            LedgerError::UnknownAccount(id) => write!(f, "unknown account: {id}"),
            LedgerError::Unavailable(e) => write!(f, "ledger unavailable: {e}"),
        }
    }
}

impl std::error::Error for LedgerError {}

#[async_trait]
pub trait LoyaltyLedger: Send + Sync {
    async fn balance(&self, user_id: Ulid) -> Result<Money, LedgerError>;

    /// Debit `amount` from the prepaid balance. Fails with
    /// `InsufficientFunds` rather than letting the balance go negative.
    /// Returns the new balance.
    async fn debit(&self, user_id: Ulid, amount: Money, reason: &str) -> Result<Money, LedgerError>;

    /// Credit `amount` to the prepaid balance. Returns the new balance.
    async fn credit(&self, user_id: Ulid, amount: Money, reason: &str)
    -> Result<Money, LedgerError>;

    /// Credit earned cashback: raises both the balance and the lifetime
    /// earned counter.
    async fn credit_cashback(&self, user_id: Ulid, amount: Money) -> Result<(), LedgerError>;

    /// Claw back previously credited cashback.
    async fn debit_cashback(&self, user_id: Ulid, amount: Money) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Account {
    balance: Money,
    lifetime_cashback: Money,
}

/// Reference ledger used by the test suite and by embedders that keep
/// balances in process.
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: DashMap<Ulid, Account>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    pub fn open_account(&self, user_id: Ulid, balance: Money) {
        self.accounts.insert(
            user_id,
            Account {
                balance,
                lifetime_cashback: 0,
            },
        );
    }

    pub fn lifetime_cashback(&self, user_id: Ulid) -> Money {
        self.accounts
            .get(&user_id)
            .map(|a| a.lifetime_cashback)
            .unwrap_or(0)
    }
}

#[async_trait]
impl LoyaltyLedger for InMemoryLedger {
    async fn balance(&self, user_id: Ulid) -> Result<Money, LedgerError> {
        self.accounts
            .get(&user_id)
            .map(|a| a.balance)
            .ok_or(LedgerError::UnknownAccount(user_id))
    }

    async fn debit(&self, user_id: Ulid, amount: Money, reason: &str) -> Result<Money, LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        if account.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                balance: account.balance,
                required: amount,
            });
        }
        account.balance -= amount;
        debug!(user = %user_id, amount, reason, "ledger debit");
        Ok(account.balance)
    }

    async fn credit(
        &self,
        user_id: Ulid,
        amount: Money,
        reason: &str,
    ) -> Result<Money, LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        account.balance += amount;
        debug!(user = %user_id, amount, reason, "ledger credit");
        Ok(account.balance)
    }

    async fn credit_cashback(&self, user_id: Ulid, amount: Money) -> Result<(), LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        account.balance += amount;
        account.lifetime_cashback += amount;
        debug!(user = %user_id, amount, "cashback credit");
        Ok(())
    }

    async fn debit_cashback(&self, user_id: Ulid, amount: Money) -> Result<(), LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        account.balance -= amount;
        // Lifetime earned can only shrink by what still stands credited.
        account.lifetime_cashback = account.lifetime_cashback.saturating_sub(amount).max(0);
        debug!(user = %user_id, amount, "cashback clawback");
        Ok(())
    }
}
