//! Deposit ledger: per-identity accumulated deposit value.
//!
//! The ledger is credit-only and independent of registry membership. A
//! balance entry appears on first deposit and is never removed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::{Identity, NativeValue};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<Identity, NativeValue>,
    total: NativeValue,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `who`; zero if it never deposited.
    pub fn balance_of(&self, who: &Identity) -> NativeValue {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Sum of every deposit ever made.
    pub fn total_deposits(&self) -> NativeValue {
        self.total
    }

    /// Number of identities holding a balance entry.
    pub fn accounts(&self) -> usize {
        self.balances.len()
    }

    /// Fail with `ValueOverflow` if crediting `amount` to `who` would overflow.
    pub fn check_credit(&self, who: &Identity, amount: NativeValue) -> Result<()> {
        self.balance_of(who)
            .checked_add(amount)
            .ok_or(RegistryError::ValueOverflow)?;
        self.total
            .checked_add(amount)
            .ok_or(RegistryError::ValueOverflow)?;
        Ok(())
    }

    /// Credit `amount` to `who`, returning the new balance.
    pub fn credit(&mut self, who: &Identity, amount: NativeValue) -> Result<NativeValue> {
        self.check_credit(who, amount)?;
        let balance = self.balances.entry(*who).or_insert(0);
        *balance += amount;
        self.total += amount;
        Ok(*balance)
    }
}
