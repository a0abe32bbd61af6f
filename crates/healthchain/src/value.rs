//! Native value substrate.
//!
//! The execution environment owns every account's external balance and
//! moves value between identities. The registry consumes it through the
//! [`ValueSubstrate`] trait; [`Accounts`] is the in-memory implementation
//! used by the CLI and the tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::{Identity, NativeValue};

/// Credit/debit primitive between identities.
pub trait ValueSubstrate {
    /// External balance held by `who`. Unknown identities hold zero.
    fn balance_of(&self, who: &Identity) -> NativeValue;

    /// Move `amount` from `from` to `to`.
    ///
    /// Either the whole amount moves or nothing changes.
    fn transfer(&mut self, from: &Identity, to: &Identity, amount: NativeValue) -> Result<()>;

    /// Fail unless `who` holds at least `amount`.
    fn ensure_funds(&self, who: &Identity, amount: NativeValue) -> Result<()> {
        let available = self.balance_of(who);
        if available < amount {
            return Err(RegistryError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        Ok(())
    }
}

/// In-memory account balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    balances: HashMap<Identity, NativeValue>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create value out of thin air for `to` (development faucet).
    pub fn mint(&mut self, to: &Identity, amount: NativeValue) -> Result<NativeValue> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(RegistryError::ValueOverflow)?;
        Ok(*balance)
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> NativeValue {
        self.balances
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v))
    }
}

impl ValueSubstrate for Accounts {
    fn balance_of(&self, who: &Identity) -> NativeValue {
        self.balances.get(who).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Identity, to: &Identity, amount: NativeValue) -> Result<()> {
        if amount == 0 || from == to {
            return self.ensure_funds(from, amount);
        }

        let from_balance = self.balance_of(from);
        let to_balance = self.balance_of(to);

        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(RegistryError::InsufficientFunds {
                needed: amount,
                available: from_balance,
            })?;
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(RegistryError::ValueOverflow)?;

        self.balances.insert(*from, new_from);
        self.balances.insert(*to, new_to);
        Ok(())
    }
}
