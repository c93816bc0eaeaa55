//! Paid continues
//!
//! A miss suspends the run; the host asks the `ContinueController` whether
//! the player can buy another attempt at the same level. Pricing climbs with
//! each continue bought in the same run.

use serde::{Deserialize, Serialize};

use crate::error::EconomyError;
use crate::settings::Settings;

/// The currency ledger the engine pays from
pub trait Economy {
    fn balance(&self) -> u64;
    fn debit(&mut self, amount: u64) -> Result<(), EconomyError>;
}

/// Check the balance, then debit `amount`. Never retries.
pub fn charge<E: Economy + ?Sized>(economy: &mut E, amount: u64) -> Result<(), EconomyError> {
    let available = economy.balance();
    if available < amount {
        return Err(EconomyError::InsufficientFunds {
            needed: amount,
            available,
        });
    }
    economy.debit(amount)
}

/// Result of one continue negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueOutcome {
    pub accepted: bool,
    pub cost: u64,
}

impl ContinueOutcome {
    pub fn accepted(cost: u64) -> Self {
        Self {
            accepted: true,
            cost,
        }
    }

    pub fn declined(cost: u64) -> Self {
        Self {
            accepted: false,
            cost,
        }
    }
}

/// Prices continues and settles them against an `Economy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueController {
    pub base_cost: u64,
    /// Non-decreasing; the last entry repeats once exhausted
    pub multipliers: Vec<u64>,
}

impl ContinueController {
    pub fn new(base_cost: u64, multipliers: Vec<u64>) -> Self {
        debug_assert!(
            multipliers.windows(2).all(|w| w[0] <= w[1]),
            "continue multipliers must not decrease"
        );
        Self {
            base_cost,
            multipliers,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.continue_base_cost,
            settings.pricing.multipliers().to_vec(),
        )
    }

    /// Price of the continue at `attempt_index` (0 = first in this run)
    pub fn cost_for(&self, attempt_index: u32) -> u64 {
        let multiplier = self
            .multipliers
            .get(attempt_index as usize)
            .or(self.multipliers.last())
            .copied()
            .unwrap_or(1);
        self.base_cost.saturating_mul(multiplier)
    }

    /// Try to buy the continue at `attempt_index` at the current price.
    pub fn request_continue<E: Economy + ?Sized>(
        &self,
        attempt_index: u32,
        economy: &mut E,
    ) -> ContinueOutcome {
        settle_continue(attempt_index, self.cost_for(attempt_index), economy)
    }
}

/// Charge `cost` for the continue at `attempt_index`.
///
/// Declines without touching the economy when the balance is short. A failed
/// debit is final for this attempt.
pub fn settle_continue<E: Economy + ?Sized>(
    attempt_index: u32,
    cost: u64,
    economy: &mut E,
) -> ContinueOutcome {
    match charge(economy, cost) {
        Ok(()) => {
            log::info!("Continue #{} bought for {}", attempt_index + 1, cost);
            ContinueOutcome::accepted(cost)
        }
        Err(EconomyError::InsufficientFunds { available, .. }) => {
            log::info!(
                "Continue #{} declined: costs {}, balance {}",
                attempt_index + 1,
                cost,
                available
            );
            ContinueOutcome::declined(cost)
        }
        Err(err) => {
            log::warn!("Continue #{} debit failed: {}", attempt_index + 1, err);
            ContinueOutcome::declined(cost)
        }
    }
}

impl Default for ContinueController {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// In-memory coin balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }
}

impl Economy for Wallet {
    fn balance(&self) -> u64 {
        self.balance
    }

    fn debit(&mut self, amount: u64) -> Result<(), EconomyError> {
        if amount > self.balance {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}
