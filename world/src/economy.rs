//! Player cash and lives plus the tower price formulas.

use critter_defence_core::{config::PlayerConfig, MAX_CASH};

/// Cash balance and remaining lives of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Economy {
    cash: u32,
    lives: u32,
}

impl Economy {
    /// Creates an economy holding the configured starting resources.
    pub(crate) fn new(config: &PlayerConfig) -> Self {
        Self {
            cash: config.starting_cash.min(MAX_CASH),
            lives: config.starting_lives,
        }
    }

    pub(crate) const fn cash(&self) -> u32 {
        self.cash
    }

    pub(crate) const fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) const fn can_afford(&self, amount: u32) -> bool {
        self.cash >= amount
    }

    /// Whether the balance covers the unrounded upgrade cost `price / 1.5`.
    pub(crate) const fn can_afford_upgrade(&self, price: u32) -> bool {
        self.cash as u64 * 3 >= price as u64 * 2
    }

    /// Adds cash, saturating at [`MAX_CASH`].
    pub(crate) fn credit(&mut self, amount: u32) {
        self.cash = self.cash.saturating_add(amount).min(MAX_CASH);
    }

    /// Removes cash if the balance covers it, returning whether it did.
    pub(crate) fn debit(&mut self, amount: u32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.cash -= amount;
        true
    }

    /// Removes one life and returns the lives left.
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

/// Cash charged to upgrade a tower with the provided accumulated price.
///
/// Equals `floor(price / 1.5)`. Affordability is checked against the
/// unrounded fraction, see [`Economy::can_afford_upgrade`].
pub(crate) const fn upgrade_cost(price: u32) -> u32 {
    price.saturating_mul(2) / 3
}

/// Cash refunded when selling a tower with the provided accumulated price.
///
/// Equals `floor(price * 0.75)`.
pub(crate) const fn sell_price(price: u32) -> u32 {
    price.saturating_mul(3) / 4
}
