//! Cash, upgrade tiers and depot transactions
//!
//! Every transaction is all-or-nothing: on `Err` neither the ledger nor the
//! player has changed. Refusals are expected during play and are plain values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::Player;

/// Something the upgrade shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeCategory {
    Drill,
    Hull,
    FuelTank,
    Cargo,
}

const DRILL_SPEEDS: [f32; 5] = [2.0, 2.8, 4.0, 5.5, 7.5];
const HULL_POINTS: [f32; 5] = [30.0, 50.0, 80.0, 120.0, 180.0];
const FUEL_TANKS: [f32; 5] = [10.0, 15.0, 25.0, 40.0, 60.0];
const CARGO_BAYS: [f32; 5] = [70.0, 100.0, 150.0, 220.0, 300.0];

// Price to go from tier i to tier i + 1
const DRILL_PRICES: [u64; 4] = [150, 400, 1000, 2500];
const HULL_PRICES: [u64; 4] = [200, 500, 1200, 3000];
const FUEL_PRICES: [u64; 4] = [100, 300, 800, 2000];
const CARGO_PRICES: [u64; 4] = [150, 450, 1100, 2800];

impl UpgradeCategory {
    pub const ALL: [UpgradeCategory; 4] = [
        UpgradeCategory::Drill,
        UpgradeCategory::Hull,
        UpgradeCategory::FuelTank,
        UpgradeCategory::Cargo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeCategory::Drill => "Drill",
            UpgradeCategory::Hull => "Hull",
            UpgradeCategory::FuelTank => "Fuel tank",
            UpgradeCategory::Cargo => "Cargo bay",
        }
    }

    fn values(&self) -> &'static [f32] {
        match self {
            UpgradeCategory::Drill => &DRILL_SPEEDS,
            UpgradeCategory::Hull => &HULL_POINTS,
            UpgradeCategory::FuelTank => &FUEL_TANKS,
            UpgradeCategory::Cargo => &CARGO_BAYS,
        }
    }

    fn prices(&self) -> &'static [u64] {
        match self {
            UpgradeCategory::Drill => &DRILL_PRICES,
            UpgradeCategory::Hull => &HULL_PRICES,
            UpgradeCategory::FuelTank => &FUEL_PRICES,
            UpgradeCategory::Cargo => &CARGO_PRICES,
        }
    }

    pub fn max_tier(&self) -> u8 {
        (self.values().len() - 1) as u8
    }

    /// Stat value at a tier (clamped to the table)
    pub fn value_at(&self, tier: u8) -> f32 {
        let values = self.values();
        values[(tier as usize).min(values.len() - 1)]
    }

    /// Price of the next tier when currently at `tier`, `None` once maxed
    pub fn price_at(&self, tier: u8) -> Option<u64> {
        self.prices().get(tier as usize).copied()
    }
}

/// Current tier per category. Tiers only go up and never pass the table end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeTiers {
    drill: u8,
    hull: u8,
    fuel_tank: u8,
    cargo: u8,
}

impl UpgradeTiers {
    pub fn get(&self, category: UpgradeCategory) -> u8 {
        match category {
            UpgradeCategory::Drill => self.drill,
            UpgradeCategory::Hull => self.hull,
            UpgradeCategory::FuelTank => self.fuel_tank,
            UpgradeCategory::Cargo => self.cargo,
        }
    }

    fn slot(&mut self, category: UpgradeCategory) -> &mut u8 {
        match category {
            UpgradeCategory::Drill => &mut self.drill,
            UpgradeCategory::Hull => &mut self.hull,
            UpgradeCategory::FuelTank => &mut self.fuel_tank,
            UpgradeCategory::Cargo => &mut self.cargo,
        }
    }

    /// Advance one tier. Returns the new tier, or `None` if already maxed.
    fn advance(&mut self, category: UpgradeCategory) -> Option<u8> {
        let slot = self.slot(category);
        if *slot >= category.max_tier() {
            return None;
        }
        *slot += 1;
        Some(*slot)
    }

    /// All tiers inside their tables
    pub fn is_valid(&self) -> bool {
        UpgradeCategory::ALL
            .iter()
            .all(|c| self.get(*c) <= c.max_tier())
    }
}

/// Why a depot transaction did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declined {
    InsufficientFunds { cost: u64, cash: u64 },
    MaxTier(UpgradeCategory),
    /// Tank already full, hull intact, or hold empty
    NothingToDo,
    /// Action requested away from the matching depot
    NotAtDepot,
}

impl fmt::Display for Declined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declined::InsufficientFunds { cost, cash } => {
                write!(f, "not enough cash: need ${cost}, have ${cash}")
            }
            Declined::MaxTier(category) => write!(f, "{} is fully upgraded", category.name()),
            Declined::NothingToDo => write!(f, "nothing to do"),
            Declined::NotAtDepot => write!(f, "not at the right depot"),
        }
    }
}

/// The player's money and purchased upgrades
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    cash: u64,
    tiers: UpgradeTiers,
    /// Everything ever earned from sales
    lifetime_earnings: u64,
}

impl Ledger {
    pub fn new(cash: u64) -> Self {
        Self {
            cash,
            ..Default::default()
        }
    }

    pub fn cash(&self) -> u64 {
        self.cash
    }

    pub fn tiers(&self) -> &UpgradeTiers {
        &self.tiers
    }

    pub fn lifetime_earnings(&self) -> u64 {
        self.lifetime_earnings
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.cash >= cost
    }

    fn spend(&mut self, cost: u64) -> Result<(), Declined> {
        if !self.can_afford(cost) {
            return Err(Declined::InsufficientFunds {
                cost,
                cash: self.cash,
            });
        }
        self.cash -= cost;
        Ok(())
    }

    /// Price of filling the tank
    pub fn refuel_cost(player: &Player, unit_cost: f32) -> u64 {
        ((player.max_fuel - player.fuel).max(0.0) * unit_cost).ceil() as u64
    }

    /// Price of a full repair
    pub fn repair_cost(player: &Player, unit_cost: f32) -> u64 {
        ((player.max_hull - player.hull).max(0.0) * unit_cost).ceil() as u64
    }

    /// Fill the tank. Returns the amount paid.
    pub fn refuel(&mut self, player: &mut Player, unit_cost: f32) -> Result<u64, Declined> {
        if player.fuel >= player.max_fuel {
            return Err(Declined::NothingToDo);
        }
        let cost = Self::refuel_cost(player, unit_cost);
        self.spend(cost)?;
        player.fuel = player.max_fuel;
        log::debug!("Refuelled for ${}", cost);
        Ok(cost)
    }

    /// Sell the whole hold. Returns the amount earned.
    pub fn sell_cargo(&mut self, player: &mut Player) -> Result<u64, Declined> {
        if player.cargo.is_empty() {
            return Err(Declined::NothingToDo);
        }
        let earned = player.cargo.total_value();
        player.cargo.take_all();
        self.cash = self.cash.saturating_add(earned);
        self.lifetime_earnings = self.lifetime_earnings.saturating_add(earned);
        log::debug!("Sold cargo for ${}", earned);
        Ok(earned)
    }

    /// Restore the hull. Returns the amount paid.
    pub fn repair_hull(&mut self, player: &mut Player, unit_cost: f32) -> Result<u64, Declined> {
        if player.hull >= player.max_hull {
            return Err(Declined::NothingToDo);
        }
        let cost = Self::repair_cost(player, unit_cost);
        self.spend(cost)?;
        player.hull = player.max_hull;
        log::debug!("Repaired hull for ${}", cost);
        Ok(cost)
    }

    /// Buy the next tier in `category` and apply it to the player.
    /// Returns the amount paid.
    pub fn buy_upgrade(
        &mut self,
        player: &mut Player,
        category: UpgradeCategory,
    ) -> Result<u64, Declined> {
        let tier = self.tiers.get(category);
        let price = category
            .price_at(tier)
            .ok_or(Declined::MaxTier(category))?;
        self.spend(price)?;
        // price_at returned Some, so the table has room for one more tier
        let new_tier = self.tiers.advance(category).unwrap_or(tier);
        player.apply_upgrade(category, new_tier);
        log::debug!("Bought {} tier {} for ${}", category.name(), new_tier, price);
        Ok(price)
    }

    /// Cheapest upgrade currently affordable
    pub fn cheapest_affordable_upgrade(&self) -> Option<(UpgradeCategory, u64)> {
        UpgradeCategory::ALL
            .iter()
            .filter_map(|c| c.price_at(self.tiers.get(*c)).map(|p| (*c, p)))
            .filter(|(_, p)| self.can_afford(*p))
            .min_by_key(|(_, p)| *p)
    }
}
