//! The mining vehicle and its cargo hold

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::drill::DrillState;
use super::economy::{UpgradeCategory, UpgradeTiers};
use super::resource::ResourceType;
use crate::consts::{PLAYER_HALF_HEIGHT, PLAYER_HALF_WIDTH};

/// One unit of mined resource sitting in the hold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CargoItem {
    pub resource: ResourceType,
    pub weight: u32,
    pub value: u64,
}

impl CargoItem {
    pub fn of(resource: ResourceType) -> Self {
        Self {
            resource,
            weight: resource.weight(),
            value: resource.value(),
        }
    }
}

/// A pickup did not fit; nothing was added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoFull {
    pub needed: u32,
    pub free: u32,
}

impl fmt::Display for CargoFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cargo full: need {} space, {} free", self.needed, self.free)
    }
}

/// Ordered cargo hold. Total weight never exceeds capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    items: Vec<CargoItem>,
    capacity: u32,
}

impl Cargo {
    pub fn new(capacity: u32) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn items(&self) -> &[CargoItem] {
        &self.items
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total load (saturates rather than wrapping on corrupt data)
    pub fn weight(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.weight))
    }

    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.weight())
    }

    pub fn total_value(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(i.value))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add an item if it fits whole; a pickup is never truncated
    pub fn try_push(&mut self, item: CargoItem) -> Result<(), CargoFull> {
        let free = self.free_space();
        let fits = self
            .weight()
            .checked_add(item.weight)
            .is_some_and(|w| w <= self.capacity);
        if !fits {
            return Err(CargoFull {
                needed: item.weight,
                free,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Empty the hold, returning what was in it
    pub fn take_all(&mut self) -> Vec<CargoItem> {
        std::mem::take(&mut self.items)
    }

    /// Capacity only grows (upgrades); shrinking below the load is refused
    pub(crate) fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity.max(self.weight());
    }
}

fn default_half_size() -> Vec2 {
    Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT)
}

/// The player's mining vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center of the collision box (world units, y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision box half extents (fixed, not saved)
    #[serde(skip, default = "default_half_size")]
    pub half_size: Vec2,
    pub fuel: f32,
    pub max_fuel: f32,
    pub hull: f32,
    pub max_hull: f32,
    /// Hardness removed per second
    pub drill_speed: f32,
    pub cargo: Cargo,
    pub drill: DrillState,
    pub grounded: bool,
    /// Was touching a hazard last tick (edge-triggers the contact event)
    #[serde(default)]
    pub touching_hazard: bool,
}

impl Player {
    /// Fresh vehicle at `pos` with stats for the given upgrade tiers, fully fuelled and repaired
    pub fn new(pos: Vec2, tiers: &UpgradeTiers) -> Self {
        let max_fuel = UpgradeCategory::FuelTank.value_at(tiers.get(UpgradeCategory::FuelTank));
        let max_hull = UpgradeCategory::Hull.value_at(tiers.get(UpgradeCategory::Hull));
        let capacity = UpgradeCategory::Cargo.value_at(tiers.get(UpgradeCategory::Cargo));
        Self {
            pos,
            vel: Vec2::ZERO,
            half_size: default_half_size(),
            fuel: max_fuel,
            max_fuel,
            hull: max_hull,
            max_hull,
            drill_speed: UpgradeCategory::Drill.value_at(tiers.get(UpgradeCategory::Drill)),
            cargo: Cargo::new(capacity as u32),
            drill: DrillState::Idle,
            grounded: false,
            touching_hazard: false,
        }
    }

    /// Re-derive the stat for `category` from its table at `tier`.
    /// Bigger tanks and hulls keep the current shortfall.
    pub fn apply_upgrade(&mut self, category: UpgradeCategory, tier: u8) {
        let value = category.value_at(tier);
        match category {
            UpgradeCategory::Drill => self.drill_speed = value,
            UpgradeCategory::Hull => {
                let delta = (value - self.max_hull).max(0.0);
                self.max_hull = value;
                self.hull = (self.hull + delta).min(value);
            }
            UpgradeCategory::FuelTank => {
                let delta = (value - self.max_fuel).max(0.0);
                self.max_fuel = value;
                self.fuel = (self.fuel + delta).min(value);
            }
            UpgradeCategory::Cargo => self.cargo.set_capacity(value as u32),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hull <= 0.0
    }

    pub fn has_fuel(&self) -> bool {
        self.fuel > 0.0
    }

    /// Burn fuel, never below zero. Returns true if this emptied the tank.
    pub fn burn_fuel(&mut self, amount: f32) -> bool {
        if amount <= 0.0 || self.fuel <= 0.0 {
            return false;
        }
        self.fuel = (self.fuel - amount).max(0.0);
        self.fuel == 0.0
    }

    /// Apply hull damage, never below zero
    pub fn damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.hull = (self.hull - amount).max(0.0);
        }
    }
}
