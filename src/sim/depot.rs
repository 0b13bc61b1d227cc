//! Surface buildings where cargo is sold and the vehicle serviced

use serde::{Deserialize, Serialize};

use super::economy::UpgradeCategory;
use super::player::Player;
use super::tile::TileGrid;
use crate::consts::PROBE_EPSILON;
use crate::world_to_tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepotKind {
    FuelStation,
    /// Buys cargo
    Processor,
    RepairShop,
    UpgradeShop,
}

impl DepotKind {
    pub fn name(&self) -> &'static str {
        match self {
            DepotKind::FuelStation => "Fuel station",
            DepotKind::Processor => "Mineral processor",
            DepotKind::RepairShop => "Repair shop",
            DepotKind::UpgradeShop => "Upgrade shop",
        }
    }
}

/// A depot occupies a span of surface columns (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depot {
    pub kind: DepotKind,
    pub col_start: i32,
    pub col_end: i32,
}

impl Depot {
    pub fn contains_col(&self, col: i32) -> bool {
        (self.col_start..=self.col_end).contains(&col)
    }

    /// World-space x of the depot's middle
    pub fn center_x(&self) -> f32 {
        crate::tile_center((self.col_start + self.col_end) / 2, 0).x
    }
}

/// A request made while parked at a depot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepotAction {
    Refuel,
    SellCargo,
    Repair,
    Upgrade(UpgradeCategory),
}

impl DepotAction {
    /// Which depot serves this action
    pub fn depot_kind(&self) -> DepotKind {
        match self {
            DepotAction::Refuel => DepotKind::FuelStation,
            DepotAction::SellCargo => DepotKind::Processor,
            DepotAction::Repair => DepotKind::RepairShop,
            DepotAction::Upgrade(_) => DepotKind::UpgradeShop,
        }
    }
}

/// Depot placement for a world `width` columns wide: two near each edge,
/// leaving the middle (spawn) column clear
pub fn layout(width: usize) -> Vec<Depot> {
    let w = width as i32;
    vec![
        Depot {
            kind: DepotKind::FuelStation,
            col_start: 2,
            col_end: 4,
        },
        Depot {
            kind: DepotKind::Processor,
            col_start: 6,
            col_end: 8,
        },
        Depot {
            kind: DepotKind::RepairShop,
            col_start: w - 9,
            col_end: w - 7,
        },
        Depot {
            kind: DepotKind::UpgradeShop,
            col_start: w - 5,
            col_end: w - 3,
        },
    ]
}

/// Depot the player is parked at: grounded on the surface row inside its span
pub fn depot_at(depots: &[Depot], player: &Player, grid: &TileGrid) -> Option<DepotKind> {
    if !player.grounded {
        return None;
    }
    let feet_row = world_to_tile(player.pos.y + player.half_size.y + PROBE_EPSILON);
    if feet_row != grid.surface_row() as i32 {
        return None;
    }
    let col = world_to_tile(player.pos.x);
    depots
        .iter()
        .find(|d| d.contains_col(col))
        .map(|d| d.kind)
}
