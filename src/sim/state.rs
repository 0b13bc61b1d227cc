//! Game session state and core simulation types
//!
//! Everything a run needs lives in [`GameSession`]; nothing is global, so
//! several sessions can run side by side (tests do exactly that).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::depot::{self, Depot, DepotKind};
use super::economy::{Declined, Ledger, UpgradeCategory};
use super::player::{CargoItem, Player};
use super::procgen;
use super::resource::ResourceType;
use super::tile::{TileGrid, TileKind, TilePos};
use crate::consts::TILE_SIZE;
use crate::error::{Error, Result};
use crate::tuning::Tuning;
use crate::world_to_tile;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Hull destroyed
    GameOver,
}

/// Things that happened during a tick, for HUD messages and save points
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    DrillCompleted { pos: TilePos, kind: TileKind },
    DrillCancelled { pos: TilePos },
    Collected(ResourceType),
    /// Resource dropped because the hold was full
    CargoLost { resource: ResourceType, free: u32 },
    Landed { speed: f32, damage: f32 },
    /// Started touching a hazard
    HazardContact,
    OutOfFuel,
    EnteredDepot(DepotKind),
    Sold { earned: u64 },
    Refueled { cost: u64 },
    Repaired { cost: u64 },
    Upgraded { category: UpgradeCategory, tier: u8, cost: u64 },
    Declined(Declined),
    Destroyed { earnings: u64, max_depth: u32 },
    Restarted { seed: u64 },
}

/// Complete state of one run (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// World seed for reproducibility
    pub seed: u64,
    pub grid: TileGrid,
    pub depots: Vec<Depot>,
    pub player: Player,
    pub ledger: Ledger,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Deepest row reached below the surface
    pub max_depth: u32,
    /// Depot the player was parked at after the last tick
    #[serde(default)]
    pub current_depot: Option<DepotKind>,
    /// Events since the last drain (not persisted)
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Generate a world from `seed` and park the player on the surface
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = procgen::generate(
            tuning.world_width,
            tuning.world_height,
            &mut rng,
            &tuning.generation,
        );
        let ledger = Ledger::new(tuning.starting_cash);
        let mut player = Player::new(Self::spawn_point(&grid), ledger.tiers());
        player.grounded = true;

        log::info!("New session with seed {}", seed);

        Self {
            seed,
            depots: depot::layout(grid.width()),
            grid,
            player,
            ledger,
            phase: GamePhase::Playing,
            time_ticks: 0,
            max_depth: 0,
            current_depot: None,
            events: Vec::new(),
        }
    }

    /// Standing on the surface in the middle column
    pub fn spawn_point(grid: &TileGrid) -> Vec2 {
        let col = (grid.width() / 2) as i32;
        Vec2::new(
            crate::tile_center(col, 0).x,
            grid.surface_row() as f32 * TILE_SIZE - crate::consts::PLAYER_HALF_HEIGHT,
        )
    }

    /// Column the spawn point sits in
    pub fn spawn_col(&self) -> i32 {
        (self.grid.width() / 2) as i32
    }

    /// Rows below the surface the player is currently at
    pub fn current_depth(&self) -> u32 {
        self.grid.depth_of_row(world_to_tile(self.player.pos.y))
    }

    pub fn depot(&self, kind: DepotKind) -> Option<&Depot> {
        self.depots.iter().find(|d| d.kind == kind)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check a session read back from storage for impossible states
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(Error::InvalidSnapshot(msg.to_string()))
        }

        if !self.grid.is_consistent() {
            return invalid("grid dimensions or boundary ring are corrupt");
        }
        if !self.ledger.tiers().is_valid() {
            return invalid("upgrade tier out of range");
        }
        let p = &self.player;
        if p.cargo.weight() > p.cargo.capacity() {
            return invalid("cargo heavier than capacity");
        }
        if p.cargo.items().iter().any(|i| *i != CargoItem::of(i.resource)) {
            return invalid("cargo item does not match its resource table");
        }
        // Stats are always the table values for the owned tiers
        let tiers = self.ledger.tiers();
        let stat = |c: UpgradeCategory| c.value_at(tiers.get(c));
        let stats_ok = p.drill_speed == stat(UpgradeCategory::Drill)
            && p.max_hull == stat(UpgradeCategory::Hull)
            && p.max_fuel == stat(UpgradeCategory::FuelTank)
            && p.cargo.capacity() == stat(UpgradeCategory::Cargo) as u32;
        if !stats_ok {
            return invalid("vehicle stats do not match upgrade tiers");
        }
        let meters_ok = p.fuel.is_finite()
            && p.hull.is_finite()
            && (0.0..=p.max_fuel).contains(&p.fuel)
            && (0.0..=p.max_hull).contains(&p.hull);
        if !meters_ok {
            return invalid("fuel or hull outside its range");
        }
        if !(p.pos.is_finite() && p.vel.is_finite()) {
            return invalid("non-finite player position");
        }
        if self.depots.is_empty() {
            return invalid("no depots");
        }
        Ok(())
    }
}
