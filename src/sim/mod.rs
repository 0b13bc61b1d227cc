//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (world generation)
//! - Row-major iteration over the grid
//! - No rendering, platform or storage dependencies

pub mod autopilot;
pub mod collision;
pub mod depot;
pub mod drill;
pub mod economy;
pub mod player;
pub mod procgen;
pub mod resource;
pub mod state;
pub mod tick;
pub mod tile;

pub use collision::{Contact, Resolved, fall_damage, resolve};
pub use depot::{Depot, DepotAction, DepotKind};
pub use drill::{DrillDir, DrillOutcome, DrillState, Pickup};
pub use economy::{Declined, Ledger, UpgradeCategory, UpgradeTiers};
pub use player::{Cargo, CargoFull, CargoItem, Player};
pub use procgen::GenParams;
pub use resource::ResourceType;
pub use state::{GameEvent, GamePhase, GameSession};
pub use tick::{TickInput, next_seed, tick};
pub use tile::{Tile, TileGrid, TileKind, TilePos};
