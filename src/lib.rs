//! Deepcore - a deterministic tile-mining simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world grid, drilling, collisions, economy)
//! - `game_loop`: Frame clock and update-then-present cycle
//! - `persistence`: Versioned save/load through a pluggable store
//! - `tuning`: Data-driven game balance
//! - `records`: Best-run leaderboard

pub mod error;
pub mod game_loop;
pub mod persistence;
pub mod records;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use game_loop::{FrameClock, GameLoop, Presenter};
pub use records::Records;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Largest frame delta accepted by the frame clock (avoids tunnelling after a stall)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame; enough to drain one clamped frame
    pub const MAX_SUBSTEPS: u32 = 12;

    /// Edge length of one grid cell in world units
    pub const TILE_SIZE: f32 = 32.0;
    /// Player collision box half extents (smaller than a tile so it fits a dug shaft)
    pub const PLAYER_HALF_WIDTH: f32 = 12.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 12.0;
    /// How far beyond its box the player "touches" hazard tiles
    pub const CONTACT_MARGIN: f32 = 1.0;
    /// Probe distance used for ground and wall tests
    pub const PROBE_EPSILON: f32 = 0.01;
}

/// Tile coordinate containing a world-space coordinate
#[inline]
pub fn world_to_tile(v: f32) -> i32 {
    (v / consts::TILE_SIZE).floor() as i32
}

/// World-space center of a tile
#[inline]
pub fn tile_center(x: i32, y: i32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) * consts::TILE_SIZE,
        (y as f32 + 0.5) * consts::TILE_SIZE,
    )
}
