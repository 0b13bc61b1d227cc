//! Drill state machine
//!
//! `Idle -> Drilling -> Idle`. A drill is started against an adjacent solid,
//! non-boundary tile while the vehicle stands on the ground. Progress builds
//! at `drill_speed` hardness per second and the tile breaks once progress
//! reaches the hardness it had when drilling began. The tile itself is left
//! untouched until then, so a cancelled drill leaves no partial credit unless
//! `keep_partial` is asked for.

use serde::{Deserialize, Serialize};

use super::player::{CargoFull, CargoItem, Player};
use super::resource::ResourceType;
use super::tile::{TileGrid, TileKind, TilePos};
use crate::consts::PROBE_EPSILON;
use crate::{tile_center, world_to_tile};

/// Direction of a drill command. There is no drilling upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrillDir {
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DrillState {
    #[default]
    Idle,
    Drilling {
        target: TilePos,
        dir: DrillDir,
        /// Hardness removed so far
        progress: f32,
        /// Hardness of the target when drilling began
        required: f32,
    },
}

impl DrillState {
    pub fn is_drilling(&self) -> bool {
        matches!(self, DrillState::Drilling { .. })
    }

    /// Completion in [0, 1] (0 when idle)
    pub fn fraction(&self) -> f32 {
        match *self {
            DrillState::Idle => 0.0,
            DrillState::Drilling {
                progress, required, ..
            } => {
                if required <= 0.0 {
                    1.0
                } else {
                    (progress / required).min(1.0)
                }
            }
        }
    }

    /// Seconds a drill of `drill_speed` needs for the current target
    pub fn required_time(&self, drill_speed: f32) -> Option<f32> {
        match *self {
            DrillState::Idle => None,
            DrillState::Drilling { required, .. } => Some(required / drill_speed.max(f32::EPSILON)),
        }
    }
}

/// What happened to a resource vein's contents on breaking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pickup {
    /// The tile held nothing
    Nothing,
    Collected(ResourceType),
    /// Did not fit in the hold and is gone
    Lost(ResourceType, CargoFull),
}

/// Result of advancing the drill one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrillOutcome {
    Idle,
    InProgress,
    Broke {
        target: TilePos,
        kind: TileKind,
        pickup: Pickup,
    },
}

/// Tile the player would drill in `dir`
pub fn target_for(player: &Player, dir: DrillDir) -> TilePos {
    let pos = player.pos;
    let half = player.half_size;
    match dir {
        DrillDir::Down => TilePos::new(
            world_to_tile(pos.x),
            world_to_tile(pos.y + half.y + PROBE_EPSILON),
        ),
        DrillDir::Left => TilePos::new(
            world_to_tile(pos.x - half.x - PROBE_EPSILON),
            world_to_tile(pos.y),
        ),
        DrillDir::Right => TilePos::new(
            world_to_tile(pos.x + half.x + PROBE_EPSILON),
            world_to_tile(pos.y),
        ),
    }
}

/// Begin drilling in `dir`. Returns false if the drill cannot start.
pub fn try_start(player: &mut Player, grid: &TileGrid, dir: DrillDir) -> bool {
    if player.drill.is_drilling() || !player.grounded || !player.has_fuel() {
        return false;
    }
    let target = target_for(player, dir);
    let tile = grid.get(target.x, target.y);
    if !tile.kind.is_drillable() {
        return false;
    }
    player.drill = DrillState::Drilling {
        target,
        dir,
        progress: 0.0,
        required: tile.hardness,
    };
    player.vel = glam::Vec2::ZERO;
    true
}

/// Advance an active drill by `dt`, burning `fuel_per_sec` while it runs
pub fn update(player: &mut Player, grid: &mut TileGrid, dt: f32, fuel_per_sec: f32) -> DrillOutcome {
    let DrillState::Drilling {
        target,
        dir,
        progress,
        required,
    } = player.drill
    else {
        return DrillOutcome::Idle;
    };

    let progress = progress + player.drill_speed * dt;
    player.burn_fuel(fuel_per_sec * dt);
    player.vel = glam::Vec2::ZERO;

    if progress < required {
        player.drill = DrillState::Drilling {
            target,
            dir,
            progress,
            required,
        };
        return DrillOutcome::InProgress;
    }

    player.drill = DrillState::Idle;
    let Some(kind) = grid.break_tile(target.x, target.y) else {
        // Target vanished underneath us; nothing to collect
        return DrillOutcome::Idle;
    };

    let pickup = match kind.resource() {
        None => Pickup::Nothing,
        Some(resource) => match player.cargo.try_push(CargoItem::of(resource)) {
            Ok(()) => Pickup::Collected(resource),
            Err(full) => Pickup::Lost(resource, full),
        },
    };

    // Line up with the cleared cell so the box fits the hole
    player.pos.x = tile_center(target.x, target.y).x;

    DrillOutcome::Broke {
        target,
        kind,
        pickup,
    }
}

/// Abandon an active drill. Progress is discarded unless `keep_partial`,
/// in which case the removed hardness stays off the tile.
pub fn cancel(player: &mut Player, grid: &mut TileGrid, keep_partial: bool) -> Option<TilePos> {
    let DrillState::Drilling {
        target, progress, ..
    } = player.drill
    else {
        return None;
    };
    if keep_partial {
        grid.apply_drill(target.x, target.y, progress);
    }
    player.drill = DrillState::Idle;
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TILE_SIZE;
    use crate::sim::economy::UpgradeTiers;
    use crate::sim::tile::Tile;
    use glam::Vec2;

    /// Player standing on row 10 in column 5 of an open 12x20 grid
    fn setup(tile: Tile) -> (Player, TileGrid) {
        let mut grid = TileGrid::new(12, 20, 10);
        for x in 1..11 {
            grid.set(x, 10, Tile::new(TileKind::SoftMaterial, 1.0));
        }
        grid.set(5, 10, tile);
        let mut player = Player::new(
            Vec2::new(5.5 * TILE_SIZE, 10.0 * TILE_SIZE - 12.0),
            &UpgradeTiers::default(),
        );
        player.grounded = true;
        (player, grid)
    }

    #[test]
    fn test_hardness_four_strength_two_breaks_in_two_ticks() {
        let (mut player, mut grid) = setup(Tile::new(TileKind::SoftMaterial, 4.0));
        player.drill_speed = 2.0;

        assert!(try_start(&mut player, &grid, DrillDir::Down));
        assert_eq!(player.drill.required_time(player.drill_speed), Some(2.0));

        assert_eq!(update(&mut player, &mut grid, 1.0, 0.0), DrillOutcome::InProgress);
        assert_eq!(grid.kind(5, 10), TileKind::SoftMaterial);
        assert_eq!(player.drill.fraction(), 0.5);

        let outcome = update(&mut player, &mut grid, 1.0, 0.0);
        assert_eq!(
            outcome,
            DrillOutcome::Broke {
                target: TilePos::new(5, 10),
                kind: TileKind::SoftMaterial,
                pickup: Pickup::Nothing,
            }
        );
        assert_eq!(grid.get(5, 10), Tile::EMPTY);
        assert_eq!(player.drill, DrillState::Idle);
    }

    #[test]
    fn test_cannot_drill_empty_or_boundary() {
        let (mut player, grid) = setup(Tile::EMPTY);
        assert!(!try_start(&mut player, &grid, DrillDir::Down));

        // Column 1 is next to the boundary column 0
        let (mut player, grid) = setup(Tile::new(TileKind::SoftMaterial, 1.0));
        player.pos.x = TILE_SIZE + 12.0;
        assert_eq!(target_for(&player, DrillDir::Left), TilePos::new(0, 9));
        assert!(!try_start(&mut player, &grid, DrillDir::Left));
        assert!(!player.drill.is_drilling());
    }

    #[test]
    fn test_cannot_drill_midair_or_without_fuel() {
        let (mut player, grid) = setup(Tile::new(TileKind::SoftMaterial, 1.0));
        player.grounded = false;
        assert!(!try_start(&mut player, &grid, DrillDir::Down));

        player.grounded = true;
        player.fuel = 0.0;
        assert!(!try_start(&mut player, &grid, DrillDir::Down));
    }

    #[test]
    fn test_side_drill_needs_wall_contact() {
        let (mut player, mut grid) = setup(Tile::new(TileKind::SoftMaterial, 1.0));
        grid.set(6, 9, Tile::new(TileKind::HardMaterial, 3.0));
        // Centered in column 5: right edge is 4 units from the wall
        assert!(!try_start(&mut player, &grid, DrillDir::Right));
        // Pressed against the wall
        player.pos.x = 6.0 * TILE_SIZE - 12.0;
        assert!(try_start(&mut player, &grid, DrillDir::Right));
        while let DrillOutcome::InProgress = update(&mut player, &mut grid, 0.25, 0.0) {}
        assert_eq!(grid.kind(6, 9), TileKind::Empty);
        assert_eq!(player.pos.x, 6.5 * TILE_SIZE);
    }

    #[test]
    fn test_vein_goes_to_cargo() {
        let vein = TileKind::ResourceVein(ResourceType::Silver);
        let (mut player, mut grid) = setup(Tile::new(vein, 1.0));
        assert!(try_start(&mut player, &grid, DrillDir::Down));
        let outcome = update(&mut player, &mut grid, 1.0, 0.0);
        assert!(matches!(
            outcome,
            DrillOutcome::Broke {
                pickup: Pickup::Collected(ResourceType::Silver),
                ..
            }
        ));
        assert_eq!(player.cargo.weight(), ResourceType::Silver.weight());
    }

    #[test]
    fn test_vein_is_lost_when_hold_is_full() {
        let vein = TileKind::ResourceVein(ResourceType::Iron);
        let (mut player, mut grid) = setup(Tile::new(vein, 1.0));
        for _ in 0..13 {
            player.cargo.try_push(CargoItem::of(ResourceType::Copper)).unwrap();
        }
        assert_eq!(player.cargo.weight(), 65);

        assert!(try_start(&mut player, &grid, DrillDir::Down));
        let outcome = update(&mut player, &mut grid, 1.0, 0.0);
        assert!(matches!(
            outcome,
            DrillOutcome::Broke {
                pickup: Pickup::Lost(ResourceType::Iron, _),
                ..
            }
        ));
        assert_eq!(player.cargo.weight(), 65);
        // The tile is gone regardless
        assert_eq!(grid.kind(5, 10), TileKind::Empty);
    }

    #[test]
    fn test_cancel_discards_progress() {
        let (mut player, mut grid) = setup(Tile::new(TileKind::HardMaterial, 3.0));
        assert!(try_start(&mut player, &grid, DrillDir::Down));
        update(&mut player, &mut grid, 1.0, 0.0);
        assert_eq!(cancel(&mut player, &mut grid, false), Some(TilePos::new(5, 10)));
        assert_eq!(grid.get(5, 10).hardness, 3.0);
        assert_eq!(player.drill, DrillState::Idle);

        // Restarting begins from zero
        assert!(try_start(&mut player, &grid, DrillDir::Down));
        assert_eq!(player.drill.fraction(), 0.0);
    }

    #[test]
    fn test_cancel_can_keep_partial_progress() {
        let (mut player, mut grid) = setup(Tile::new(TileKind::HardMaterial, 3.0));
        assert!(try_start(&mut player, &grid, DrillDir::Down));
        update(&mut player, &mut grid, 1.0, 0.0);
        cancel(&mut player, &mut grid, true);
        assert_eq!(grid.get(5, 10).hardness, 1.0);
        assert_eq!(grid.kind(5, 10), TileKind::HardMaterial);
    }

    #[test]
    fn test_drilling_burns_fuel() {
        let (mut player, mut grid) = setup(Tile::new(TileKind::HardMaterial, 30.0));
        let fuel = player.fuel;
        assert!(try_start(&mut player, &grid, DrillDir::Down));
        update(&mut player, &mut grid, 0.5, 1.0);
        assert!((player.fuel - (fuel - 0.5)).abs() < 1e-6);
    }
}
