//! Autopilot for demo runs and long soak tests
//!
//! Digs one straight shaft below the spawn column. Goes back up when the hold
//! is nearly full or fuel/hull run low, then works through the depots: sell,
//! refuel, repair, cheapest affordable upgrade, and back down the shaft.

use super::depot::{DepotAction, DepotKind};
use super::drill::DrillDir;
use super::economy::Ledger;
use super::state::{GamePhase, GameSession};
use super::tick::TickInput;
use super::tile::TileKind;
use crate::consts::{PROBE_EPSILON, SIM_DT, TILE_SIZE};
use crate::tuning::Tuning;
use crate::{tile_center, world_to_tile};

/// Head home when less than this much cargo space is left
const RETURN_FREE_SPACE: u32 = 25;
/// Fuel reserve kept for the climb: base plus per row of depth
const RETURN_FUEL_BASE: f32 = 2.0;
const RETURN_FUEL_PER_ROW: f32 = 0.1;
/// Head home below this fraction of hull
const RETURN_HULL_FRACTION: f32 = 0.4;
/// Brake falls above this fraction of the fall damage threshold
const BRAKE_FRACTION: f32 = 0.9;

/// Choose the controls for the next frame
pub fn plan(session: &GameSession, tuning: &Tuning) -> TickInput {
    if session.phase != GamePhase::Playing {
        return TickInput::default();
    }

    let player = &session.player;
    let on_surface = world_to_tile(player.pos.y) < session.grid.surface_row() as i32;

    let mut input = if on_surface {
        surface_plan(session, tuning)
    } else {
        underground_plan(session)
    };

    if !player.grounded && player.vel.y > BRAKE_FRACTION * tuning.fall_damage_threshold {
        input.thrust = true;
    }
    input
}

fn surface_plan(session: &GameSession, tuning: &Tuning) -> TickInput {
    let player = &session.player;
    let shaft_x = tile_center(session.spawn_col(), 0).x;

    let Some((kind, action)) = next_errand(session, tuning) else {
        // Nothing to do up here; line up over the shaft and dig
        let move_x = steer(player.pos.x, shaft_x, tuning);
        return TickInput {
            move_x,
            drill: (move_x == 0.0).then_some(DrillDir::Down),
            ..Default::default()
        };
    };

    if session.current_depot == Some(kind) {
        return TickInput {
            action: Some(action),
            ..Default::default()
        };
    }

    let Some(depot) = session.depot(kind) else {
        return TickInput::default();
    };
    TickInput {
        move_x: steer(player.pos.x, depot.center_x(), tuning),
        // Hop over the shaft mouth instead of dropping in
        thrust: (player.pos.x - shaft_x).abs() < TILE_SIZE,
        ..Default::default()
    }
}

/// First depot visit worth making, if any
fn next_errand(session: &GameSession, tuning: &Tuning) -> Option<(DepotKind, DepotAction)> {
    let player = &session.player;
    let ledger = &session.ledger;

    if !player.cargo.is_empty() {
        return Some((DepotKind::Processor, DepotAction::SellCargo));
    }
    let fuel_cost = Ledger::refuel_cost(player, tuning.unit_fuel_cost);
    if fuel_cost > 0 && ledger.can_afford(fuel_cost) {
        return Some((DepotKind::FuelStation, DepotAction::Refuel));
    }
    let repair_cost = Ledger::repair_cost(player, tuning.unit_repair_cost);
    if repair_cost > 0 && ledger.can_afford(repair_cost) {
        return Some((DepotKind::RepairShop, DepotAction::Repair));
    }
    ledger
        .cheapest_affordable_upgrade()
        .map(|(category, _)| (DepotKind::UpgradeShop, DepotAction::Upgrade(category)))
}

fn underground_plan(session: &GameSession) -> TickInput {
    let player = &session.player;
    let col = world_to_tile(player.pos.x);
    let below = world_to_tile(player.pos.y + player.half_size.y + PROBE_EPSILON);
    let depth = session.current_depth() as f32;

    let heading_home = player.cargo.free_space() < RETURN_FREE_SPACE
        || player.fuel < RETURN_FUEL_BASE + depth * RETURN_FUEL_PER_ROW
        || player.hull < player.max_hull * RETURN_HULL_FRACTION
        || session.grid.kind(col, below) == TileKind::Boundary;

    if heading_home {
        TickInput {
            // Stay centred so the box clears the shaft walls
            move_x: ((tile_center(col, 0).x - player.pos.x) / TILE_SIZE).clamp(-1.0, 1.0),
            thrust: true,
            ..Default::default()
        }
    } else {
        TickInput {
            drill: Some(DrillDir::Down),
            ..Default::default()
        }
    }
}

/// Drive input that reaches `to` without overshooting in one step
fn steer(from: f32, to: f32, tuning: &Tuning) -> f32 {
    let step = tuning.move_speed * SIM_DT;
    let dx = to - from;
    if dx.abs() < 0.05 || step <= 0.0 {
        0.0
    } else {
        (dx / step).clamp(-1.0, 1.0)
    }
}
