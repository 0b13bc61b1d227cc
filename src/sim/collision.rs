//! Axis-aligned box vs tile grid collision
//!
//! Movement is resolved one axis at a time, X then Y, and each pass only
//! samples the cells along the box's leading edge. Blocking one axis leaves
//! the other free, so the box slides along walls and floors instead of
//! catching on tile corners.

use glam::Vec2;

use super::tile::{TileGrid, TileKind};
use crate::consts::{PROBE_EPSILON, TILE_SIZE};
use crate::world_to_tile;

/// What the box touched during one resolve step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    /// Resting on a solid tile after the step
    pub grounded: bool,
    /// Downward speed at the moment of landing, if the box hit a floor
    pub impact_speed: Option<f32>,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
}

/// Outcome of [`resolve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub pos: Vec2,
    pub vel: Vec2,
    pub contact: Contact,
}

/// Inclusive tile range covered by the open interval [min, max)
fn span(min: f32, max: f32) -> std::ops::RangeInclusive<i32> {
    world_to_tile(min)..=world_to_tile(max - PROBE_EPSILON)
}

/// Move a box of half extents `half` from `pos` by `vel * dt` through `grid`
pub fn resolve(pos: Vec2, vel: Vec2, half: Vec2, grid: &TileGrid, dt: f32) -> Resolved {
    let mut pos = pos;
    let mut vel = vel;
    let mut contact = Contact::default();

    // --- X pass ---
    let dx = vel.x * dt;
    if dx != 0.0 {
        let new_x = pos.x + dx;
        let rows = span(pos.y - half.y, pos.y + half.y);
        if dx > 0.0 {
            let col = world_to_tile(new_x + half.x - PROBE_EPSILON);
            if rows.clone().any(|r| grid.is_solid(col, r)) {
                pos.x = col as f32 * TILE_SIZE - half.x;
                vel.x = 0.0;
                contact.hit_wall = true;
            } else {
                pos.x = new_x;
            }
        } else {
            let col = world_to_tile(new_x - half.x);
            if rows.clone().any(|r| grid.is_solid(col, r)) {
                pos.x = (col + 1) as f32 * TILE_SIZE + half.x;
                vel.x = 0.0;
                contact.hit_wall = true;
            } else {
                pos.x = new_x;
            }
        }
    }
    pos.x = pos.x.clamp(half.x, (grid.pixel_width() - half.x).max(half.x));

    // --- Y pass (uses the resolved x) ---
    let dy = vel.y * dt;
    if dy != 0.0 {
        let new_y = pos.y + dy;
        let cols = span(pos.x - half.x, pos.x + half.x);
        if dy > 0.0 {
            let row = world_to_tile(new_y + half.y - PROBE_EPSILON);
            if cols.clone().any(|c| grid.is_solid(c, row)) {
                pos.y = row as f32 * TILE_SIZE - half.y;
                contact.impact_speed = Some(vel.y);
                contact.grounded = true;
                vel.y = 0.0;
            } else {
                pos.y = new_y;
            }
        } else {
            let row = world_to_tile(new_y - half.y);
            if cols.clone().any(|c| grid.is_solid(c, row)) {
                pos.y = (row + 1) as f32 * TILE_SIZE + half.y;
                vel.y = 0.0;
                contact.hit_ceiling = true;
            } else {
                pos.y = new_y;
            }
        }
    }
    pos.y = pos.y.clamp(half.y, (grid.pixel_height() - half.y).max(half.y));

    if !contact.grounded && vel.y >= 0.0 {
        contact.grounded = on_ground(pos, half, grid);
    }

    Resolved { pos, vel, contact }
}

/// Is there a solid tile directly under the box
pub fn on_ground(pos: Vec2, half: Vec2, grid: &TileGrid) -> bool {
    let row = world_to_tile(pos.y + half.y + PROBE_EPSILON);
    span(pos.x - half.x, pos.x + half.x).any(|c| grid.is_solid(c, row))
}

/// Does the box, grown by `margin` on every side, touch a tile of `kind`
pub fn touches_kind(pos: Vec2, half: Vec2, margin: f32, grid: &TileGrid, kind: TileKind) -> bool {
    let rows = span(pos.y - half.y - margin, pos.y + half.y + margin);
    span(pos.x - half.x - margin, pos.x + half.x + margin)
        .any(|c| rows.clone().any(|r| grid.kind(c, r) == kind))
}

/// Whole hull points lost landing at `impact_speed`
pub fn fall_damage(impact_speed: f32, threshold: f32, per_unit: f32) -> f32 {
    if impact_speed <= threshold {
        return 0.0;
    }
    ((impact_speed - threshold) * per_unit).floor()
}
