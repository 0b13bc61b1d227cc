//! Depth-biased world generation
//!
//! Each cell below the surface draws one uniform roll and walks a fixed list
//! of probability bands, first match wins:
//!
//! hazard → rarest resource → ... → commonest resource → hard material → soft material
//!
//! Band widths depend only on depth, so the same seed always produces the
//! same world. Reordering the bands changes world balance.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::resource::ResourceType;
use super::tile::{Tile, TileGrid, TileKind};

/// Generation knobs (part of [`crate::Tuning`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenParams {
    /// First row that holds material
    pub surface_row: usize,
    /// Hazards never appear shallower than this
    pub hazard_min_depth: u32,
    pub hazard_base: f32,
    pub hazard_per_row: f32,
    pub hazard_cap: f32,
    /// Relative growth of a resource band per row below its minimum depth
    pub depth_bias: f32,
    /// Upper bound for any single resource band
    pub resource_cap: f32,
    pub hard_base: f32,
    pub hard_per_row: f32,
    pub hard_cap: f32,
    /// Relative hardness increase per row of depth
    pub hardness_per_row: f32,
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            surface_row: 10,
            hazard_min_depth: 15,
            hazard_base: 0.01,
            hazard_per_row: 0.001,
            hazard_cap: 0.08,
            depth_bias: 0.02,
            resource_cap: 0.12,
            hard_base: 0.05,
            hard_per_row: 0.006,
            hard_cap: 0.45,
            hardness_per_row: 0.01,
        }
    }
}

/// Probability bands for a depth, in the order they are tested
pub fn band_widths(depth: u32, params: &GenParams) -> Vec<(TileKind, f32)> {
    let mut bands = Vec::with_capacity(ResourceType::ALL.len() + 3);

    let hazard = if depth < params.hazard_min_depth {
        0.0
    } else {
        let rows = (depth - params.hazard_min_depth) as f32;
        (params.hazard_base + params.hazard_per_row * rows).min(params.hazard_cap)
    };
    bands.push((TileKind::Hazard, hazard));

    for resource in ResourceType::ALL.iter().rev() {
        let width = if depth < resource.min_depth() {
            0.0
        } else {
            let rows = (depth - resource.min_depth()) as f32;
            (resource.base_chance() * (1.0 + params.depth_bias * rows)).min(params.resource_cap)
        };
        bands.push((TileKind::ResourceVein(*resource), width));
    }

    let hard = (params.hard_base + params.hard_per_row * depth as f32).min(params.hard_cap);
    bands.push((TileKind::HardMaterial, hard));
    // Remainder
    bands.push((TileKind::SoftMaterial, 1.0));
    bands
}

/// Map a roll in [0, 1) to a tile kind for the given depth
pub fn pick_kind(roll: f32, depth: u32, params: &GenParams) -> TileKind {
    pick_from(roll, &band_widths(depth, params))
}

fn pick_from(roll: f32, bands: &[(TileKind, f32)]) -> TileKind {
    let mut upper = 0.0;
    for (kind, width) in bands {
        upper += width;
        if roll < upper {
            return *kind;
        }
    }
    TileKind::SoftMaterial
}

/// Hardness of a generated tile at a depth
pub fn hardness_at(kind: TileKind, depth: u32, params: &GenParams) -> f32 {
    kind.base_hardness() * (1.0 + params.hardness_per_row * depth as f32)
}

/// Build a world of `width` x `height` tiles
pub fn generate<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
    params: &GenParams,
) -> TileGrid {
    let mut grid = TileGrid::new(width, height, params.surface_row);

    for y in params.surface_row..height {
        let depth = grid.depth_of_row(y as i32);
        // Cache bands per row; they only depend on depth
        let bands = band_widths(depth, params);
        for x in 0..width {
            if grid.is_edge(x, y) {
                continue;
            }
            let roll: f32 = rng.random();
            let kind = pick_from(roll, &bands);
            grid.set(x as i32, y as i32, Tile::new(kind, hardness_at(kind, depth, params)));
        }
    }

    log::info!(
        "Generated {}x{} world: {} veins, {} hazards",
        width,
        height,
        grid.count(|t| t.kind.resource().is_some()),
        grid.count(|t| t.kind == TileKind::Hazard),
    );

    grid
}
