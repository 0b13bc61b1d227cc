//! Data-driven game balance
//!
//! [`Tuning::default`] is the authoritative source for every constant. A JSON
//! file may override any subset of fields; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{SIM_DT, TILE_SIZE};
use crate::error::{Error, Result};
use crate::sim::procgen::GenParams;

/// Environment variable naming a tuning file for the demo binary
pub const TUNING_ENV: &str = "DEEPCORE_TUNING";

/// All balance values used by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: usize,
    pub world_height: usize,
    pub generation: GenParams,

    // === Movement ===
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Fastest fall speed
    pub terminal_velocity: f32,
    /// Fastest climb speed while thrusting
    pub max_rise_speed: f32,
    /// Upward acceleration while thrusting (before gravity)
    pub thrust_accel: f32,
    /// Horizontal driving speed
    pub move_speed: f32,

    // === Damage ===
    /// Landing speed above which the hull takes damage
    pub fall_damage_threshold: f32,
    /// Hull damage per unit of landing speed above the threshold
    pub fall_damage_per_unit: f32,
    /// Hull damage per second while touching a hazard
    pub hazard_dps: f32,

    // === Fuel burn (per second) ===
    pub idle_fuel_burn: f32,
    pub move_fuel_burn: f32,
    pub thrust_fuel_burn: f32,
    pub drill_fuel_burn: f32,

    // === Economy ===
    pub starting_cash: u64,
    /// Price of one unit of fuel
    pub unit_fuel_cost: f32,
    /// Price of one point of hull repair
    pub unit_repair_cost: f32,

    /// Keep the hardness a cancelled drill already removed
    pub keep_partial_drill: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 40,
            world_height: 90,
            generation: GenParams::default(),

            gravity: 400.0,
            terminal_velocity: 420.0,
            max_rise_speed: 200.0,
            thrust_accel: 900.0,
            move_speed: 120.0,

            fall_damage_threshold: 150.0,
            fall_damage_per_unit: 1.0 / 30.0,
            hazard_dps: 10.0,

            idle_fuel_burn: 0.02,
            move_fuel_burn: 0.15,
            thrust_fuel_burn: 0.4,
            drill_fuel_burn: 0.3,

            starting_cash: 20,
            unit_fuel_cost: 2.0,
            unit_repair_cost: 3.0,

            keep_partial_drill: false,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a tuning file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path` if given, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default tuning");
            return Self::default();
        };
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidTuning { field, reason })
            }
        }

        // Depots take the first and last ten columns, spawn sits between them
        check(self.world_width >= 24, "world_width", "must be at least 24")?;
        check(
            self.generation.surface_row >= 2,
            "generation.surface_row",
            "must leave room for the sky",
        )?;
        check(
            self.world_height >= self.generation.surface_row + 3,
            "world_height",
            "must leave at least one diggable row under the surface",
        )?;
        check(self.gravity > 0.0, "gravity", "must be positive")?;
        // One substep must never cross a whole tile
        check(
            self.terminal_velocity > 0.0 && self.terminal_velocity * SIM_DT < TILE_SIZE / 2.0,
            "terminal_velocity",
            "must be positive and below half a tile per tick",
        )?;
        check(
            self.max_rise_speed > 0.0 && self.max_rise_speed * SIM_DT < TILE_SIZE / 2.0,
            "max_rise_speed",
            "must be positive and below half a tile per tick",
        )?;
        check(
            self.move_speed >= 0.0 && self.move_speed * SIM_DT < TILE_SIZE / 2.0,
            "move_speed",
            "must be non-negative and below half a tile per tick",
        )?;
        check(self.thrust_accel >= 0.0, "thrust_accel", "must be non-negative")?;
        check(
            self.fall_damage_threshold >= 0.0 && self.fall_damage_per_unit >= 0.0,
            "fall_damage_threshold",
            "fall damage settings must be non-negative",
        )?;
        check(self.hazard_dps >= 0.0, "hazard_dps", "must be non-negative")?;
        check(
            [
                self.idle_fuel_burn,
                self.move_fuel_burn,
                self.thrust_fuel_burn,
                self.drill_fuel_burn,
            ]
            .iter()
            .all(|b| *b >= 0.0),
            "fuel_burn",
            "burn rates must be non-negative",
        )?;
        check(
            self.unit_fuel_cost >= 0.0 && self.unit_repair_cost >= 0.0,
            "unit_cost",
            "prices must be non-negative",
        )?;

        let g = &self.generation;
        let probabilities = [
            g.hazard_base,
            g.hazard_per_row,
            g.hazard_cap,
            g.resource_cap,
            g.hard_base,
            g.hard_per_row,
            g.hard_cap,
        ];
        check(
            probabilities.iter().all(|p| (0.0..=1.0).contains(p)),
            "generation",
            "band probabilities must lie in [0, 1]",
        )?;
        check(
            g.depth_bias >= 0.0 && g.hardness_per_row >= 0.0,
            "generation",
            "depth scaling must be non-negative",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Tuning::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 500.0, "generation": { "surface_row": 6 } }"#)
            .unwrap();
        assert_eq!(tuning.gravity, 500.0);
        assert_eq!(tuning.generation.surface_row, 6);
        assert_eq!(tuning.move_speed, Tuning::default().move_speed);
        assert_eq!(tuning.generation.hazard_cap, GenParams::default().hazard_cap);
    }

    #[test]
    fn test_tunnelling_speeds_are_rejected() {
        let err = Tuning::from_json(r#"{ "terminal_velocity": 10000.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTuning {
                field: "terminal_velocity",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tuning = Tuning::load_or_default(Some(Path::new("/definitely/not/here.json")));
        assert_eq!(tuning, Tuning::default());
    }
}
