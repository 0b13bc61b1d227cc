//! Fixed timestep simulation tick
//!
//! Advances a [`GameSession`] by one step: drill state machine, movement and
//! collision, hazards, fuel, depot transactions, game over.

use super::collision::{self, fall_damage};
use super::depot::{self, DepotAction};
use super::drill::{self, DrillDir, DrillOutcome, Pickup};
use super::economy::Declined;
use super::state::{GameEvent, GamePhase, GameSession};
use super::tile::TileKind;
use crate::consts::CONTACT_MARGIN;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal drive in [-1, 1]
    pub move_x: f32,
    /// Fly upward
    pub thrust: bool,
    /// Drill held in a direction
    pub drill: Option<DrillDir>,
    /// Depot transaction (one-shot)
    pub action: Option<DepotAction>,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Throw away the run and start a new world (one-shot)
    pub restart: bool,
}

impl TickInput {
    /// The same held controls with one-shot commands cleared
    pub fn held(&self) -> Self {
        Self {
            action: None,
            pause: false,
            restart: false,
            ..self.clone()
        }
    }
}

/// Seed for the world that follows `seed` on restart
pub fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Advance the session by one timestep
pub fn tick(session: &mut GameSession, input: &TickInput, tuning: &Tuning, dt: f32) {
    if input.restart {
        let seed = next_seed(session.seed);
        *session = GameSession::new(seed, tuning);
        session.push_event(GameEvent::Restarted { seed });
        return;
    }

    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => session.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    if session.phase != GamePhase::Playing {
        return;
    }

    session.time_ticks += 1;
    let had_fuel = session.player.has_fuel();

    update_drill(session, input, tuning, dt);

    if !session.player.drill.is_drilling() {
        update_movement(session, input, tuning, dt);
    }

    // Hazard contact hurts every tick while touching
    let player = &session.player;
    let touching = collision::touches_kind(
        player.pos,
        player.half_size,
        CONTACT_MARGIN,
        &session.grid,
        TileKind::Hazard,
    );
    if touching {
        session.player.damage(tuning.hazard_dps * dt);
        if !session.player.touching_hazard {
            session.push_event(GameEvent::HazardContact);
        }
    }
    session.player.touching_hazard = touching;

    session.player.burn_fuel(tuning.idle_fuel_burn * dt);
    if had_fuel && !session.player.has_fuel() {
        log::debug!("Out of fuel at depth {}", session.current_depth());
        session.push_event(GameEvent::OutOfFuel);
    }

    session.max_depth = session.max_depth.max(session.current_depth());

    // Depot arrival is the save point
    let at = depot::depot_at(&session.depots, &session.player, &session.grid);
    if at != session.current_depot {
        if let Some(kind) = at {
            session.push_event(GameEvent::EnteredDepot(kind));
        }
        session.current_depot = at;
    }

    if let Some(action) = input.action {
        perform_action(session, action, tuning);
    }

    if session.player.is_destroyed() {
        session.player.hull = 0.0;
        session.phase = GamePhase::GameOver;
        let earnings = session.ledger.lifetime_earnings();
        log::info!(
            "Vehicle destroyed at depth {} (earned ${}, deepest {})",
            session.current_depth(),
            earnings,
            session.max_depth
        );
        session.push_event(GameEvent::Destroyed {
            earnings,
            max_depth: session.max_depth,
        });
    }
}

fn update_drill(session: &mut GameSession, input: &TickInput, tuning: &Tuning, dt: f32) {
    let player = &mut session.player;
    let grid = &mut session.grid;

    if let drill::DrillState::Drilling { dir, .. } = player.drill {
        if input.drill != Some(dir) || !player.has_fuel() {
            if let Some(pos) = drill::cancel(player, grid, tuning.keep_partial_drill) {
                session.push_event(GameEvent::DrillCancelled { pos });
            }
            return;
        }
    } else if let Some(dir) = input.drill {
        drill::try_start(player, grid, dir);
    }

    match drill::update(player, grid, dt, tuning.drill_fuel_burn) {
        DrillOutcome::Idle | DrillOutcome::InProgress => {}
        DrillOutcome::Broke {
            target,
            kind,
            pickup,
        } => {
            log::debug!("Drilled {:?} at ({}, {})", kind, target.x, target.y);
            session.push_event(GameEvent::DrillCompleted { pos: target, kind });
            match pickup {
                Pickup::Nothing => {}
                Pickup::Collected(resource) => session.push_event(GameEvent::Collected(resource)),
                Pickup::Lost(resource, full) => session.push_event(GameEvent::CargoLost {
                    resource,
                    free: full.free,
                }),
            }
        }
    }
}

fn update_movement(session: &mut GameSession, input: &TickInput, tuning: &Tuning, dt: f32) {
    let player = &mut session.player;
    let powered = player.has_fuel();

    let drive = if powered { input.move_x.clamp(-1.0, 1.0) } else { 0.0 };
    let thrusting = powered && input.thrust;

    let mut vel = player.vel;
    vel.x = drive * tuning.move_speed;
    vel.y += tuning.gravity * dt;
    if thrusting {
        vel.y -= tuning.thrust_accel * dt;
    }
    vel.y = vel.y.clamp(-tuning.max_rise_speed, tuning.terminal_velocity);

    let resolved = collision::resolve(player.pos, vel, player.half_size, &session.grid, dt);
    player.pos = resolved.pos;
    player.vel = resolved.vel;
    player.grounded = resolved.contact.grounded;

    if drive != 0.0 {
        player.burn_fuel(tuning.move_fuel_burn * drive.abs() * dt);
    }
    if thrusting {
        player.burn_fuel(tuning.thrust_fuel_burn * dt);
    }

    if let Some(speed) = resolved.contact.impact_speed {
        let damage = fall_damage(
            speed,
            tuning.fall_damage_threshold,
            tuning.fall_damage_per_unit,
        );
        if damage > 0.0 {
            player.damage(damage);
            session.push_event(GameEvent::Landed { speed, damage });
        }
    }
}

fn perform_action(session: &mut GameSession, action: DepotAction, tuning: &Tuning) {
    if session.current_depot != Some(action.depot_kind()) {
        session.push_event(GameEvent::Declined(Declined::NotAtDepot));
        return;
    }

    let ledger = &mut session.ledger;
    let player = &mut session.player;
    let event = match action {
        DepotAction::Refuel => ledger
            .refuel(player, tuning.unit_fuel_cost)
            .map(|cost| GameEvent::Refueled { cost }),
        DepotAction::SellCargo => ledger
            .sell_cargo(player)
            .map(|earned| GameEvent::Sold { earned }),
        DepotAction::Repair => ledger
            .repair_hull(player, tuning.unit_repair_cost)
            .map(|cost| GameEvent::Repaired { cost }),
        DepotAction::Upgrade(category) => ledger.buy_upgrade(player, category).map(|cost| {
            GameEvent::Upgraded {
                category,
                tier: ledger.tiers().get(category),
                cost,
            }
        }),
    };
    session.push_event(event.unwrap_or_else(GameEvent::Declined));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SIM_DT, TILE_SIZE};
    use crate::sim::depot::DepotKind;
    use crate::sim::economy::UpgradeCategory;
    use crate::sim::player::CargoItem;
    use crate::sim::resource::ResourceType;
    use crate::sim::tile::{Tile, TileGrid};
    use glam::Vec2;
    use proptest::prelude::*;

    fn session() -> (GameSession, Tuning) {
        let tuning = Tuning::default();
        (GameSession::new(12345, &tuning), tuning)
    }

    fn park_at(session: &mut GameSession, kind: DepotKind) {
        let x = session.depot(kind).unwrap().center_x();
        session.player.pos.x = x;
        session.player.vel = Vec2::ZERO;
        session.player.grounded = true;
    }

    fn run(session: &mut GameSession, tuning: &Tuning, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(session, input, tuning, SIM_DT);
        }
    }

    #[test]
    fn test_idle_player_stays_on_surface() {
        let (mut s, tuning) = session();
        let start = s.player.pos;
        run(&mut s, &tuning, &TickInput::default(), 120);
        assert_eq!(s.player.pos, start);
        assert!(s.player.grounded);
        assert_eq!(s.player.hull, s.player.max_hull);
        assert_eq!(s.time_ticks, 120);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut s, tuning) = session();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut s, &pause, &tuning, SIM_DT);
        assert_eq!(s.phase, GamePhase::Paused);
        let ticks = s.time_ticks;
        let walk = TickInput {
            move_x: 1.0,
            ..Default::default()
        };
        run(&mut s, &tuning, &walk, 10);
        assert_eq!(s.time_ticks, ticks);

        tick(&mut s, &pause, &tuning, SIM_DT);
        assert_eq!(s.phase, GamePhase::Playing);
    }

    #[test]
    fn test_drill_down_through_surface() {
        let (mut s, tuning) = session();
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::SoftMaterial, 1.0));

        let dig = TickInput {
            drill: Some(DrillDir::Down),
            ..Default::default()
        };
        // 1.0 hardness at 2.0/s is 60 ticks
        run(&mut s, &tuning, &dig, 61);
        assert_eq!(s.grid.kind(col, row), TileKind::Empty);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::DrillCompleted {
            pos: crate::sim::tile::TilePos::new(col, row),
            kind: TileKind::SoftMaterial,
        }));

        // Fall into the hole
        run(&mut s, &tuning, &TickInput::default(), 60);
        assert_eq!(s.current_depth(), 0);
        assert!(s.player.pos.y > row as f32 * TILE_SIZE);
        assert_eq!(s.max_depth, 0);
    }

    #[test]
    fn test_releasing_drill_cancels() {
        let (mut s, tuning) = session();
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::HardMaterial, 3.0));
        let dig = TickInput {
            drill: Some(DrillDir::Down),
            ..Default::default()
        };
        run(&mut s, &tuning, &dig, 30);
        assert!(s.player.drill.is_drilling());
        tick(&mut s, &TickInput::default(), &tuning, SIM_DT);
        assert!(!s.player.drill.is_drilling());
        assert_eq!(s.grid.get(col, row).hardness, 3.0);
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::DrillCancelled { .. })));
    }

    #[test]
    fn test_fall_damage_on_landing() {
        let (mut s, tuning) = session();
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::SoftMaterial, 1.0));
        // Bottom edge one unit above the surface, falling at 250
        s.player.pos.y = row as f32 * TILE_SIZE - s.player.half_size.y - 1.0;
        s.player.vel = Vec2::new(0.0, 250.0);
        s.player.grounded = false;
        let hull = s.player.hull;

        tick(&mut s, &TickInput::default(), &tuning, SIM_DT);
        // Gravity adds ~3.3 this tick: floor((253.3 - 150) / 30) = 3
        assert_eq!(s.player.hull, hull - 3.0);
        assert!(s.player.grounded);
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Landed { damage, .. } if *damage == 3.0)));
    }

    #[test]
    fn test_hazard_contact_damages_per_second() {
        let (mut s, tuning) = session();
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::Hazard, 2.5));
        let hull = s.player.hull;
        run(&mut s, &tuning, &TickInput::default(), 120);
        let expected = hull - tuning.hazard_dps;
        assert!((s.player.hull - expected).abs() < 0.01, "{}", s.player.hull);
        let contacts = s
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::HazardContact)
            .count();
        assert_eq!(contacts, 1);
    }

    #[test]
    fn test_destroyed_ends_game() {
        let (mut s, tuning) = session();
        s.player.hull = 0.5;
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::Hazard, 2.5));
        run(&mut s, &tuning, &TickInput::default(), 30);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert_eq!(s.player.hull, 0.0);
        let frozen = s.time_ticks;
        run(&mut s, &tuning, &TickInput::default(), 5);
        assert_eq!(s.time_ticks, frozen);
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Destroyed { .. })));
    }

    #[test]
    fn test_empty_tank_cancels_drill() {
        let (mut s, tuning) = session();
        let col = s.spawn_col();
        let row = tuning.generation.surface_row as i32;
        s.grid.set(col, row, Tile::new(TileKind::HardMaterial, 3.0));
        s.player.fuel = 0.01;
        let dig = TickInput {
            drill: Some(DrillDir::Down),
            ..Default::default()
        };
        tick(&mut s, &dig, &tuning, SIM_DT);
        assert!(s.player.drill.is_drilling());

        run(&mut s, &tuning, &dig, 20);
        assert_eq!(s.player.fuel, 0.0);
        assert_eq!(s.player.drill, crate::sim::drill::DrillState::Idle);
        assert_eq!(s.grid.get(col, row).hardness, 3.0);
        assert_eq!(s.grid.kind(col, row), TileKind::HardMaterial);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::OutOfFuel));
        assert!(events.contains(&GameEvent::DrillCancelled {
            pos: crate::sim::tile::TilePos::new(col, row),
        }));
    }

    #[test]
    fn test_no_fuel_means_no_drive() {
        let (mut s, tuning) = session();
        s.player.fuel = 0.0;
        let x = s.player.pos.x;
        let drive = TickInput {
            move_x: 1.0,
            thrust: true,
            drill: Some(DrillDir::Down),
            ..Default::default()
        };
        run(&mut s, &tuning, &drive, 30);
        assert_eq!(s.player.pos.x, x);
        assert!(!s.player.drill.is_drilling());
    }

    #[test]
    fn test_sell_at_processor() {
        let (mut s, tuning) = session();
        park_at(&mut s, DepotKind::Processor);
        s.player
            .cargo
            .try_push(CargoItem {
                resource: ResourceType::Copper,
                weight: 5,
                value: 30,
            })
            .unwrap();
        s.player
            .cargo
            .try_push(CargoItem {
                resource: ResourceType::Iron,
                weight: 10,
                value: 60,
            })
            .unwrap();
        s.ledger = crate::sim::economy::Ledger::new(100);

        tick(&mut s, &TickInput::default(), &tuning, SIM_DT);
        assert_eq!(s.current_depot, Some(DepotKind::Processor));

        let sell = TickInput {
            action: Some(DepotAction::SellCargo),
            ..Default::default()
        };
        tick(&mut s, &sell, &tuning, SIM_DT);
        assert_eq!(s.ledger.cash(), 190);
        assert!(s.player.cargo.is_empty());
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::EnteredDepot(DepotKind::Processor)));
        assert!(events.contains(&GameEvent::Sold { earned: 90 }));
    }

    #[test]
    fn test_action_away_from_depot_is_declined() {
        let (mut s, tuning) = session();
        s.ledger = crate::sim::economy::Ledger::new(10_000);
        let buy = TickInput {
            action: Some(DepotAction::Upgrade(UpgradeCategory::Drill)),
            ..Default::default()
        };
        tick(&mut s, &buy, &tuning, SIM_DT);
        assert_eq!(s.ledger.cash(), 10_000);
        assert!(s
            .drain_events()
            .contains(&GameEvent::Declined(Declined::NotAtDepot)));
    }

    #[test]
    fn test_upgrade_at_shop() {
        let (mut s, tuning) = session();
        s.ledger = crate::sim::economy::Ledger::new(1000);
        park_at(&mut s, DepotKind::UpgradeShop);
        tick(&mut s, &TickInput::default(), &tuning, SIM_DT);
        let buy = TickInput {
            action: Some(DepotAction::Upgrade(UpgradeCategory::Drill)),
            ..Default::default()
        };
        tick(&mut s, &buy, &tuning, SIM_DT);
        assert_eq!(s.ledger.cash(), 850);
        assert_eq!(s.player.drill_speed, UpgradeCategory::Drill.value_at(1));
        assert!(s.drain_events().contains(&GameEvent::Upgraded {
            category: UpgradeCategory::Drill,
            tier: 1,
            cost: 150
        }));
    }

    #[test]
    fn test_restart_generates_next_world() {
        let (mut s, tuning) = session();
        s.player.hull = 1.0;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut s, &restart, &tuning, SIM_DT);
        let seed = next_seed(12345);
        assert_eq!(s.seed, seed);
        assert_eq!(s.player.hull, s.player.max_hull);
        assert_eq!(s.drain_events(), vec![GameEvent::Restarted { seed }]);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut a = GameSession::new(99, &tuning);
        let mut b = GameSession::new(99, &tuning);
        let inputs = [
            TickInput {
                drill: Some(DrillDir::Down),
                ..Default::default()
            },
            TickInput {
                move_x: -1.0,
                ..Default::default()
            },
            TickInput {
                thrust: true,
                ..Default::default()
            },
        ];
        for input in inputs.iter().cycle().take(600) {
            tick(&mut a, input, &tuning, SIM_DT);
            tick(&mut b, input, &tuning, SIM_DT);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.grid.tiles(), b.grid.tiles());
        assert_eq!(a.player.fuel, b.player.fuel);
    }

    fn small_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.world_width = 24;
        tuning.world_height = 30;
        tuning.generation.surface_row = 4;
        tuning.generation.hazard_min_depth = 2;
        tuning.starting_cash = 2_000;
        tuning
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        let dir = prop_oneof![
            Just(None),
            Just(Some(DrillDir::Down)),
            Just(Some(DrillDir::Left)),
            Just(Some(DrillDir::Right)),
        ];
        let action = prop_oneof![
            4 => Just(None),
            1 => Just(Some(DepotAction::Refuel)),
            1 => Just(Some(DepotAction::SellCargo)),
            1 => Just(Some(DepotAction::Repair)),
            1 => Just(Some(DepotAction::Upgrade(UpgradeCategory::Cargo))),
        ];
        (-1i8..=1, any::<bool>(), dir, action).prop_map(|(mx, thrust, drill, action)| TickInput {
            move_x: mx as f32,
            thrust,
            drill,
            action,
            pause: false,
            restart: false,
        })
    }

    fn boundary_cells(grid: &TileGrid) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.is_edge(x, y) {
                    cells.push((x as i32, y as i32));
                }
            }
        }
        cells
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_session_invariants_hold(
            seed in any::<u64>(),
            // Each input is held for a number of ticks so drills can finish
            script in prop::collection::vec((input_strategy(), 1usize..90), 1..40),
        ) {
            let tuning = small_tuning();
            let mut s = GameSession::new(seed, &tuning);
            let edges = boundary_cells(&s.grid);

            for (input, hold) in script {
                for i in 0..hold {
                    let input = if i == 0 { input.clone() } else { input.held() };
                    let before_tiles = s.grid.tiles().to_vec();
                    let before_cash = s.ledger.cash();
                    let before_tiers = *s.ledger.tiers();

                    tick(&mut s, &input, &tuning, SIM_DT);

                    // Cargo never exceeds capacity
                    prop_assert!(s.player.cargo.weight() <= s.player.cargo.capacity());

                    for (before, after) in before_tiles.iter().zip(s.grid.tiles()) {
                        // Hardness never rises and never goes negative
                        prop_assert!(after.hardness <= before.hardness);
                        prop_assert!(after.hardness >= 0.0);
                        // Empty stays empty
                        if before.kind == TileKind::Empty {
                            prop_assert_eq!(after.kind, TileKind::Empty);
                        }
                        if after.hardness == 0.0 {
                            prop_assert_eq!(after.kind, TileKind::Empty);
                        }
                    }
                    for &(x, y) in &edges {
                        prop_assert_eq!(s.grid.get(x, y), Tile::BOUNDARY);
                    }

                    // Cash only moves by the amounts the events report
                    let mut expected = before_cash as i128;
                    for event in s.drain_events() {
                        match event {
                            GameEvent::Sold { earned } => expected += earned as i128,
                            GameEvent::Refueled { cost }
                            | GameEvent::Repaired { cost }
                            | GameEvent::Upgraded { cost, .. } => expected -= cost as i128,
                            _ => {}
                        }
                    }
                    prop_assert_eq!(s.ledger.cash() as i128, expected);

                    for c in UpgradeCategory::ALL {
                        prop_assert!(s.ledger.tiers().get(c) >= before_tiers.get(c));
                        prop_assert!(s.ledger.tiers().get(c) <= c.max_tier());
                    }
                    prop_assert!(s.player.fuel >= 0.0 && s.player.fuel <= s.player.max_fuel);
                    prop_assert!(s.player.hull >= 0.0 && s.player.hull <= s.player.max_hull);
                    prop_assert!(s.player.pos.x >= 0.0 && s.player.pos.x <= s.grid.pixel_width());
                    prop_assert!(s.player.pos.y >= 0.0 && s.player.pos.y <= s.grid.pixel_height());
                }
            }
        }
    }
}
