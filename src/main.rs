//! Deepcore entry point
//!
//! Headless runner: resumes (or starts) a run, lets the autopilot play it
//! through the game loop, and logs what happens.
//!
//! Usage: `deepcore [seed] [seconds]`

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use deepcore::persistence::{self, FileStore, SaveStore};
use deepcore::records::RunRecord;
use deepcore::sim::{GameEvent, GameSession, autopilot};
use deepcore::tuning::TUNING_ENV;
use deepcore::{GameLoop, Presenter, Records, Tuning};

/// Simulated display rate
const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES_PER_SECOND: u64 = 60;
const DEFAULT_SECONDS: u64 = 300;
const SAVE_DIR: &str = "saves";
/// Status line cadence, in frames
const STATUS_EVERY: u64 = FRAMES_PER_SECOND * 30;

/// Writes events and a periodic status line to the log
#[derive(Default)]
struct LogPresenter {
    frames: u64,
}

impl Presenter for LogPresenter {
    fn present(&mut self, session: &GameSession, events: &[GameEvent]) {
        self.frames += 1;

        for event in events {
            match event {
                GameEvent::Collected(resource) => log::info!("Collected {}", resource.name()),
                GameEvent::CargoLost { resource, free } => {
                    log::info!("Hold full, lost {} ({} free)", resource.name(), free)
                }
                GameEvent::Landed { speed, damage } => {
                    log::info!("Hard landing at {:.0}: -{:.0} hull", speed, damage)
                }
                GameEvent::HazardContact => log::info!("Touching a hazard"),
                GameEvent::OutOfFuel => log::warn!("Out of fuel"),
                GameEvent::EnteredDepot(kind) => log::info!("Arrived at {}", kind.name()),
                GameEvent::Sold { earned } => log::info!("Sold cargo for ${}", earned),
                GameEvent::Refueled { cost } => log::info!("Refueled for ${}", cost),
                GameEvent::Repaired { cost } => log::info!("Repaired for ${}", cost),
                GameEvent::Upgraded {
                    category,
                    tier,
                    cost,
                } => log::info!("Upgraded {} to tier {} for ${}", category.name(), tier, cost),
                GameEvent::Declined(reason) => log::debug!("Declined: {}", reason),
                _ => log::trace!("{:?}", event),
            }
        }

        if self.frames % STATUS_EVERY == 0 {
            let p = &session.player;
            log::info!(
                "[{}s] depth {} (max {}), ${}, fuel {:.1}/{:.0}, hull {:.0}/{:.0}, cargo {}/{}",
                self.frames / FRAMES_PER_SECOND,
                session.current_depth(),
                session.max_depth,
                session.ledger.cash(),
                p.fuel,
                p.max_fuel,
                p.hull,
                p.max_hull,
                p.cargo.weight(),
                p.cargo.capacity()
            );
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Deepcore starting...");

    let mut args = std::env::args().skip(1);
    let seed = parse_arg(args.next(), "seed").unwrap_or_else(clock_seed);
    let seconds = parse_arg(args.next(), "seconds").unwrap_or(DEFAULT_SECONDS);

    let tuning_path = std::env::var_os(TUNING_ENV).map(PathBuf::from);
    let tuning = Tuning::load_or_default(tuning_path.as_deref());

    let mut store = FileStore::new(SAVE_DIR);
    let session = persistence::load_or_new(&store, seed, &tuning);
    let mut records = Records::load(&store).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable records: {e}");
        Records::new()
    });

    let mut game = GameLoop::new(session, tuning);
    let mut presenter = LogPresenter::default();

    for _ in 0..seconds.saturating_mul(FRAMES_PER_SECOND) {
        let input = autopilot::plan(game.session(), game.tuning());
        let events = game.frame(FRAME_DT, &input, &mut presenter);

        for event in &events {
            match *event {
                // Parking at a depot is the save point
                GameEvent::EnteredDepot(_) => save(&mut store, game.session()),
                GameEvent::Destroyed {
                    earnings,
                    max_depth,
                } => {
                    let record = RunRecord {
                        earnings,
                        max_depth,
                        seed: game.session().seed,
                    };
                    if let Some(rank) = records.add(record) {
                        log::info!("New record #{} (${})", rank, earnings);
                        if let Err(e) = records.save(&mut store) {
                            log::warn!("Could not save records: {e}");
                        }
                    }
                    if let Err(e) = persistence::clear_session(&mut store) {
                        log::warn!("Could not clear saved game: {e}");
                    }
                }
                _ => {}
            }
        }

        if game.session().is_over() {
            break;
        }
    }

    let session = game.into_session();
    if !session.is_over() {
        save(&mut store, &session);
    }
    report(&session, &records);
}

fn parse_arg<T: std::str::FromStr>(arg: Option<String>, name: &str) -> Option<T> {
    let arg = arg?;
    match arg.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring invalid {name} {arg:?}");
            None
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn save(store: &mut dyn SaveStore, session: &GameSession) {
    if let Err(e) = persistence::save_session(store, session) {
        log::warn!("Could not save game: {e}");
    }
}

fn report(session: &GameSession, records: &Records) {
    let grid = &session.grid;
    let top = grid.surface_row().saturating_sub(3);
    let player_row = deepcore::world_to_tile(session.player.pos.y).max(0) as usize;
    let bottom = (player_row + 6).min(grid.height());

    println!("\nSeed {} after {} ticks", session.seed, session.time_ticks);
    println!(
        "Cash ${}, earned ${}, deepest row {}",
        session.ledger.cash(),
        session.ledger.lifetime_earnings(),
        session.max_depth
    );
    println!("{}", grid.to_ascii(top..bottom));
    if let Some(best) = records.best() {
        println!(
            "Best run: ${} (depth {}, seed {})",
            best.earnings, best.max_depth, best.seed
        );
    }
}
