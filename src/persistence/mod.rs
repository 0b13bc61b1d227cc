//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Pluggable backing store (memory, directory of files)
//! - Atomic file replacement (tmp → save)
//! - Corrupt or unknown saves are reported, never trusted

pub mod envelope;
pub mod store;

pub use envelope::{SAVE_VERSION, SaveEnvelope, SessionSnapshot};
pub use store::{FileStore, MemoryStore, SaveStore};

use crate::error::Result;
use crate::sim::GameSession;
use crate::tuning::Tuning;

/// Store key for the in-progress run
pub const SESSION_KEY: &str = "session";

/// Write the session's persistent state
pub fn save_session(store: &mut dyn SaveStore, session: &GameSession) -> Result<()> {
    let json = SaveEnvelope::new(session).to_json()?;
    store.write(SESSION_KEY, &json)?;
    log::info!(
        "Game saved (depth {}, ${})",
        session.current_depth(),
        session.ledger.cash()
    );
    Ok(())
}

/// Read back a saved session. `Ok(None)` when nothing was saved.
pub fn load_session(store: &dyn SaveStore) -> Result<Option<GameSession>> {
    let Some(json) = store.read(SESSION_KEY)? else {
        return Ok(None);
    };
    let envelope = SaveEnvelope::from_json(&json)?;
    envelope.snapshot.into_session().map(Some)
}

/// Forget the saved run (after game over)
pub fn clear_session(store: &mut dyn SaveStore) -> Result<()> {
    store.remove(SESSION_KEY)?;
    log::info!("Saved game cleared");
    Ok(())
}

/// Resume the saved run, or start a fresh world from `seed`.
///
/// A save that can't be read or fails validation is logged and ignored.
pub fn load_or_new(store: &dyn SaveStore, seed: u64, tuning: &Tuning) -> GameSession {
    match load_session(store) {
        Ok(Some(session)) => {
            log::info!(
                "Resumed saved game (seed {}, tick {})",
                session.seed,
                session.time_ticks
            );
            session
        }
        Ok(None) => GameSession::new(seed, tuning),
        Err(e) => {
            log::warn!("Discarding saved game: {e}");
            GameSession::new(seed, tuning)
        }
    }
}
