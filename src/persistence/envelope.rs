//! Versioned save format

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::depot::{self, Depot};
use crate::sim::{GamePhase, GameSession, Ledger, Player, TileGrid};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// The persistent part of a session. Phase, events and the frame clock are
/// not saved; a restored run always resumes in play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub time_ticks: u64,
    pub max_depth: u32,
    pub grid: TileGrid,
    pub depots: Vec<Depot>,
    pub player: Player,
    pub ledger: Ledger,
}

impl From<&GameSession> for SessionSnapshot {
    fn from(session: &GameSession) -> Self {
        Self {
            seed: session.seed,
            time_ticks: session.time_ticks,
            max_depth: session.max_depth,
            grid: session.grid.clone(),
            depots: session.depots.clone(),
            player: session.player.clone(),
            ledger: session.ledger.clone(),
        }
    }
}

impl SessionSnapshot {
    /// Rebuild a session, rejecting impossible states
    pub fn into_session(self) -> Result<GameSession> {
        let current_depot = depot::depot_at(&self.depots, &self.player, &self.grid);
        let session = GameSession {
            seed: self.seed,
            grid: self.grid,
            depots: self.depots,
            player: self.player,
            ledger: self.ledger,
            phase: GamePhase::Playing,
            time_ticks: self.time_ticks,
            max_depth: self.max_depth,
            current_depot,
            events: Vec::new(),
        };
        session.validate()?;
        Ok(session)
    }
}

/// On-disk wrapper: format version plus payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub snapshot: SessionSnapshot,
}

impl SaveEnvelope {
    pub fn new(session: &GameSession) -> Self {
        Self {
            version: SAVE_VERSION,
            snapshot: SessionSnapshot::from(session),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an envelope. The version is checked before the payload is
    /// decoded, so a future format reports a version error rather than a
    /// confusing field error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| Error::InvalidSnapshot("missing save version".to_string()))?;
        if found != u64::from(SAVE_VERSION) {
            return Err(Error::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}
