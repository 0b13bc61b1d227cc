//! Frame clock and the update-then-present cycle
//!
//! Frames arrive at whatever rate the host manages; the simulation only ever
//! advances in fixed `SIM_DT` steps. A long frame (a stall, a breakpoint) is
//! clamped so it can't turn into a burst of catch-up ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, GameSession, TickInput, tick};
use crate::tuning::Tuning;

/// Turns variable frame deltas into a count of fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's worth of time and return how many steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    /// Fraction of a step left over, for interpolated drawing
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }
}

/// Anything that shows the session after an update (renderer, HUD, log)
pub trait Presenter {
    fn present(&mut self, session: &GameSession, events: &[GameEvent]);
}

/// Owns a session and drives it one frame at a time
#[derive(Debug, Clone)]
pub struct GameLoop {
    session: GameSession,
    tuning: Tuning,
    clock: FrameClock,
    /// One-shot commands from a frame too short to run a step
    pending: Option<TickInput>,
}

impl GameLoop {
    pub fn new(session: GameSession, tuning: Tuning) -> Self {
        Self {
            session,
            tuning,
            clock: FrameClock::new(),
            pending: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn into_session(self) -> GameSession {
        self.session
    }

    /// Run the steps owed for `frame_dt`, then present.
    ///
    /// Pause, restart and depot actions apply to the first step only; held
    /// controls (movement, thrust, drill) apply to every step.
    pub fn frame(
        &mut self,
        frame_dt: f32,
        input: &TickInput,
        presenter: &mut impl Presenter,
    ) -> Vec<GameEvent> {
        let mut first = input.clone();
        if let Some(pending) = self.pending.take() {
            first.action = first.action.or(pending.action);
            first.pause |= pending.pause;
            first.restart |= pending.restart;
        }

        let steps = self.clock.advance(frame_dt);
        if steps == 0 {
            if first.action.is_some() || first.pause || first.restart {
                self.pending = Some(first);
            }
        } else {
            let held = input.held();
            tick(&mut self.session, &first, &self.tuning, SIM_DT);
            for _ in 1..steps {
                tick(&mut self.session, &held, &self.tuning, SIM_DT);
            }
        }

        let events = self.session.drain_events();
        presenter.present(&self.session, &events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[derive(Default)]
    struct Counter {
        frames: usize,
        events: usize,
        last_tick: u64,
    }

    impl Presenter for Counter {
        fn present(&mut self, session: &GameSession, events: &[GameEvent]) {
            self.frames += 1;
            self.events += events.len();
            self.last_tick = session.time_ticks;
        }
    }

    fn game_loop() -> GameLoop {
        let tuning = Tuning::default();
        GameLoop::new(GameSession::new(77, &tuning), tuning)
    }

    #[test]
    fn test_sixty_hz_frames_run_two_steps() {
        let mut clock = FrameClock::new();
        let total: u32 = (0..60).map(|_| clock.advance(1.0 / 60.0)).sum();
        assert_eq!(total, 120);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1.0 / 240.0), 0);
        assert!((clock.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(clock.advance(1.0 / 240.0), 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FrameClock::new();
        let steps = clock.advance(5.0);
        assert!(steps <= MAX_SUBSTEPS);
        assert!(steps >= MAX_SUBSTEPS - 1);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.advance(-1.0), 0);
    }

    #[test]
    fn test_frame_ticks_then_presents() {
        let mut gl = game_loop();
        let mut presenter = Counter::default();
        gl.frame(1.0 / 60.0, &TickInput::default(), &mut presenter);
        assert_eq!(presenter.frames, 1);
        assert_eq!(presenter.last_tick, 2);
        assert_eq!(gl.session().time_ticks, 2);
    }

    #[test]
    fn test_pause_applies_once_per_frame() {
        let mut gl = game_loop();
        let mut presenter = Counter::default();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        // Two steps this frame; toggling twice would unpause
        gl.frame(1.0 / 60.0, &pause, &mut presenter);
        assert_eq!(gl.session().phase, GamePhase::Paused);
    }

    #[test]
    fn test_one_shot_survives_empty_frame() {
        let mut gl = game_loop();
        let mut presenter = Counter::default();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        gl.frame(0.0, &pause, &mut presenter);
        assert_eq!(gl.session().phase, GamePhase::Playing);
        gl.frame(1.0 / 120.0, &TickInput::default(), &mut presenter);
        assert_eq!(gl.session().phase, GamePhase::Paused);
        assert_eq!(presenter.frames, 2);
    }

    #[test]
    fn test_events_reach_presenter() {
        let mut gl = game_loop();
        let mut presenter = Counter::default();
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        let events = gl.frame(1.0 / 120.0, &restart, &mut presenter);
        assert!(matches!(events.as_slice(), [GameEvent::Restarted { .. }]));
        assert_eq!(presenter.events, 1);
    }
}
