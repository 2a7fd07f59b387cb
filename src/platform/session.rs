//! Session driver
//!
//! Owns one run: the game state, the settings it was started with, the RNG
//! and the held input. Any scheduler can drive it by calling [`Session::frame`]
//! once per frame and [`Session::countdown_tick`] every
//! [`QUIZ_TICK_SECS`] while a quiz is open. Every mutation goes through
//! `&mut self`, so input handlers and the tick never work on a stale copy.

use rand_pcg::Pcg32;

use super::clock::FrameClock;
use crate::consts::*;
use crate::error::Error;
use crate::settings::GameSettings;
use crate::sim::rng::seeded;
use crate::sim::{
    GameEvent, GamePhase, GameState, TickInput, advance_quiz_clock, close_quiz, submit_answer,
    tick, toggle_pause,
};

pub struct Session {
    state: GameState,
    settings: GameSettings,
    rng: Pcg32,
    input: TickInput,
    clock: FrameClock,
    running: bool,
}

impl Session {
    pub fn new(settings: GameSettings, seed: u64) -> Self {
        let settings = settings.sanitized();
        log::info!(
            "New session: seed {} operators {:?}",
            seed,
            settings.operators.enabled()
        );
        Self {
            state: GameState::new(seed, &settings),
            settings,
            rng: seeded(seed),
            input: TickInput::default(),
            clock: FrameClock::new(),
            running: true,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn input(&self) -> &TickInput {
        &self.input
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame callbacks are needed while playing or quizzing
    pub fn wants_frames(&self) -> bool {
        self.running && matches!(self.state.phase, GamePhase::Playing | GamePhase::QuizActive)
    }

    /// The quiz countdown runs only during a quiz
    pub fn wants_countdown(&self) -> bool {
        self.running && self.state.phase == GamePhase::QuizActive
    }

    /// Advance by the time since the previous frame
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let dt = self.clock.delta(now_ms);
        self.step(dt)
    }

    /// Advance by a fixed `dt`
    pub fn step(&mut self, dt: f32) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        tick(&mut self.state, &self.input, &self.settings, dt, &mut self.rng)
    }

    /// One period of the quiz countdown
    pub fn countdown_tick(&mut self) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let events = advance_quiz_clock(&mut self.state, &self.settings, QUIZ_TICK_SECS);
        self.after_quiz_change();
        events
    }

    pub fn answer(&mut self, value: i32) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let events = submit_answer(&mut self.state, &self.settings, value);
        self.after_quiz_change();
        events
    }

    pub fn close_quiz(&mut self) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let events = close_quiz(&mut self.state);
        self.after_quiz_change();
        events
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let event = toggle_pause(&mut self.state);
        if event.is_some() {
            // Paused time must not show up as one long frame
            self.clock.reset();
            self.input = TickInput::default();
        }
        event.into_iter().collect()
    }

    /// Pause when the page is hidden
    pub fn auto_pause(&mut self, hidden: bool) -> Vec<GameEvent> {
        if hidden && self.state.phase == GamePhase::Playing {
            log::info!("Auto-paused (page hidden)");
            return self.toggle_pause();
        }
        Vec::new()
    }

    /// Keyboard press. Returns any events caused directly by the key.
    pub fn key_down(&mut self, key: &str) -> Vec<GameEvent> {
        match key {
            "ArrowLeft" | "a" | "A" => self.input.left = true,
            "ArrowRight" | "d" | "D" => self.input.right = true,
            "p" | "P" | " " => return self.toggle_pause(),
            "Escape" => {
                return if self.state.phase == GamePhase::QuizActive {
                    self.close_quiz()
                } else {
                    self.toggle_pause()
                };
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowLeft" | "a" | "A" => self.input.left = false,
            "ArrowRight" | "d" | "D" => self.input.right = false,
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.input.pointer_x = Some(x);
    }

    pub fn pointer_leave(&mut self) {
        self.input.pointer_x = None;
    }

    /// Start a fresh run with the same settings
    pub fn restart(&mut self, seed: u64) {
        self.state.restart(seed, &self.settings);
        self.rng = seeded(seed);
        self.input = TickInput::default();
        self.clock.reset();
        self.running = true;
    }

    /// Tear down: no further frames or countdown ticks change the state
    pub fn stop(&mut self) {
        self.running = false;
        self.input = TickInput::default();
        self.clock.reset();
        log::info!("Session stopped");
    }

    pub fn snapshot_json(&self) -> Result<String, Error> {
        self.state.to_json()
    }

    /// Leaving a quiz resumes play; skip the time spent answering
    fn after_quiz_change(&mut self) {
        if self.state.phase != GamePhase::QuizActive {
            self.clock.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bubble, BubbleKind, Operator};

    fn quiet() -> GameSettings {
        let mut settings = GameSettings::default();
        settings.spawn.base_hazard_bpm = 0.1;
        settings.spawn.max_hazard_bpm = 0.1;
        settings.spawn.op_bpm = 0.1;
        settings
    }

    /// Drop an addition bubble on the player and run one frame
    fn strike_operator(session: &mut Session) {
        let p = session.state.player;
        let id = session.state.next_entity_id();
        session.state.bubbles.push(Bubble::new(
            id,
            p,
            glam::Vec2::ZERO,
            BUBBLE_RADIUS,
            BubbleKind::Operator(Operator::Add),
            0.0,
        ));
        session.step(1.0 / 60.0);
    }

    #[test]
    fn test_frames_advance_with_clamp() {
        let mut session = Session::new(quiet(), 1);
        session.frame(0.0);
        session.frame(16.0);
        assert!((session.state().elapsed_time - 0.016).abs() < 1e-6);
        // Tab came back after ten seconds
        session.frame(10_016.0);
        assert!((session.state().elapsed_time - (0.016 + MAX_DT)).abs() < 1e-6);
    }

    #[test]
    fn test_keys_drive_input() {
        let mut session = Session::new(quiet(), 1);
        session.key_down("ArrowLeft");
        assert!(session.input().left);
        session.key_up("ArrowLeft");
        assert!(!session.input().left);
    }

    #[test]
    fn test_pause_clears_input_and_stops_frames() {
        let mut session = Session::new(quiet(), 1);
        session.key_down("ArrowRight");
        let events = session.key_down("p");
        assert_eq!(events, vec![GameEvent::Paused]);
        assert!(!session.input().right);
        assert!(!session.wants_frames());
        assert_eq!(session.key_down(" "), vec![GameEvent::Resumed]);
        assert!(session.wants_frames());
    }

    #[test]
    fn test_auto_pause_only_when_hidden() {
        let mut session = Session::new(quiet(), 1);
        assert!(session.auto_pause(false).is_empty());
        assert_eq!(session.auto_pause(true), vec![GameEvent::Paused]);
        // Already paused; hiding again must not resume
        assert!(session.auto_pause(true).is_empty());
        assert_eq!(session.state().phase, GamePhase::Paused);
    }

    #[test]
    fn test_stop_cancels_updates() {
        let mut session = Session::new(quiet(), 1);
        session.frame(0.0);
        session.stop();
        assert!(session.frame(16.0).is_empty());
        assert!(session.countdown_tick().is_empty());
        assert_eq!(session.state().elapsed_time, 0.0);
        assert!(!session.wants_frames());
        assert!(!session.wants_countdown());
    }

    #[test]
    fn test_input_ignored_after_stop() {
        let mut session = Session::new(quiet(), 1);
        strike_operator(&mut session);
        assert_eq!(session.state().phase, GamePhase::QuizActive);
        let answer = session.state().quiz.as_ref().and_then(|q| q.current()).map(|p| p.answer).unwrap();

        session.stop();
        let before = session.snapshot_json().unwrap();
        assert!(session.answer(answer).is_empty());
        assert!(session.close_quiz().is_empty());
        assert!(session.toggle_pause().is_empty());
        assert!(session.key_down("Escape").is_empty());
        assert!(session.key_down("p").is_empty());
        assert_eq!(session.snapshot_json().unwrap(), before);
    }

    #[test]
    fn test_quiz_countdown_and_escape() {
        let mut session = Session::new(quiet(), 1);
        strike_operator(&mut session);
        assert!(session.wants_countdown());

        session.countdown_tick();
        let remaining = session.state().quiz.as_ref().map(|q| q.time_remaining).unwrap();
        assert!((remaining - (15.0 - QUIZ_TICK_SECS)).abs() < 1e-5);

        // Escape closes the quiz instead of pausing
        session.key_down("Escape");
        assert_eq!(session.state().phase, GamePhase::Playing);
        assert_eq!(session.state().lives, STARTING_LIVES);
    }

    #[test]
    fn test_restart_replays_seed() {
        let mut session = Session::new(GameSettings::default(), 5);
        for _ in 0..600 {
            session.step(1.0 / 60.0);
        }
        let first = session.snapshot_json().unwrap();
        session.restart(5);
        for _ in 0..600 {
            session.step(1.0 / 60.0);
        }
        assert_eq!(session.snapshot_json().unwrap(), first);
    }
}
