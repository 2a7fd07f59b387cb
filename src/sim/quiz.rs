//! Quiz sub-flow
//!
//! Hitting an operator bubble freezes the field and asks a short run of
//! questions. Each question has its own countdown, advanced by a separate
//! periodic callback through [`advance_quiz_clock`].

use serde::{Deserialize, Serialize};

use super::arith::{Operator, Problem, generate_set_for_operator};
use super::rng::RandomSource;
use super::scoring::speed_score;
use super::state::{GameEvent, GamePhase, GameState};
use crate::settings::GameSettings;

/// Questions being answered after an operator collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    /// Operator of the bubble that started the quiz
    pub operator: Operator,
    pub problems: Vec<Problem>,
    pub current_index: usize,
    pub correct_count: usize,
    /// Seconds left on the current question
    pub time_remaining: f32,
    /// Seconds spent on the current question
    pub time_used: f32,
}

impl QuizSession {
    pub fn new(operator: Operator, problems: Vec<Problem>, time_limit: f32) -> Self {
        Self {
            operator,
            problems,
            current_index: 0,
            correct_count: 0,
            time_remaining: time_limit,
            time_used: 0.0,
        }
    }

    pub fn current(&self) -> Option<&Problem> {
        self.problems.get(self.current_index)
    }

    pub fn total(&self) -> usize {
        self.problems.len()
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.problems.len()
    }

    pub fn is_perfect(&self) -> bool {
        self.correct_count == self.problems.len()
    }

    fn next_question(&mut self, time_limit: f32) {
        self.current_index += 1;
        self.time_remaining = time_limit;
        self.time_used = 0.0;
    }
}

/// Build questions for the struck operator and enter `QuizActive`.
///
/// Returns `None` (and leaves the phase alone) when no problem could be
/// generated for the operator.
pub fn start_quiz(
    state: &mut GameState,
    settings: &GameSettings,
    operator: Operator,
    rng: &mut impl RandomSource,
) -> Option<GameEvent> {
    let n = settings.questions_per_collision as usize;
    let problems = generate_set_for_operator(rng, n, settings, operator);
    if problems.is_empty() {
        return None;
    }
    log::info!("Quiz started: {} x{}", operator, problems.len());
    state.spawner.note_quiz(state.elapsed_time);
    state.quiz = Some(QuizSession::new(
        operator,
        problems.clone(),
        settings.question_time_limit_seconds,
    ));
    state.phase = GamePhase::QuizActive;
    Some(GameEvent::QuizStarted { operator, problems })
}

/// Answer the current question
pub fn submit_answer(state: &mut GameState, settings: &GameSettings, value: i32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::QuizActive {
        return events;
    }
    let Some(quiz) = state.quiz.as_mut() else {
        return events;
    };
    let Some(problem) = quiz.current().copied() else {
        return events;
    };

    let limit = settings.question_time_limit_seconds;
    if problem.check_answer(value) {
        let points = speed_score(quiz.time_used, limit, &settings.scoring);
        quiz.correct_count += 1;
        quiz.next_question(limit);
        state.score += points as u64;
        state.extend_streak();
        events.push(GameEvent::QuizAnswered { correct: true, points, timed_out: false });
    } else {
        quiz.next_question(limit);
        state.lose_life();
        events.push(GameEvent::QuizAnswered { correct: false, points: 0, timed_out: false });
    }

    finish_if_done(state, &mut events, false);
    events
}

/// Remaining time at or below this counts as expired
const TIMEOUT_EPSILON: f32 = 1e-3;

/// Run the countdown; a question that runs out counts as wrong
pub fn advance_quiz_clock(state: &mut GameState, settings: &GameSettings, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::QuizActive {
        return events;
    }
    let Some(quiz) = state.quiz.as_mut() else {
        return events;
    };

    quiz.time_used += dt;
    quiz.time_remaining -= dt;
    // Repeated 0.1 s steps leave f32 residue just above zero
    if quiz.time_remaining > TIMEOUT_EPSILON {
        return events;
    }

    quiz.next_question(settings.question_time_limit_seconds);
    state.lose_life();
    events.push(GameEvent::QuizAnswered { correct: false, points: 0, timed_out: true });
    finish_if_done(state, &mut events, settings.fail_fast);
    events
}

/// Abandon the quiz without penalty
pub fn close_quiz(state: &mut GameState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::QuizActive {
        return events;
    }
    if let Some(quiz) = state.quiz.take() {
        log::info!(
            "Quiz closed after {} of {} questions",
            quiz.current_index,
            quiz.total()
        );
        events.push(GameEvent::QuizCompleted {
            correct: quiz.correct_count,
            total: quiz.total(),
            perfect: false,
        });
    }
    state.phase = GamePhase::Playing;
    events
}

/// Leave the quiz once every question is done, or right away when `force` is set
fn finish_if_done(state: &mut GameState, events: &mut Vec<GameEvent>, force: bool) {
    let done = state
        .quiz
        .as_ref()
        .is_none_or(|quiz| force || quiz.is_finished());
    if !done {
        return;
    }
    if let Some(quiz) = state.quiz.take() {
        let perfect = quiz.is_finished() && quiz.is_perfect();
        log::info!(
            "Quiz complete: {}/{} correct{}",
            quiz.correct_count,
            quiz.total(),
            if perfect { " (perfect)" } else { "" }
        );
        events.push(GameEvent::QuizCompleted {
            correct: quiz.correct_count,
            total: quiz.total(),
            perfect,
        });
    }
    if state.lives == 0 {
        events.push(state.end_run());
    } else {
        state.phase = GamePhase::Playing;
    }
}
