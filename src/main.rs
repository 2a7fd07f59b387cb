//! Math Dodge entry point
//!
//! The browser build is driven from JavaScript through `platform::web`. The
//! native binary runs a headless session at a fixed 60 Hz with a simple
//! autopilot, which is handy for tuning settings files.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use math_dodge::consts::*;
    use math_dodge::platform::Session;
    use math_dodge::sim::{BubbleKind, GameEvent, GamePhase, GameState, TickInput};
    use math_dodge::{GameSettings, HighScores, Preset};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Frames per quiz countdown period
    const FRAMES_PER_COUNTDOWN: u32 = 6;
    /// The autopilot "thinks" this long before answering
    const ANSWER_DELAY_SECS: f32 = 1.2;
    /// Every n-th answer is deliberately wrong
    const WRONG_EVERY: u32 = 5;

    #[derive(Parser, Debug)]
    #[command(name = "math-dodge")]
    #[command(about = "Headless Math Dodge run with an autopilot")]
    struct Args {
        /// Settings JSON file (defaults when omitted)
        settings: Option<PathBuf>,

        /// Run seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Simulated play time in seconds
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,

        /// Preset applied on top of the settings (7_table, 8_table, 9_table, warmup_2_5)
        #[arg(long, value_parser = parse_preset)]
        preset: Option<Preset>,

        /// High score file
        #[arg(long, default_value = "math-dodge-scores.json")]
        scores: PathBuf,
    }

    fn parse_preset(name: &str) -> Result<Preset, String> {
        Preset::from_name(name).ok_or_else(|| format!("unknown preset {}", name))
    }

    /// Steer away from the closest falling hazard, otherwise toward an
    /// operator bubble, otherwise drift back to the middle
    fn autopilot(state: &GameState) -> TickInput {
        let px = state.player.x;
        let reach = PLAYER_SIZE * 0.5 + BUBBLE_RADIUS * 1.5;

        let threat = state
            .bubbles
            .iter()
            .filter(|b| b.is_hazard() && b.pos.y < state.player.y && state.player.y - b.pos.y < 220.0)
            .filter(|b| (b.pos.x - px).abs() < reach + b.radius)
            .min_by(|a, b| b.pos.y.total_cmp(&a.pos.y));

        let target = match threat {
            Some(hazard) => {
                // Run toward the roomier side
                if hazard.pos.x > px || (hazard.pos.x == px && px > CANVAS_WIDTH * 0.5) {
                    px - 60.0
                } else {
                    px + 60.0
                }
            }
            None => state
                .bubbles
                .iter()
                .filter(|b| !b.is_hazard() && b.pos.y < state.player.y)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|b| b.pos.x)
                .unwrap_or(CANVAS_WIDTH * 0.5),
        };

        let dx = target - px;
        TickInput {
            left: dx < -4.0,
            right: dx > 4.0,
            pointer_x: None,
        }
    }

    pub fn run() -> i32 {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let options = Args::parse();

        let mut settings = match &options.settings {
            Some(path) => match GameSettings::load_from_path(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("Could not load {}: {}", path.display(), e);
                    return 1;
                }
            },
            None => GameSettings::default(),
        };
        if let Some(preset) = options.preset {
            log::info!("Applying preset {}", preset.as_str());
            settings.apply_preset(preset);
        }

        log::info!("Math Dodge (headless) starting, seed {}", options.seed);
        let mut session = Session::new(settings, options.seed);

        let mut answered = 0u32;
        let mut quizzes = 0u32;
        let mut near_misses = 0u32;
        let mut hazard_hits = 0u32;
        let mut game_over = None;
        let frames = (options.seconds / FRAME_DT) as u64;

        for frame in 0..frames {
            let mut events = Vec::new();
            match session.state().phase {
                GamePhase::Playing => {
                    let input = autopilot(session.state());
                    session.key_up("ArrowLeft");
                    session.key_up("ArrowRight");
                    if input.left {
                        session.key_down("ArrowLeft");
                    }
                    if input.right {
                        session.key_down("ArrowRight");
                    }
                    events.extend(session.step(FRAME_DT));
                }
                GamePhase::QuizActive => {
                    if frame % FRAMES_PER_COUNTDOWN as u64 == 0 {
                        events.extend(session.countdown_tick());
                    }
                    let ready = session
                        .state()
                        .quiz
                        .as_ref()
                        .and_then(|q| q.current().map(|p| (q.time_used, p.answer)));
                    if let Some((time_used, answer)) = ready {
                        if time_used >= ANSWER_DELAY_SECS {
                            answered += 1;
                            let guess = if answered % WRONG_EVERY == 0 { answer + 1 } else { answer };
                            events.extend(session.answer(guess));
                        }
                    }
                }
                GamePhase::Paused | GamePhase::GameOver => break,
            }

            for event in events {
                match event {
                    GameEvent::QuizStarted { .. } => quizzes += 1,
                    GameEvent::NearMiss { .. } => near_misses += 1,
                    GameEvent::Collision { kind: BubbleKind::Hazard } => hazard_hits += 1,
                    GameEvent::GameOver { .. } => game_over = Some(event),
                    _ => {}
                }
            }
        }

        let state = session.state();
        log::info!(
            "Finished after {:.1}s: score {} lives {} best streak {} quizzes {} hazard hits {} near misses {}",
            state.elapsed_time,
            state.score,
            state.lives,
            state.best_streak,
            quizzes,
            hazard_hits,
            near_misses
        );

        let final_event = game_over.unwrap_or(GameEvent::GameOver {
            final_score: state.score,
            best_streak: state.best_streak,
        });
        let mut scores = match HighScores::load_from(&options.scores) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Ignoring unreadable high scores: {}", e);
                HighScores::new()
            }
        };
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        if scores.record(&final_event, timestamp).is_some() {
            if let Err(e) = scores.save_to(&options.scores) {
                log::warn!("Could not save high scores: {}", e);
            }
        }
        if let Some(top) = scores.top_score() {
            log::info!("Top score: {}", top);
        }
        0
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    std::process::exit(headless::run());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
