//! Browser driver
//!
//! Exposes [`WebGame`] to JavaScript. The page owns the canvas, HUD and
//! keypad; this side runs the frame loop and the quiz countdown and pushes a
//! JSON snapshot plus the frame's events to a callback after every change.
//!
//! Both timers are cancelled as soon as the session stops wanting them
//! (pause, game over, stop) and when the page frees the handle, so nothing
//! updates the state after teardown.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;

use super::session::Session;
use super::timers::{TimerHost, Timers};
use crate::highscores::HighScores;
use crate::settings::GameSettings;
use crate::sim::GameEvent;

type Shared = Rc<RefCell<Driver>>;

struct Driver {
    session: Session,
    high_scores: HighScores,
    /// `(state_json, events_json)` receiver
    on_update: Option<js_sys::Function>,
    /// Cancelled on drop, before the countdown closure goes away
    timers: Timers<BrowserTimers>,
    listeners_installed: bool,
}

/// `requestAnimationFrame` and `setInterval` on the page window
struct BrowserTimers {
    driver: Weak<RefCell<Driver>>,
    /// Reused for every `setInterval`
    countdown: Closure<dyn FnMut()>,
}

impl TimerHost for BrowserTimers {
    fn request_frame(&mut self) -> Option<i32> {
        let window = web_sys::window()?;
        let weak = self.driver.clone();
        let closure = Closure::once(move |time: f64| on_frame(&weak, time));
        let id = match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                None
            }
        };
        closure.forget();
        id
    }

    fn cancel_frame(&mut self, id: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }

    fn start_interval(&mut self, period_ms: i32) -> Option<i32> {
        let window = web_sys::window()?;
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            self.countdown.as_ref().unchecked_ref(),
            period_ms,
        ) {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("setInterval failed: {:?}", e);
                None
            }
        }
    }

    fn clear_interval(&mut self, id: i32) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(id);
        }
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Math Dodge core loaded");
}

/// Game handle for the page
#[wasm_bindgen]
pub struct WebGame {
    shared: Shared,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a run. Without `settings_json` the stored settings are used.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>, seed: f64) -> Result<WebGame, JsValue> {
        let settings = match settings_json {
            Some(json) => GameSettings::from_json(&json).map_err(to_js)?,
            None => GameSettings::load(),
        };
        let seed = seed as u64;
        log::info!("Game initialized with seed: {}", seed);
        let session = Session::new(settings, seed);
        let high_scores = HighScores::load();
        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Driver>>| {
            let countdown_weak = weak.clone();
            let countdown = Closure::<dyn FnMut()>::new(move || on_countdown(&countdown_weak));
            RefCell::new(Driver {
                session,
                high_scores,
                on_update: None,
                timers: Timers::new(BrowserTimers {
                    driver: weak.clone(),
                    countdown,
                }),
                listeners_installed: false,
            })
        });

        Ok(WebGame { shared })
    }

    /// Register `callback(stateJson, eventsJson)`
    pub fn set_on_update(&self, callback: js_sys::Function) {
        self.shared.borrow_mut().on_update = Some(callback);
    }

    /// Install keyboard and visibility listeners and start the loop
    pub fn start(&self) -> Result<(), JsValue> {
        let install = !self.shared.borrow().listeners_installed;
        if install {
            install_listeners(&self.shared)?;
            self.shared.borrow_mut().listeners_installed = true;
        }
        sync_timers(&self.shared);
        Ok(())
    }

    /// Stop the loop and the countdown
    pub fn stop(&self) {
        with_session(&self.shared, |s| {
            s.stop();
            Vec::new()
        });
    }

    pub fn toggle_pause(&self) {
        with_session(&self.shared, Session::toggle_pause);
    }

    pub fn answer(&self, value: i32) {
        with_session(&self.shared, |s| s.answer(value));
    }

    pub fn close_quiz(&self) {
        with_session(&self.shared, Session::close_quiz);
    }

    pub fn restart(&self, seed: f64) {
        with_session(&self.shared, |s| {
            s.restart(seed as u64);
            Vec::new()
        });
    }

    pub fn pointer_move(&self, x: f32) {
        self.shared.borrow_mut().session.pointer_move(x);
    }

    pub fn pointer_leave(&self) {
        self.shared.borrow_mut().session.pointer_leave();
    }

    /// Current state as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.shared.borrow().session.snapshot_json().map_err(to_js)
    }

    pub fn high_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.shared.borrow().high_scores).map_err(to_js)
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Apply a session mutation, then publish and resync the timers
fn with_session(shared: &Shared, f: impl FnOnce(&mut Session) -> Vec<GameEvent>) {
    let events = f(&mut shared.borrow_mut().session);
    publish(shared, events);
    sync_timers(shared);
}

/// Record high scores and hand the snapshot to the page.
///
/// The callback runs with no borrow held, so it may call back into
/// [`WebGame`].
fn publish(shared: &Shared, events: Vec<GameEvent>) {
    let (callback, state_json, events_json) = {
        let mut d = shared.borrow_mut();
        let now = js_sys::Date::now();
        for event in &events {
            if d.high_scores.record(event, now).is_some() {
                d.high_scores.save();
            }
        }
        let state_json = match d.session.snapshot_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Snapshot failed: {}", e);
                return;
            }
        };
        let events_json = serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string());
        (d.on_update.clone(), state_json, events_json)
    };

    if let Some(callback) = callback {
        let result = callback.call2(
            &JsValue::NULL,
            &JsValue::from_str(&state_json),
            &JsValue::from_str(&events_json),
        );
        if let Err(e) = result {
            log::error!("Update callback threw: {:?}", e);
        }
    }
}

/// Start or cancel the frame loop and countdown to match the session
fn sync_timers(shared: &Shared) {
    let mut d = shared.borrow_mut();
    let (wants_frames, wants_countdown) = (d.session.wants_frames(), d.session.wants_countdown());
    d.timers.sync(wants_frames, wants_countdown);
}

fn on_frame(weak: &Weak<RefCell<Driver>>, time: f64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let events = {
        let mut d = shared.borrow_mut();
        d.timers.frame_fired();
        d.session.frame(time)
    };
    publish(&shared, events);
    sync_timers(&shared);
}

fn on_countdown(weak: &Weak<RefCell<Driver>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    with_session(&shared, Session::countdown_tick);
}

fn install_listeners(shared: &Shared) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Keyboard
    {
        let weak = Rc::downgrade(shared);
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let key = event.key();
            if matches!(key.as_str(), "ArrowLeft" | "ArrowRight" | " ") {
                event.prevent_default();
            }
            if event.repeat() {
                return;
            }
            with_session(&shared, |s| s.key_down(&key));
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let weak = Rc::downgrade(shared);
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.borrow_mut().session.key_up(&event.key());
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Auto-pause when the tab is hidden
    {
        let weak = Rc::downgrade(shared);
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            with_session(&shared, |s| s.auto_pause(hidden));
        });
        document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        )?;
        closure.forget();
    }

    Ok(())
}
