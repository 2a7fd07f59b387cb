//! Frame and countdown timer bookkeeping
//!
//! Keeps the ids of the pending frame request and of the quiz countdown
//! interval so either can be cancelled the moment the session stops wanting
//! it. Dropping [`Timers`] cancels whatever is still scheduled, so a freed
//! game handle never leaves a live callback behind.

use crate::consts::QUIZ_TICK_SECS;

/// Whatever actually schedules callbacks (the browser window on wasm32)
pub trait TimerHost {
    /// Schedule one frame callback
    fn request_frame(&mut self) -> Option<i32>;
    fn cancel_frame(&mut self, id: i32);
    /// Start the repeating quiz countdown
    fn start_interval(&mut self, period_ms: i32) -> Option<i32>;
    fn clear_interval(&mut self, id: i32);
}

pub struct Timers<H: TimerHost> {
    host: H,
    frame_id: Option<i32>,
    interval_id: Option<i32>,
}

impl<H: TimerHost> Timers<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            frame_id: None,
            interval_id: None,
        }
    }

    /// Start or cancel each timer to match what the session wants
    pub fn sync(&mut self, wants_frames: bool, wants_countdown: bool) {
        match (wants_frames, self.frame_id) {
            (true, None) => self.frame_id = self.host.request_frame(),
            (false, Some(id)) => {
                self.host.cancel_frame(id);
                self.frame_id = None;
            }
            _ => {}
        }

        match (wants_countdown, self.interval_id) {
            (true, None) => {
                let period_ms = (QUIZ_TICK_SECS * 1000.0).round() as i32;
                self.interval_id = self.host.start_interval(period_ms);
            }
            (false, Some(id)) => {
                self.host.clear_interval(id);
                self.interval_id = None;
            }
            _ => {}
        }
    }

    /// The pending frame callback has run; its id is spent
    pub fn frame_fired(&mut self) {
        self.frame_id = None;
    }

    pub fn cancel_all(&mut self) {
        if let Some(id) = self.frame_id.take() {
            self.host.cancel_frame(id);
        }
        if let Some(id) = self.interval_id.take() {
            self.host.clear_interval(id);
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_id.is_some()
    }

    pub fn countdown_running(&self) -> bool {
        self.interval_id.is_some()
    }
}

impl<H: TimerHost> Drop for Timers<H> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use super::*;

    /// Live timer ids, shared so they can be inspected after a drop
    #[derive(Default)]
    struct Live {
        next_id: i32,
        frames: BTreeSet<i32>,
        intervals: BTreeSet<i32>,
        periods: Vec<i32>,
    }

    struct FakeHost(Rc<RefCell<Live>>);

    impl TimerHost for FakeHost {
        fn request_frame(&mut self) -> Option<i32> {
            let mut live = self.0.borrow_mut();
            live.next_id += 1;
            let id = live.next_id;
            live.frames.insert(id);
            Some(id)
        }

        fn cancel_frame(&mut self, id: i32) {
            self.0.borrow_mut().frames.remove(&id);
        }

        fn start_interval(&mut self, period_ms: i32) -> Option<i32> {
            let mut live = self.0.borrow_mut();
            live.next_id += 1;
            let id = live.next_id;
            live.intervals.insert(id);
            live.periods.push(period_ms);
            Some(id)
        }

        fn clear_interval(&mut self, id: i32) {
            self.0.borrow_mut().intervals.remove(&id);
        }
    }

    fn timers() -> (Timers<FakeHost>, Rc<RefCell<Live>>) {
        let live = Rc::new(RefCell::new(Live::default()));
        (Timers::new(FakeHost(live.clone())), live)
    }

    #[test]
    fn test_sync_starts_and_cancels() {
        let (mut timers, live) = timers();
        timers.sync(true, false);
        assert!(timers.frame_pending());
        assert!(!timers.countdown_running());

        // Quiz opens
        timers.sync(true, true);
        assert!(timers.countdown_running());
        assert_eq!(live.borrow().periods, vec![100]);

        // Paused
        timers.sync(false, false);
        assert!(live.borrow().frames.is_empty());
        assert!(live.borrow().intervals.is_empty());
    }

    #[test]
    fn test_sync_does_not_double_schedule() {
        let (mut timers, live) = timers();
        timers.sync(true, true);
        timers.sync(true, true);
        assert_eq!(live.borrow().frames.len(), 1);
        assert_eq!(live.borrow().intervals.len(), 1);

        // After the frame ran a new one is requested
        timers.frame_fired();
        timers.sync(true, true);
        assert!(timers.frame_pending());
        assert_eq!(live.borrow().intervals.len(), 1);
    }

    #[test]
    fn test_drop_clears_live_timers() {
        let (mut timers, live) = timers();
        timers.sync(true, true);
        assert_eq!(live.borrow().intervals.len(), 1);
        drop(timers);
        assert!(live.borrow().frames.is_empty());
        assert!(live.borrow().intervals.is_empty());
    }
}
