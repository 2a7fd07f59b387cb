//! Platform layer
//!
//! Everything between the simulation and whatever drives it:
//! - Frame timing with delta clamping
//! - Session ownership of state, settings, RNG and held input
//! - Timer bookkeeping that cancels pending callbacks on teardown
//! - Browser bindings (requestAnimationFrame, countdown interval, keyboard,
//!   visibility) on wasm32

pub mod clock;
pub mod session;
pub mod timers;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::FrameClock;
pub use session::Session;
pub use timers::{TimerHost, Timers};
