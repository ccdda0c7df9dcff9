// src/session/mod.rs

//! Quiz session lifecycle: `Loading -> Ready -> Submitting -> Terminated`.
//!
//! [`state`] and [`scoring`] are pure and hold every invariant of a session.
//! [`controller`] adds the store I/O and owns the per-session [`countdown`].

pub mod controller;
pub mod countdown;
pub mod scoring;
pub mod state;

pub use controller::SessionController;
pub use state::{Phase, SubmitTrigger};
