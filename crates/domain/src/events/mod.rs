//! Progression outcomes
//!
//! Return types from the progression rules, communicating what happened when
//! a user's state was modified so callers can report it.

mod progression_events;

pub use progression_events::*;
