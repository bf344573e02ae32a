//! Questbound Engine library.
//!
//! Server-side code for the Questbound quest and progression API.
//!
//! ## Structure
//!
//! - `entities/` - Typed record access over the record store
//! - `use_cases/` - Progression workflows and CRUD per area
//! - `infrastructure/` - Store adapters, clock, config and per-user locks
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod use_cases;

/// Shared helpers for unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
