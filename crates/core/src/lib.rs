#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Leaguedesk admin console.
//!
//! This crate hosts the backend client, the session store with its
//! persistence layer, route guarding, form validation and the league
//! table view-model used by the terminal UI and any future frontends.

pub mod api;
pub mod config;
pub mod guard;
pub mod leagues;
pub mod models;
pub mod persist;
pub mod routes;
pub mod session;
pub mod validation;

pub use config::AppConfig;
pub use guard::{AuthGuard, GuardDecision};
pub use leagues::{LeagueQuery, LeagueSort};
pub use models::{League, LeagueDraft, LeagueStatus, User};
pub use routes::Route;
pub use session::{ActionOutcome, Notice, NoticeLevel, Session, SessionPhase, SessionStore};
pub use validation::{FieldErrors, FormSchema};
