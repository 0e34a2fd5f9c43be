//! Session store: authentication state, league cache and the actions that
//! mediate every identity and league call.

mod state;
mod store;

pub use state::{LeagueState, Session, SessionPhase};
pub use store::{ActionOutcome, Notice, NoticeLevel, SessionStore};
