use std::sync::Arc;

use crate::models::{League, User};

/// Where the session sits in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No identity held.
    #[default]
    Anonymous,
    /// A login or registration call is in flight.
    Authenticating,
    /// User and token held from a successful login.
    Authenticated,
    /// The last login or registration attempt failed.
    AuthError,
}

/// Authentication slice of the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    /// Signed-in account.
    pub user: Option<User>,
    /// Bearer token for authenticated calls.
    pub token: Option<String>,
    /// True iff user and token are held and the last login succeeded.
    pub is_authenticated: bool,
    /// An auth action is in flight.
    pub is_loading: bool,
    /// Message from the last failed auth action.
    pub error: Option<String>,
    pub(crate) phase: SessionPhase,
}

impl Session {
    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn sign_in(&mut self, user: User, token: String) {
        self.user = Some(user);
        self.token = Some(token);
        self.is_authenticated = true;
        self.error = None;
        self.phase = SessionPhase::Authenticated;
    }

    pub(crate) fn clear_identity(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.error = None;
        self.phase = SessionPhase::Anonymous;
    }
}

/// League cache slice of the store.
///
/// Entries are shared so untouched rows keep their identity across updates.
#[derive(Debug, Clone, Default)]
pub struct LeagueState {
    /// Cached leagues in display order.
    pub leagues: Vec<Arc<League>>,
    /// League opened in the detail view.
    pub current_league: Option<Arc<League>>,
    /// A league action is in flight.
    pub is_league_loading: bool,
    /// Message from the last failed league action.
    pub league_error: Option<String>,
}

impl LeagueState {
    /// Look up a cached league by server id.
    pub fn find(&self, server_id: &str) -> Option<&Arc<League>> {
        self.leagues
            .iter()
            .find(|league| league.server_id == server_id)
    }

    pub(crate) fn replace_all(&mut self, leagues: Vec<League>) {
        self.leagues = leagues.into_iter().map(Arc::new).collect();
    }

    pub(crate) fn set_current(&mut self, league: League) {
        self.current_league = Some(Arc::new(league));
    }

    pub(crate) fn prepend(&mut self, league: League) {
        self.leagues
            .retain(|existing| existing.server_id != league.server_id);
        self.leagues.insert(0, Arc::new(league));
    }

    pub(crate) fn replace(&mut self, server_id: &str, league: League) {
        let league = Arc::new(league);
        for slot in self
            .leagues
            .iter_mut()
            .filter(|existing| existing.server_id == server_id)
        {
            *slot = Arc::clone(&league);
        }
        if self
            .current_league
            .as_ref()
            .is_some_and(|current| current.server_id == server_id)
        {
            self.current_league = Some(league);
        }
    }

    pub(crate) fn remove(&mut self, server_id: &str) {
        self.leagues.retain(|league| league.server_id != server_id);
        if self
            .current_league
            .as_ref()
            .is_some_and(|current| current.server_id == server_id)
        {
            self.current_league = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.leagues.clear();
        self.current_league = None;
        self.league_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeagueStatus;

    fn league(server_id: &str, name: &str) -> League {
        League {
            server_id: server_id.to_string(),
            id: String::new(),
            name: name.to_string(),
            country: "England".to_string(),
            season: "2025".to_string(),
            competitions_count: 0,
            status: LeagueStatus::Active,
            description: None,
            created_by: "tester".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn replace_keeps_other_entries_identical() {
        let mut state = LeagueState::default();
        state.replace_all(vec![league("1", "A"), league("2", "B"), league("3", "C")]);
        let before = state.leagues.clone();

        state.replace("2", league("2", "B2"));

        assert_eq!(state.leagues[1].name, "B2");
        assert!(Arc::ptr_eq(&before[0], &state.leagues[0]));
        assert!(Arc::ptr_eq(&before[2], &state.leagues[2]));
    }

    #[test]
    fn prepend_does_not_duplicate() {
        let mut state = LeagueState::default();
        state.replace_all(vec![league("1", "A")]);
        state.prepend(league("1", "A again"));
        assert_eq!(state.leagues.len(), 1);
        assert_eq!(state.leagues[0].name, "A again");
    }

    #[test]
    fn remove_clears_matching_current_league() {
        let mut state = LeagueState::default();
        state.replace_all(vec![league("1", "A"), league("2", "B")]);
        state.set_current(league("2", "B"));

        state.remove("1");
        assert!(state.current_league.is_some());

        state.remove("2");
        assert!(state.leagues.is_empty());
        assert!(state.current_league.is_none());
    }
}
