//! Route-level access control.

use crate::{routes::Route, session::Session};

/// What the frontend should do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is settling; show a neutral loading view and decide later.
    Loading,
    /// Render the requested route.
    Allow(Route),
    /// Go to `to`, remembering `from` for after login.
    Redirect {
        /// Login entry point.
        to: Route,
        /// Originally requested route.
        from: Route,
    },
}

impl GuardDecision {
    /// Where to land after a successful login given a remembered route.
    pub fn landing_after_login(from: Option<Route>) -> Route {
        match from {
            Some(route) if route.is_protected() => route,
            _ => Route::Dashboard,
        }
    }
}

/// Gate protected routes on session state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGuard;

impl AuthGuard {
    /// Decide how to handle a request for `requested`.
    pub fn evaluate(session: &Session, requested: Route) -> GuardDecision {
        if !requested.is_protected() {
            return GuardDecision::Allow(requested);
        }
        if session.is_loading {
            return GuardDecision::Loading;
        }
        if session.is_authenticated {
            GuardDecision::Allow(requested)
        } else {
            GuardDecision::Redirect {
                to: Route::Login,
                from: requested,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes_pass_through() {
        let session = Session {
            is_loading: true,
            ..Session::default()
        };
        assert_eq!(
            AuthGuard::evaluate(&session, Route::Login),
            GuardDecision::Allow(Route::Login)
        );
    }

    #[test]
    fn loading_session_defers_decision() {
        let session = Session {
            is_loading: true,
            is_authenticated: true,
            ..Session::default()
        };
        assert_eq!(
            AuthGuard::evaluate(&session, Route::Leagues),
            GuardDecision::Loading
        );
    }

    #[test]
    fn anonymous_visitor_is_redirected_with_memory() {
        let decision = AuthGuard::evaluate(&Session::default(), Route::Leagues);
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: Route::Login,
                from: Route::Leagues
            }
        );
        assert_eq!(
            GuardDecision::landing_after_login(Some(Route::Leagues)),
            Route::Leagues
        );
        assert_eq!(GuardDecision::landing_after_login(None), Route::Dashboard);
    }

    #[test]
    fn authenticated_session_is_allowed() {
        let session = Session {
            is_authenticated: true,
            ..Session::default()
        };
        assert_eq!(
            AuthGuard::evaluate(&session, Route::Dashboard),
            GuardDecision::Allow(Route::Dashboard)
        );
    }

    #[test]
    fn entity_pages_redirect_anonymous_visitors() {
        let decision = AuthGuard::evaluate(&Session::default(), Route::parse("/competitions"));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: Route::Login,
                from: Route::Competitions
            }
        );

        let session = Session {
            is_authenticated: true,
            ..Session::default()
        };
        assert_eq!(
            AuthGuard::evaluate(&session, Route::parse("/fixtures")),
            GuardDecision::Allow(Route::Fixtures)
        );
    }
}
