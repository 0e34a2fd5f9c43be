//! Client-side navigation targets.

use std::fmt;

/// Every screen the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in form.
    Login,
    /// Account creation form.
    Signup,
    /// Request a password-reset code.
    ForgotPassword,
    /// Enter a reset code.
    OtpVerification,
    /// Choose a new password.
    ResetPassword,
    /// Landing page after login.
    Dashboard,
    /// League management.
    Leagues,
    /// Competition management.
    Competitions,
    /// Team management.
    Teams,
    /// Player management.
    Players,
    /// Club management.
    Clubs,
    /// Grade management.
    Grades,
    /// Fixture management.
    Fixtures,
    /// Catch-all for unknown paths.
    NotFound,
}

impl Route {
    /// Resolve a path. Unknown paths map to [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = trimmed.trim_end_matches('/');
        match normalized {
            "" | "/sign-up" | "/signup" => Route::Signup,
            "/login" => Route::Login,
            "/forgot-password" => Route::ForgotPassword,
            "/otp-verification" => Route::OtpVerification,
            "/reset-password" => Route::ResetPassword,
            "/dashboard" => Route::Dashboard,
            "/leagues" | "/league" => Route::Leagues,
            "/competitions" => Route::Competitions,
            "/teams" => Route::Teams,
            "/players" => Route::Players,
            "/clubs" => Route::Clubs,
            "/grades" => Route::Grades,
            "/fixtures" => Route::Fixtures,
            _ => Route::NotFound,
        }
    }

    /// Canonical path.
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/sign-up",
            Route::ForgotPassword => "/forgot-password",
            Route::OtpVerification => "/otp-verification",
            Route::ResetPassword => "/reset-password",
            Route::Dashboard => "/dashboard",
            Route::Leagues => "/leagues",
            Route::Competitions => "/competitions",
            Route::Teams => "/teams",
            Route::Players => "/players",
            Route::Clubs => "/clubs",
            Route::Grades => "/grades",
            Route::Fixtures => "/fixtures",
            Route::NotFound => "/404",
        }
    }

    /// Whether the route sits behind the auth guard.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::Leagues
                | Route::Competitions
                | Route::Teams
                | Route::Players
                | Route::Clubs
                | Route::Grades
                | Route::Fixtures
        )
    }

    /// Entity pages that have no editor yet.
    pub fn is_entity_placeholder(self) -> bool {
        matches!(
            self,
            Route::Competitions
                | Route::Teams
                | Route::Players
                | Route::Clubs
                | Route::Grades
                | Route::Fixtures
        )
    }

    /// Title shown in the header.
    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Sign Up",
            Route::ForgotPassword => "Forgot Password",
            Route::OtpVerification => "Verify Code",
            Route::ResetPassword => "Reset Password",
            Route::Dashboard => "Dashboard",
            Route::Leagues => "Leagues",
            Route::Competitions => "Competitions",
            Route::Teams => "Teams",
            Route::Players => "Players",
            Route::Clubs => "Clubs",
            Route::Grades => "Grades",
            Route::Fixtures => "Fixtures",
            Route::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_for_known_routes() {
        for route in [
            Route::Login,
            Route::Signup,
            Route::ForgotPassword,
            Route::OtpVerification,
            Route::ResetPassword,
            Route::Dashboard,
            Route::Leagues,
            Route::Competitions,
            Route::Teams,
            Route::Players,
            Route::Clubs,
            Route::Grades,
            Route::Fixtures,
        ] {
            assert_eq!(Route::parse(route.path()), route);
        }
    }

    #[test]
    fn entity_pages_are_protected() {
        for path in [
            "/competitions",
            "/teams/",
            "/players",
            "/clubs",
            "/grades",
            "/fixtures",
        ] {
            let route = Route::parse(path);
            assert_ne!(route, Route::NotFound, "{path} should resolve");
            assert!(route.is_protected(), "{path} should be guarded");
            assert!(route.is_entity_placeholder());
        }
        assert!(!Route::Leagues.is_entity_placeholder());
    }

    #[test]
    fn root_is_signup_and_unknown_is_not_found() {
        assert_eq!(Route::parse("/"), Route::Signup);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/teams/42"), Route::NotFound);
        assert!(!Route::NotFound.is_protected());
        assert!(Route::Leagues.is_protected());
    }
}
