use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::state::{LeagueState, Session, SessionPhase};
use crate::{
    api::{ApiClient, ApiError, ApiResult, AuthSession, HttpTransport},
    config::AppConfig,
    models::{Credentials, League, LeagueDraft, SignupRequest},
    persist::{PersistedSession, SessionStorage},
};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const VERIFY_OTP_FAILED: &str = "OTP verification failed";
const RESEND_OTP_FAILED: &str = "Failed to resend OTP";
const FORGOT_PASSWORD_FAILED: &str = "Failed to send reset code";
const VERIFY_RESET_OTP_FAILED: &str = "Invalid or expired OTP";
const RESET_PASSWORD_FAILED: &str = "Password reset failed";
const FETCH_LEAGUES_FAILED: &str = "Failed to fetch leagues";
const FETCH_LEAGUE_FAILED: &str = "Failed to fetch league";
const CREATE_LEAGUE_FAILED: &str = "Failed to create league";
const UPDATE_LEAGUE_FAILED: &str = "Failed to update league";
const DELETE_LEAGUE_FAILED: &str = "Failed to delete league";

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An action completed.
    Success,
    /// Neutral information.
    Info,
    /// An action failed.
    Error,
}

/// Transient notification published by store actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub message: String,
}

/// Result handed back by actions whose caller branches navigation on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the backend accepted the call.
    pub success: bool,
    /// Failure message, mirrored into the store's `error`.
    pub error: Option<String>,
}

impl ActionOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    session: Session,
    leagues: LeagueState,
}

/// Single source of truth for authentication state and the league cache.
///
/// Cloning yields another handle to the same state. Every action marks its
/// slice as loading and clears that slice's error before calling the backend;
/// failures are written back as a message and never propagated. Concurrent
/// calls are not deduplicated: whichever response lands last wins.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreState>>,
    api: ApiClient,
    storage: Option<SessionStorage>,
    notices: Arc<RwLock<Option<mpsc::Sender<Notice>>>>,
}

impl SessionStore {
    /// Anonymous store with no durable storage.
    pub fn new(api: ApiClient) -> Self {
        Self::build(api, None, Session::default())
    }

    /// Store that restores from and writes back to `storage`.
    pub fn with_storage(api: ApiClient, storage: SessionStorage) -> Self {
        let session = storage.restore();
        if session.is_authenticated {
            info!(path = %storage.path().display(), "Restored persisted session");
        }
        Self::build(api, Some(storage), session)
    }

    /// Store talking HTTP to the configured backend, persisted under `storage_dir`.
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new(config)?;
        let api = ApiClient::new(Arc::new(transport));
        Ok(Self::with_storage(
            api,
            SessionStorage::new(&config.storage_dir),
        ))
    }

    fn build(api: ApiClient, storage: Option<SessionStorage>, session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState {
                session,
                leagues: LeagueState::default(),
            })),
            api,
            storage,
            notices: Arc::new(RwLock::new(None)),
        }
    }

    /// Route notices to `sender`. Delivery is best effort.
    pub fn attach_notices(&self, sender: mpsc::Sender<Notice>) {
        *self.notices.write() = Some(sender);
    }

    /// Snapshot of the authentication slice.
    pub fn session(&self) -> Session {
        self.inner.read().session.clone()
    }

    /// Snapshot of the league slice.
    pub fn leagues(&self) -> LeagueState {
        self.inner.read().leagues.clone()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().session.is_authenticated
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) {
        self.begin_auth(true);
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.login(&credentials).await {
            Ok(AuthSession { user, token }) => {
                info!(email = %user.email, "Login succeeded");
                {
                    let mut inner = self.inner.write();
                    inner.session.sign_in(user, token);
                    inner.session.is_loading = false;
                }
                self.persist();
                self.notify(NoticeLevel::Success, "Login successful");
            }
            Err(err) => {
                let message = err.message_or(LOGIN_FAILED);
                warn!(email = %credentials.email, %err, "Login failed");
                {
                    let mut inner = self.inner.write();
                    inner.session.clear_identity();
                    inner.session.error = Some(message.clone());
                    inner.session.phase = SessionPhase::AuthError;
                    inner.session.is_loading = false;
                }
                self.persist();
                self.notify(NoticeLevel::Error, message);
            }
        }
    }

    /// Create an account. Never signs the user in.
    pub async fn register(&self, request: &SignupRequest) -> ActionOutcome {
        let attempting = !self.is_authenticated();
        self.begin_auth(attempting);

        let result = self.api.signup(request).await;
        let outcome = self.settle_auth(
            result.map(|_| ()),
            REGISTER_FAILED,
            "Registration successful. Please log in.",
        );
        if attempting {
            self.inner.write().session.phase = if outcome.success {
                SessionPhase::Anonymous
            } else {
                SessionPhase::AuthError
            };
        }
        if outcome.success {
            info!(email = %request.email, "Account registered");
        }
        outcome
    }

    /// Confirm a new account's email. Marks the held user verified on success.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ActionOutcome {
        self.begin_auth(false);
        let result = self.api.verify_otp(email, otp).await;
        let outcome = self.settle_auth(result, VERIFY_OTP_FAILED, "Email verified");
        if outcome.success {
            let verified = {
                let mut inner = self.inner.write();
                match inner.session.user.as_mut() {
                    Some(user) if user.email.eq_ignore_ascii_case(email.trim()) => {
                        user.is_verified = true;
                        true
                    }
                    _ => false,
                }
            };
            if verified {
                self.persist();
            }
        }
        outcome
    }

    /// Ask the backend to send another code.
    pub async fn resend_otp(&self, email: &str) {
        self.begin_auth(false);
        let result = self.api.resend_otp(email).await;
        self.settle_auth(result, RESEND_OTP_FAILED, "A new code has been sent");
    }

    /// Start the password reset flow; the backend emails a code.
    pub async fn forgot_password(&self, email: &str) {
        self.begin_auth(false);
        let result = self.api.forgot_password(email).await;
        self.settle_auth(result, FORGOT_PASSWORD_FAILED, "Reset code sent to your email");
    }

    /// Check a password-reset code.
    pub async fn verify_reset_otp(&self, email: &str, otp: &str) -> ActionOutcome {
        self.begin_auth(false);
        let result = self.api.verify_reset_otp(email, otp).await;
        self.settle_auth(result, VERIFY_RESET_OTP_FAILED, "Code verified")
    }

    /// Set a new password. The user still has to log in afterwards.
    pub async fn reset_password(&self, email: &str, new_password: &str) {
        self.begin_auth(false);
        let result = self.api.reset_password(email, new_password).await;
        self.settle_auth(result, RESET_PASSWORD_FAILED, "Password reset successful");
    }

    /// Drop identity, token, error and the league cache. No network call.
    pub fn logout(&self) {
        {
            let mut inner = self.inner.write();
            inner.session.clear_identity();
            inner.leagues.clear();
        }
        self.persist();
        info!("Logged out");
        self.notify(NoticeLevel::Info, "Logged out");
    }

    /// Reset the auth error. Idempotent.
    pub fn clear_error(&self) {
        self.inner.write().session.error = None;
    }

    /// Replace the cache with the backend's league list.
    pub async fn get_all_leagues(&self) {
        let Some(token) = self.begin_league() else {
            return self.fail_league(ApiError::missing_token(), FETCH_LEAGUES_FAILED);
        };
        match self.api.list_leagues(&token).await {
            Ok(leagues) => {
                info!(count = leagues.len(), "Leagues loaded");
                self.finish_league(|state| state.replace_all(leagues));
            }
            Err(err) => self.fail_league(err, FETCH_LEAGUES_FAILED),
        }
    }

    /// Fetch one league into `current_league`.
    pub async fn get_league(&self, id: &str) {
        let Some(token) = self.begin_league() else {
            return self.fail_league(ApiError::missing_token(), FETCH_LEAGUE_FAILED);
        };
        match self.api.get_league(&token, id).await {
            Ok(league) => self.finish_league(|state| state.set_current(league)),
            Err(err) => self.fail_league(err, FETCH_LEAGUE_FAILED),
        }
    }

    /// Create a league and put the server's copy at the front of the cache.
    pub async fn create_league(&self, draft: &LeagueDraft) {
        let Some(token) = self.begin_league() else {
            return self.fail_league(ApiError::missing_token(), CREATE_LEAGUE_FAILED);
        };
        let draft = draft.for_create();
        match self.api.create_league(&token, &draft).await {
            Ok(league) => {
                info!(server_id = %league.server_id, name = %league.name, "League created");
                self.finish_league(|state| state.prepend(league));
                self.notify(NoticeLevel::Success, "League created successfully");
            }
            Err(err) => self.fail_league(err, CREATE_LEAGUE_FAILED),
        }
    }

    /// Patch a league and swap the canonical copy into the cache.
    pub async fn update_league(&self, id: &str, draft: &LeagueDraft) {
        let Some(token) = self.begin_league() else {
            return self.fail_league(ApiError::missing_token(), UPDATE_LEAGUE_FAILED);
        };
        match self.api.update_league(&token, id, draft).await {
            Ok(league) => {
                info!(server_id = %id, "League updated");
                self.finish_league(|state| state.replace(id, league));
                self.notify(NoticeLevel::Success, "League updated successfully");
            }
            Err(err) => self.fail_league(err, UPDATE_LEAGUE_FAILED),
        }
    }

    /// Delete a league and drop it from the cache.
    pub async fn delete_league(&self, id: &str) {
        let Some(token) = self.begin_league() else {
            return self.fail_league(ApiError::missing_token(), DELETE_LEAGUE_FAILED);
        };
        match self.api.delete_league(&token, id).await {
            Ok(()) => {
                info!(server_id = %id, "League deleted");
                self.finish_league(|state| state.remove(id));
                self.notify(NoticeLevel::Success, "League deleted successfully");
            }
            Err(err) => self.fail_league(err, DELETE_LEAGUE_FAILED),
        }
    }

    /// Reset the league error. Idempotent.
    pub fn clear_league_error(&self) {
        self.inner.write().leagues.league_error = None;
    }

    /// Look up a cached league by server id.
    pub fn cached_league(&self, server_id: &str) -> Option<Arc<League>> {
        self.inner.read().leagues.find(server_id).cloned()
    }

    fn begin_auth(&self, attempting: bool) {
        let mut inner = self.inner.write();
        inner.session.is_loading = true;
        inner.session.error = None;
        if attempting {
            inner.session.phase = SessionPhase::Authenticating;
        }
    }

    fn settle_auth(&self, result: ApiResult<()>, fallback: &str, success: &str) -> ActionOutcome {
        match result {
            Ok(()) => {
                self.inner.write().session.is_loading = false;
                self.notify(NoticeLevel::Success, success);
                ActionOutcome::ok()
            }
            Err(err) => {
                let message = err.message_or(fallback);
                warn!(%err, "{fallback}");
                {
                    let mut inner = self.inner.write();
                    inner.session.is_loading = false;
                    inner.session.error = Some(message.clone());
                }
                self.notify(NoticeLevel::Error, message.clone());
                ActionOutcome::failed(message)
            }
        }
    }

    /// Marks the league slice busy and returns the current token, if any.
    fn begin_league(&self) -> Option<String> {
        let mut inner = self.inner.write();
        inner.leagues.is_league_loading = true;
        inner.leagues.league_error = None;
        inner.session.token.clone()
    }

    fn finish_league(&self, apply: impl FnOnce(&mut LeagueState)) {
        let mut inner = self.inner.write();
        apply(&mut inner.leagues);
        inner.leagues.is_league_loading = false;
    }

    fn fail_league(&self, err: ApiError, fallback: &str) {
        let message = err.message_or(fallback);
        warn!(%err, "{fallback}");
        {
            let mut inner = self.inner.write();
            inner.leagues.is_league_loading = false;
            inner.leagues.league_error = Some(message.clone());
        }
        self.notify(NoticeLevel::Error, message);
    }

    fn persist(&self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        let record = PersistedSession::capture(&self.inner.read().session);
        if let Err(err) = storage.persist(&record) {
            warn!(?err, "Failed to persist session");
        }
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        if let Some(sender) = self.notices.read().as_ref() {
            let _ = sender.try_send(Notice {
                level,
                message: message.into(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{paths, testing::ScriptedTransport, Method},
        models::LeagueStatus,
    };
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "a@b.com",
            "role": "admin",
            "isVerified": false
        })
    }

    fn league_json(server_id: &str, name: &str) -> Value {
        json!({
            "_id": server_id,
            "id": server_id,
            "name": name,
            "country": "Y",
            "season": "2025",
            "competitionsCount": 0,
            "status": "Active",
            "createdBy": "u1",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        })
    }

    fn draft(name: &str) -> LeagueDraft {
        LeagueDraft {
            id: String::new(),
            name: name.to_string(),
            country: "Y".to_string(),
            season: "2025".to_string(),
            competitions_count: 0,
            status: LeagueStatus::Active,
            description: None,
        }
    }

    fn store_with(transport: &Arc<ScriptedTransport>) -> SessionStore {
        SessionStore::new(ApiClient::new(transport.clone()))
    }

    fn script_login(transport: &ScriptedTransport) {
        transport.respond(
            Method::Post,
            paths::LOGIN,
            200,
            json!({ "data": { "user": user_json() }, "token": "tok" }),
        );
    }

    async fn signed_in(transport: &Arc<ScriptedTransport>) -> SessionStore {
        script_login(transport);
        let store = store_with(transport);
        store.login("a@b.com", "secret12").await;
        assert!(store.is_authenticated());
        store
    }

    #[tokio::test]
    async fn successful_login_authenticates() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;

        let session = store.session();
        assert!(session.is_authenticated);
        assert!(session.error.is_none());
        assert!(!session.is_loading);
        assert_eq!(session.token.as_deref(), Some("tok"));
        assert_eq!(session.phase(), SessionPhase::Authenticated);
    }

    #[tokio::test]
    async fn rejected_login_surfaces_server_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            paths::LOGIN,
            401,
            json!({ "message": "Invalid credentials" }),
        );
        let store = store_with(&transport);
        store.login("a@b.com", "wrongpw").await;

        let session = store.session();
        assert_eq!(session.error.as_deref(), Some("Invalid credentials"));
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.phase(), SessionPhase::AuthError);
    }

    #[tokio::test]
    async fn network_failure_uses_fallback_and_drops_stale_identity() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;

        transport.fail(Method::Post, paths::LOGIN, "connection reset");
        store.login("a@b.com", "secret12").await;

        let session = store.session();
        assert_eq!(session.error.as_deref(), Some(LOGIN_FAILED));
        assert!(!session.is_authenticated);
        assert!(session.user.is_none());
        assert!(session.token.is_none());
    }

    #[tokio::test]
    async fn register_never_authenticates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            paths::SIGNUP,
            201,
            json!({ "data": { "user": user_json() }, "token": "tok" }),
        );
        let store = store_with(&transport);
        let outcome = store
            .register(&SignupRequest {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert!(outcome.success);
        let session = store.session();
        assert!(!session.is_authenticated);
        assert!(session.token.is_none());
        assert_eq!(session.phase(), SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn failed_register_reports_outcome() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            paths::SIGNUP,
            409,
            json!({ "message": "Email already registered" }),
        );
        let store = store_with(&transport);
        let outcome = store
            .register(&SignupRequest {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Email already registered"));
        assert_eq!(store.session().error, outcome.error);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [league_json("1", "A")] } }),
        );
        store.get_all_leagues().await;
        assert_eq!(store.leagues().leagues.len(), 1);

        store.logout();
        let session = store.session();
        assert!(session.user.is_none());
        assert!(session.token.is_none());
        assert!(!session.is_authenticated);
        assert!(store.leagues().leagues.is_empty());

        store.logout();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn verify_reset_otp_returns_outcome() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            paths::VERIFY_RESET_OTP,
            400,
            json!({ "message": "OTP expired" }),
        );
        let store = store_with(&transport);
        let outcome = store.verify_reset_otp("a@b.com", "123456").await;
        assert_eq!(outcome, ActionOutcome::failed("OTP expired".to_string()));

        transport.respond(Method::Post, paths::VERIFY_RESET_OTP, 200, json!({}));
        let outcome = store.verify_reset_otp("a@b.com", "123456").await;
        assert!(outcome.success);
        assert!(store.session().error.is_none());
    }

    #[tokio::test]
    async fn verify_otp_marks_user_verified() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(Method::Post, paths::VERIFY_OTP, 200, json!({}));

        let outcome = store.verify_otp("A@B.com", "123456").await;
        assert!(outcome.success);
        assert!(store.session().user.map(|u| u.is_verified).unwrap_or(false));
    }

    #[tokio::test]
    async fn password_flow_leaves_session_untouched() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Post, paths::FORGOT_PASSWORD, 200, json!({}));
        transport.respond(Method::Post, paths::RESEND_OTP, 200, json!({}));
        transport.respond(Method::Post, paths::RESET_PASSWORD, 200, json!({}));
        let store = store_with(&transport);

        store.forgot_password("a@b.com").await;
        store.resend_otp("a@b.com").await;
        store.reset_password("a@b.com", "N3w!pass").await;

        let session = store.session();
        assert!(!session.is_authenticated);
        assert!(session.error.is_none());
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn clear_error_is_idempotent() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = store_with(&transport);
        store.forgot_password("a@b.com").await;
        assert!(store.session().error.is_some());

        store.clear_error();
        store.clear_error();
        store.clear_league_error();
        store.clear_league_error();
        assert!(store.session().error.is_none());
        assert!(store.leagues().league_error.is_none());
    }

    #[tokio::test]
    async fn create_league_prepends_server_copy() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [league_json("9", "Existing")] } }),
        );
        transport.respond(
            Method::Post,
            paths::LEAGUES,
            201,
            json!({ "data": { "league": league_json("1", "X") } }),
        );
        store.get_all_leagues().await;
        let before = store.leagues().leagues.len();

        store.create_league(&draft("X")).await;

        let leagues = store.leagues().leagues;
        assert_eq!(leagues.len(), before + 1);
        assert_eq!(leagues[0].server_id, "1");
        assert_eq!(
            leagues.iter().filter(|l| l.server_id == "1").count(),
            1
        );
        let create = transport
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post && r.path == paths::LEAGUES)
            .unwrap();
        assert_eq!(create.bearer.as_deref(), Some("tok"));
        let sent_id = create
            .body
            .as_ref()
            .and_then(|body| body["id"].as_str())
            .unwrap_or_default();
        assert!(sent_id.starts_with("temp-"), "{sent_id}");
    }

    #[tokio::test]
    async fn update_league_replaces_only_matching_entry() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [league_json("1", "A"), league_json("2", "B")] } }),
        );
        transport.respond(
            Method::Get,
            &paths::league("2"),
            200,
            json!({ "data": { "league": league_json("2", "B") } }),
        );
        transport.respond(
            Method::Patch,
            &paths::league("2"),
            200,
            json!({ "data": { "league": league_json("2", "B renamed") } }),
        );
        store.get_all_leagues().await;
        store.get_league("2").await;
        let before = store.leagues();

        store.update_league("2", &draft("B renamed")).await;

        let after = store.leagues();
        assert!(Arc::ptr_eq(&before.leagues[0], &after.leagues[0]));
        assert_eq!(after.leagues[1].name, "B renamed");
        assert_eq!(
            after.current_league.as_ref().map(|l| l.name.as_str()),
            Some("B renamed")
        );
        assert!(!after.is_league_loading);
    }

    #[tokio::test]
    async fn delete_league_removes_entry_and_current() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [league_json("1", "A"), league_json("2", "B")] } }),
        );
        transport.respond(
            Method::Get,
            &paths::league("1"),
            200,
            json!({ "data": { "league": league_json("1", "A") } }),
        );
        transport.respond(Method::Delete, &paths::league("1"), 200, Value::Null);
        store.get_all_leagues().await;
        store.get_league("1").await;

        store.delete_league("1").await;

        let state = store.leagues();
        assert!(state.find("1").is_none());
        assert!(state.current_league.is_none());
        assert_eq!(state.leagues.len(), 1);
    }

    #[tokio::test]
    async fn league_failure_does_not_touch_auth_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            401,
            json!({ "message": "jwt expired" }),
        );
        store.get_all_leagues().await;

        assert_eq!(store.leagues().league_error.as_deref(), Some("jwt expired"));
        assert!(store.session().error.is_none());
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn auth_failure_does_not_touch_league_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            500,
            json!({ "message": "database offline" }),
        );
        store.get_all_leagues().await;
        assert_eq!(
            store.leagues().league_error.as_deref(),
            Some("database offline")
        );

        transport.respond(
            Method::Post,
            paths::LOGIN,
            401,
            json!({ "message": "Invalid credentials" }),
        );
        store.login("a@b.com", "wrongpw1").await;

        assert_eq!(store.session().error.as_deref(), Some("Invalid credentials"));
        assert_eq!(
            store.leagues().league_error.as_deref(),
            Some("database offline")
        );
    }

    #[tokio::test]
    async fn failed_league_writes_leave_cache_intact() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [league_json("1", "A"), league_json("2", "B")] } }),
        );
        transport.respond(
            Method::Get,
            &paths::league("1"),
            200,
            json!({ "data": { "league": league_json("1", "A") } }),
        );
        transport.respond(
            Method::Post,
            paths::LEAGUES,
            400,
            json!({ "message": "Name taken" }),
        );
        transport.respond(
            Method::Patch,
            &paths::league("1"),
            422,
            json!({ "message": "Bad season" }),
        );
        transport.respond(
            Method::Delete,
            &paths::league("1"),
            403,
            json!({ "message": "Forbidden" }),
        );
        store.get_all_leagues().await;
        store.get_league("1").await;
        let before = store.leagues();
        let Some(current) = before.current_league.clone() else {
            panic!("current league should be set");
        };

        let assert_untouched = |expected_error: &str| {
            let after = store.leagues();
            assert_eq!(after.leagues.len(), before.leagues.len());
            for (old, new) in before.leagues.iter().zip(&after.leagues) {
                assert!(Arc::ptr_eq(old, new));
            }
            assert!(after
                .current_league
                .as_ref()
                .is_some_and(|league| Arc::ptr_eq(league, &current)));
            assert!(!after.is_league_loading);
            assert_eq!(after.league_error.as_deref(), Some(expected_error));
        };

        store.create_league(&draft("A")).await;
        assert_untouched("Name taken");

        store.update_league("1", &draft("A renamed")).await;
        assert_untouched("Bad season");

        store.delete_league("1").await;
        assert_untouched("Forbidden");

        assert!(store.session().error.is_none());
    }

    #[tokio::test]
    async fn failed_get_league_keeps_current_selection() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = signed_in(&transport).await;
        transport.respond(
            Method::Get,
            &paths::league("1"),
            200,
            json!({ "data": { "league": league_json("1", "A") } }),
        );
        store.get_league("1").await;
        let Some(current) = store.leagues().current_league else {
            panic!("current league should be set");
        };

        store.get_league("9").await;
        let state = store.leagues();
        assert_eq!(state.league_error.as_deref(), Some("no route"));
        assert!(!state.is_league_loading);
        assert!(state
            .current_league
            .as_ref()
            .is_some_and(|league| Arc::ptr_eq(league, &current)));

        transport.fail(Method::Get, &paths::league("1"), "connection reset");
        store.get_league("1").await;
        assert_eq!(
            store.leagues().league_error.as_deref(),
            Some(FETCH_LEAGUE_FAILED)
        );
    }

    #[tokio::test]
    async fn league_actions_without_token_fail_locally() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = store_with(&transport);
        store.delete_league("1").await;

        assert_eq!(
            store.leagues().league_error.as_deref(),
            Some(DELETE_LEAGUE_FAILED)
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn notices_are_published() {
        let transport = Arc::new(ScriptedTransport::new());
        script_login(&transport);
        let store = store_with(&transport);
        let (tx, mut rx) = mpsc::channel(8);
        store.attach_notices(tx);

        store.login("a@b.com", "secret12").await;
        store.logout();

        assert_eq!(rx.recv().await.map(|n| n.level), Some(NoticeLevel::Success));
        assert_eq!(rx.recv().await.map(|n| n.level), Some(NoticeLevel::Info));
    }

    #[tokio::test]
    async fn login_is_persisted_and_logout_overwrites() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let transport = Arc::new(ScriptedTransport::new());
        script_login(&transport);
        let api = ApiClient::new(transport.clone());

        let store = SessionStore::with_storage(api.clone(), SessionStorage::new(dir.path()));
        store.login("a@b.com", "secret12").await;

        let reloaded = SessionStore::with_storage(api.clone(), SessionStorage::new(dir.path()));
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.session().token.as_deref(), Some("tok"));

        reloaded.logout();
        let after_logout = SessionStore::with_storage(api, SessionStorage::new(dir.path()));
        assert!(!after_logout.is_authenticated());
        Ok(())
    }
}
