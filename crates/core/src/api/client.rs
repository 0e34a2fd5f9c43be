use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::warn;

use super::{
    error::{ApiError, ApiResult},
    transport::{ApiRequest, Method, Transport},
};
use crate::models::{Credentials, League, LeagueDraft, SignupRequest, User};

/// Endpoint paths below the versioned API base.
pub mod paths {
    /// `POST` credentials, returns user and token.
    pub const LOGIN: &str = "/auth/login";
    /// `POST` new account.
    pub const SIGNUP: &str = "/auth/signup";
    /// `POST` email + code to confirm a new account.
    pub const VERIFY_OTP: &str = "/auth/verify-otp";
    /// `POST` email to send another code.
    pub const RESEND_OTP: &str = "/auth/resend-otp";
    /// `POST` email to start a password reset.
    pub const FORGOT_PASSWORD: &str = "/password/forgot-password";
    /// `POST` email + code to authorise a reset.
    pub const VERIFY_RESET_OTP: &str = "/password/verify-reset-otp";
    /// `POST` email + new password.
    pub const RESET_PASSWORD: &str = "/password/reset-password";
    /// League collection.
    pub const LEAGUES: &str = "/leagues";

    /// Path of a single league.
    pub fn league(id: &str) -> String {
        format!("{LEAGUES}/{id}")
    }
}

/// User and token returned by a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// Signed-in account.
    pub user: User,
    /// Bearer token for subsequent calls.
    pub token: String,
}

#[derive(Deserialize)]
struct AuthEnvelope {
    data: UserData,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct UserData {
    user: User,
}

#[derive(Deserialize)]
struct LeagueEnvelope {
    data: LeagueData,
}

#[derive(Deserialize)]
struct LeagueData {
    league: League,
}

#[derive(Deserialize)]
struct LeaguesEnvelope {
    data: LeaguesData,
}

#[derive(Deserialize)]
struct LeaguesData {
    #[serde(default)]
    leagues: Vec<League>,
}

/// Typed wrapper over a [`Transport`] for every backend endpoint.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Wrap a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a user and token.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthSession> {
        let request = ApiRequest::new(Method::Post, paths::LOGIN).json(to_body(credentials)?);
        let envelope: AuthEnvelope = decode(self.call(request).await?)?;
        let token = envelope
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::decode("login response carried no token"))?;
        Ok(AuthSession {
            user: envelope.data.user,
            token,
        })
    }

    /// Create an account. The returned user, if any, is informational only.
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<Option<User>> {
        let request = ApiRequest::new(Method::Post, paths::SIGNUP).json(to_body(request)?);
        let body = self.call(request).await?;
        Ok(serde_json::from_value::<AuthEnvelope>(body)
            .ok()
            .map(|envelope| envelope.data.user))
    }

    /// Confirm a new account's email with its code.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResult<()> {
        self.post_ack(paths::VERIFY_OTP, json!({ "email": email, "otp": otp }))
            .await
    }

    /// Ask for a fresh verification code.
    pub async fn resend_otp(&self, email: &str) -> ApiResult<()> {
        self.post_ack(paths::RESEND_OTP, json!({ "email": email }))
            .await
    }

    /// Start a password reset; the backend emails a code.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        self.post_ack(paths::FORGOT_PASSWORD, json!({ "email": email }))
            .await
    }

    /// Check a password-reset code.
    pub async fn verify_reset_otp(&self, email: &str, otp: &str) -> ApiResult<()> {
        self.post_ack(paths::VERIFY_RESET_OTP, json!({ "email": email, "otp": otp }))
            .await
    }

    /// Set a new password after a verified reset code.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> ApiResult<()> {
        self.post_ack(
            paths::RESET_PASSWORD,
            json!({ "email": email, "newPassword": new_password }),
        )
        .await
    }

    /// Fetch every league visible to the caller.
    pub async fn list_leagues(&self, token: &str) -> ApiResult<Vec<League>> {
        let request = ApiRequest::new(Method::Get, paths::LEAGUES).bearer(token);
        let envelope: LeaguesEnvelope = decode(self.call(request).await?)?;
        Ok(envelope.data.leagues)
    }

    /// Fetch a single league.
    pub async fn get_league(&self, token: &str, id: &str) -> ApiResult<League> {
        let request = ApiRequest::new(Method::Get, paths::league(id)).bearer(token);
        let envelope: LeagueEnvelope = decode(self.call(request).await?)?;
        Ok(envelope.data.league)
    }

    /// Create a league; the backend assigns `_id`.
    pub async fn create_league(&self, token: &str, draft: &LeagueDraft) -> ApiResult<League> {
        let request = ApiRequest::new(Method::Post, paths::LEAGUES)
            .bearer(token)
            .json(to_body(draft)?);
        let envelope: LeagueEnvelope = decode(self.call(request).await?)?;
        Ok(envelope.data.league)
    }

    /// Patch a league and return the canonical copy.
    pub async fn update_league(
        &self,
        token: &str,
        id: &str,
        draft: &LeagueDraft,
    ) -> ApiResult<League> {
        let request = ApiRequest::new(Method::Patch, paths::league(id))
            .bearer(token)
            .json(to_body(draft)?);
        let envelope: LeagueEnvelope = decode(self.call(request).await?)?;
        Ok(envelope.data.league)
    }

    /// Delete a league. The response body is ignored.
    pub async fn delete_league(&self, token: &str, id: &str) -> ApiResult<()> {
        let request = ApiRequest::new(Method::Delete, paths::league(id)).bearer(token);
        self.call(request).await.map(|_| ())
    }

    async fn post_ack(&self, path: &str, body: Value) -> ApiResult<()> {
        let request = ApiRequest::new(Method::Post, path).json(body);
        self.call(request).await.map(|_| ())
    }

    async fn call(&self, request: ApiRequest) -> ApiResult<Value> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            let err = ApiError::from_status(response.status, &response.body);
            warn!(%method, path = %path, status = response.status, "API call rejected: {}", err.detail);
            Err(err)
        }
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|err| ApiError::decode(format!("failed to encode body: {err}")))
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|err| ApiError::decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{testing::ScriptedTransport, ApiErrorKind};

    #[tokio::test]
    async fn login_requires_token_in_envelope() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            paths::LOGIN,
            200,
            json!({ "data": { "user": {
                "id": "u1", "firstName": "A", "lastName": "B",
                "email": "a@b.com", "role": "user"
            } } }),
        );
        let client = ApiClient::new(transport.clone());
        let err = client
            .login(&Credentials {
                email: "a@b.com".to_string(),
                password: "secret12".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].bearer.is_none());
        assert_eq!(sent[0].body.as_ref().unwrap()["email"], "a@b.com");
    }

    #[tokio::test]
    async fn league_calls_carry_bearer_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            paths::LEAGUES,
            200,
            json!({ "data": { "leagues": [] } }),
        );
        let client = ApiClient::new(transport.clone());
        let leagues = client.list_leagues("tok").await.unwrap();
        assert!(leagues.is_empty());
        assert_eq!(transport.requests()[0].bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn reset_password_sends_new_password_field() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Post, paths::RESET_PASSWORD, 200, json!({}));
        let client = ApiClient::new(transport.clone());
        client.reset_password("a@b.com", "N3w!pass").await.unwrap();
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["newPassword"], "N3w!pass");
    }
}
