//! Shared domain models exchanged with the backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Regular console user.
    #[default]
    User,
}

/// Identity of the signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier; accepts `_id` on the wire.
    #[serde(alias = "_id")]
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Account role.
    #[serde(default)]
    pub role: Role,
    /// Whether the email address was confirmed with an OTP.
    #[serde(default)]
    pub is_verified: bool,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined for display.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Payload for creating a new account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

/// Publication state of a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LeagueStatus {
    /// Accepting competitions.
    #[default]
    Active,
    /// Season in progress.
    Ongoing,
    /// Season finished.
    Complete,
    /// Not yet published.
    Draft,
}

impl LeagueStatus {
    /// All statuses in display order.
    pub const ALL: [LeagueStatus; 4] = [
        LeagueStatus::Active,
        LeagueStatus::Ongoing,
        LeagueStatus::Complete,
        LeagueStatus::Draft,
    ];

    /// Label as sent on the wire.
    pub fn label(self) -> &'static str {
        match self {
            LeagueStatus::Active => "Active",
            LeagueStatus::Ongoing => "Ongoing",
            LeagueStatus::Complete => "Complete",
            LeagueStatus::Draft => "Draft",
        }
    }

    /// Status following this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for LeagueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// League record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    /// Server-assigned identifier; the cache key.
    #[serde(rename = "_id")]
    pub server_id: String,
    /// Human-facing identifier, may be empty.
    #[serde(default)]
    pub id: String,
    /// League name.
    pub name: String,
    /// Country the league plays in.
    pub country: String,
    /// Season label, e.g. `2025`.
    pub season: String,
    /// Number of competitions registered under the league.
    #[serde(default)]
    pub competitions_count: u32,
    /// Publication state.
    #[serde(default)]
    pub status: LeagueStatus,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Account that created the league.
    #[serde(default)]
    pub created_by: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl League {
    /// Identifier shown in tables: `id`, falling back to `_id`.
    pub fn display_id(&self) -> &str {
        if self.id.is_empty() {
            &self.server_id
        } else {
            &self.id
        }
    }
}

/// Editable league fields, used for both create and update bodies.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDraft {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub country: String,
    pub season: String,
    pub competitions_count: u32,
    pub status: LeagueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LeagueDraft {
    /// Copy for a create body. A blank `id` becomes `temp-<unix millis>`.
    pub fn for_create(&self) -> Self {
        let mut draft = self.clone();
        if draft.id.trim().is_empty() {
            draft.id = format!("temp-{}", Utc::now().timestamp_millis());
        }
        draft
    }
}

impl From<&League> for LeagueDraft {
    fn from(league: &League) -> Self {
        Self {
            id: league.id.clone(),
            name: league.name.clone(),
            country: league.country.clone(),
            season: league.season.clone(),
            competitions_count: league.competitions_count,
            status: league.status,
            description: league.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_accepts_mongo_style_id() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, Role::Admin);
        assert!(!user.is_verified);
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn league_display_id_falls_back_to_server_id() {
        let league: League = serde_json::from_value(json!({
            "_id": "abc",
            "name": "North",
            "country": "England",
            "season": "2025",
            "competitionsCount": 3,
            "status": "Ongoing"
        }))
        .unwrap();
        assert_eq!(league.display_id(), "abc");
        assert_eq!(league.status, LeagueStatus::Ongoing);
    }

    #[test]
    fn create_copy_fills_blank_id() {
        let draft = LeagueDraft {
            id: String::new(),
            name: "North".to_string(),
            country: "England".to_string(),
            season: "2025".to_string(),
            competitions_count: 0,
            status: LeagueStatus::Active,
            description: None,
        };
        let created = draft.for_create();
        assert!(created.id.starts_with("temp-"), "{}", created.id);
        assert_eq!(created.name, draft.name);

        let named = LeagueDraft {
            id: "07".to_string(),
            ..draft
        };
        assert_eq!(named.for_create().id, "07");
    }

    #[test]
    fn status_cycles_through_all_values() {
        let mut status = LeagueStatus::Active;
        for _ in 0..LeagueStatus::ALL.len() {
            status = status.next();
        }
        assert_eq!(status, LeagueStatus::Active);
    }
}
