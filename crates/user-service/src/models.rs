//! User service models.

use chrono::{DateTime, Utc};
use common::Entity;
use serde::{Deserialize, Serialize};

/// Role assigned when a new user does not specify one.
pub const DEFAULT_ROLE: &str = "user";

/// Account status. Only `Active` users may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }

    /// Exact, lowercase match.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "suspended" => Some(UserStatus::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The two accounts every fresh process starts with.
pub fn seed_users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            role: "user".to_string(),
            status: UserStatus::Active,
            created_at: None,
            updated_at: None,
            last_login: Some(now),
        },
        User {
            id: "2".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            role: "admin".to_string(),
            status: UserStatus::Active,
            created_at: None,
            updated_at: None,
            last_login: Some(now),
        },
    ]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Partial update. Absent or empty fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl SearchParams {
    /// Case-insensitive: `query` is a substring of name or email, `role`
    /// and `status` must match exactly.
    pub fn matches(&self, user: &User) -> bool {
        if let Some(query) = non_empty(&self.query) {
            let query = query.to_lowercase();
            if !user.name.to_lowercase().contains(&query)
                && !user.email.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        if let Some(role) = non_empty(&self.role) {
            if !user.role.eq_ignore_ascii_case(role) {
                return false;
            }
        }
        if let Some(status) = non_empty(&self.status) {
            if !user.status.as_str().eq_ignore_ascii_case(status) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub last_login: DateTime<Utc>,
}

/// `Some` only for a present, non-empty string.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
