//! Session and authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// User roles known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// School staff - roster, records, reports
    Admin,
    /// Student - clock-in/out and own statistics
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// A single stored session value. `key()` is the storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    AccessToken,
    RefreshToken,
    Role,
    StudentId,
    StudentName,
    TokenTimestamp,
}

impl SessionField {
    pub const ALL: [SessionField; 6] = [
        SessionField::AccessToken,
        SessionField::RefreshToken,
        SessionField::Role,
        SessionField::StudentId,
        SessionField::StudentName,
        SessionField::TokenTimestamp,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SessionField::AccessToken => "access_token",
            SessionField::RefreshToken => "refresh_token",
            SessionField::Role => "role",
            SessionField::StudentId => "student_id",
            SessionField::StudentName => "student_name",
            SessionField::TokenTimestamp => "token_timestamp",
        }
    }
}

/// The authenticated session of one tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    /// When the current access token was obtained
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a successful login response
    pub fn from_login(response: LoginResponse) -> crate::error::Result<Self> {
        let role: Role = response.role.parse()?;
        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            role,
            student_id: response.student_id.filter(|s| !s.is_empty()),
            student_name: response.student_name.filter(|s| !s.is_empty()),
            issued_at: Utc::now(),
        })
    }

    /// Storage representation, one entry per present field
    pub fn to_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        entries.insert(SessionField::AccessToken.key().to_string(), self.access_token.clone());
        entries.insert(SessionField::RefreshToken.key().to_string(), self.refresh_token.clone());
        entries.insert(SessionField::Role.key().to_string(), self.role.to_string());
        if let Some(id) = &self.student_id {
            entries.insert(SessionField::StudentId.key().to_string(), id.clone());
        }
        if let Some(name) = &self.student_name {
            entries.insert(SessionField::StudentName.key().to_string(), name.clone());
        }
        entries.insert(
            SessionField::TokenTimestamp.key().to_string(),
            self.issued_at.to_rfc3339(),
        );
        entries
    }

    /// Rebuild a session from storage. Returns None unless both tokens and a
    /// valid role are present.
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Option<Self> {
        let get = |field: SessionField| entries.get(field.key()).cloned();

        let issued_at = get(SessionField::TokenTimestamp)
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(Self {
            access_token: get(SessionField::AccessToken)?,
            refresh_token: get(SessionField::RefreshToken)?,
            role: get(SessionField::Role)?.parse().ok()?,
            student_id: get(SessionField::StudentId),
            student_name: get(SessionField::StudentName),
            issued_at,
        })
    }

    /// Home screen for this session's role
    pub fn landing_route(&self) -> &'static str {
        match self.role {
            Role::Admin => "/adminHome",
            Role::Student => "/studentHome",
        }
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a successful `POST /api/login/`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /token/refresh/`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Refresh response; `refresh` is only sent when the backend rotates tokens
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            role: Role::Student,
            student_id: Some("S001".to_string()),
            student_name: Some("Ada".to_string()),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert!(matches!("staff".parse::<Role>(), Err(Error::UnknownRole(r)) if r == "staff"));
    }

    #[test]
    fn test_entries_use_storage_keys() {
        let entries = student_session().to_entries();
        assert_eq!(entries.get("access_token").map(String::as_str), Some("access"));
        assert_eq!(entries.get("role").map(String::as_str), Some("student"));
        assert_eq!(entries.get("student_id").map(String::as_str), Some("S001"));
        assert!(entries.contains_key("token_timestamp"));
    }

    #[test]
    fn test_from_entries_requires_tokens_and_role() {
        let mut entries = student_session().to_entries();
        assert!(Session::from_entries(&entries).is_some());

        entries.insert("role".to_string(), "janitor".to_string());
        assert!(Session::from_entries(&entries).is_none());

        let mut entries = student_session().to_entries();
        entries.remove("refresh_token");
        assert!(Session::from_entries(&entries).is_none());
    }

    #[test]
    fn test_admin_login_has_no_student_identity() {
        let response = LoginResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            role: "admin".to_string(),
            student_id: None,
            student_name: None,
            message: Some("Login successful!".to_string()),
        };
        let session = Session::from_login(response).unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.student_id, None);
        assert_eq!(session.landing_route(), "/adminHome");
        assert!(!session.to_entries().contains_key("student_id"));
    }

    #[test]
    fn test_unknown_role_login_rejected() {
        let response = LoginResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            role: "guest".to_string(),
            student_id: None,
            student_name: None,
            message: None,
        };
        assert!(Session::from_login(response).is_err());
    }
}
