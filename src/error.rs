//! Error types for EduLog

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'edulog init' first.")]
    ConfigNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Student session is incomplete")]
    IncompleteSession,

    #[error("Not authorized to open '{0}'")]
    Unauthorized(String),

    #[error("Unknown user role '{0}'")]
    UnknownRole(String),

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error ended (or requires ending) the current session
    pub fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials(_)
                | Error::NotAuthenticated
                | Error::NoRefreshToken
                | Error::RefreshFailed(_)
                | Error::SessionExpired
                | Error::IncompleteSession
        )
    }

    /// HTTP status for backend errors, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
