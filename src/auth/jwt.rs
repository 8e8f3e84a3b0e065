//! Unverified inspection of access tokens
//!
//! The client holds no signing key, so these helpers only read claims for
//! display. Authorization decisions never depend on them.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims issued by the backend's JWT layer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Expiration time
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
    /// Backend user primary key
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Check if token is expired; tokens without `exp` never expire
    pub fn is_expired(&self) -> bool {
        self.exp
            .map(|exp| Utc::now().timestamp() > exp)
            .unwrap_or(false)
    }
}

/// Decode the claims of a token without checking its signature
pub fn peek_claims(token: &str) -> Result<AccessClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| Error::Other(format!("Unreadable token: {}", e)))
}
