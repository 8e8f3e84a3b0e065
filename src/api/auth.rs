//! Login, registration and logout

use reqwest::{Method, StatusCode};
use tracing::info;

use super::client::{api_error, decode_json, ApiClient};
use super::models::{RegisterRequest, RegisterResponse};
use crate::auth::models::{LoginRequest, LoginResponse, Session};
use crate::auth::LogoutReason;
use crate::error::{Error, Result};

pub const LOGIN_PATH: &str = "/api/login/";
pub const REGISTER_PATH: &str = "/api/register/";

impl ApiClient {
    /// Authenticate and store the new session. Nothing is stored unless the
    /// backend answers with a known role.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.send_public(Method::POST, LOGIN_PATH, &request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(match api_error(response).await {
                Error::Api { message, .. } => Error::InvalidCredentials(message),
                other => other,
            });
        }

        let body: LoginResponse = decode_json(response).await?;
        let session = Session::from_login(body)?;
        self.session().store().set(&session)?;

        info!(role = %session.role, "Logged in");
        Ok(session)
    }

    /// Create an account. Validation failures come back as [`Error::Api`]
    /// with the field errors in `details`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        let response = self.send_public(Method::POST, REGISTER_PATH, request).await?;
        decode_json(response).await
    }

    /// End the session in this tab and every other open tab
    pub fn logout(&self) -> Result<()> {
        self.session().logout(LogoutReason::UserInitiated)
    }
}
