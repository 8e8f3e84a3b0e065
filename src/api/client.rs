//! HTTP client wrapper
//!
//! Every authenticated call goes through [`ApiClient::send`]: the bearer
//! token is read from the token store at send time, and a 401 triggers one
//! refresh followed by one retry of the same request. A second 401, or a
//! failed refresh, ends the session. A refresh that lands after the session
//! was ended or replaced is discarded and the request is not retried. Any
//! other status is handed back as is.

use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::models::{RefreshRequest, RefreshResponse};
use crate::auth::{LogoutReason, SessionContext};
use crate::config::Config;
use crate::error::{Error, Result};

pub const REFRESH_PATH: &str = "/token/refresh/";

/// An outgoing call, kept so it can be replayed after a refresh
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Client for the EduLog backend, bound to one tab's session
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionContext) -> Result<Self> {
        Url::parse(base_url).map_err(|_| Error::InvalidUrl(base_url.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("edulog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: SessionContext) -> Result<Self> {
        Self::new(&config.api.base_url, session)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|_| Error::InvalidUrl(raw.clone()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send an authenticated request, refreshing and retrying once on 401
    pub async fn send(&self, request: PendingRequest) -> Result<Response> {
        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(method = %request.method, path = %request.path, "401 received, refreshing access token");

        match self.refresh().await {
            Ok(_) => {}
            // The session ended or changed while the refresh was in flight
            Err(Error::NotAuthenticated) => {
                debug!(path = %request.path, "Session replaced during refresh, not retrying");
                return Err(Error::NotAuthenticated);
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                let _ = self.session.logout(LogoutReason::SessionExpired);
                return Err(e);
            }
        }

        let retry = self.dispatch(&request).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(self.expire_session());
        }
        Ok(retry)
    }

    /// Obtain a new access token with the stored refresh token. A rejected
    /// refresh clears the token store. Returns [`Error::NotAuthenticated`]
    /// without touching the store when the session no longer holds the
    /// refresh token that was used.
    pub async fn refresh(&self) -> Result<String> {
        let store = self.session.store();

        let Some(refresh) = store.refresh_token() else {
            let _ = store.clear();
            return Err(Error::NoRefreshToken);
        };

        let fail = |reason: String| {
            let _ = store.clear();
            Error::RefreshFailed(reason)
        };

        let url = self.url(REFRESH_PATH, &[])?;
        let response = match self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh.clone(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(fail(e.to_string())),
        };

        if !response.status().is_success() {
            return Err(fail(format!("refresh endpoint returned {}", response.status())));
        }

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => return Err(fail(e.to_string())),
        };

        store.update_access_token(&refresh, &body.access, body.refresh.as_deref())?;
        info!("Access token refreshed");
        Ok(body.access)
    }

    /// Send without a token and without the refresh path (login, register)
    pub async fn send_public<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path, &[])?;
        Ok(self.http.request(method, url).json(body).send().await?)
    }

    /// Send and decode a JSON body; non-2xx becomes [`Error::Api`]
    pub async fn request_json<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T> {
        let response = self.send(request).await?;
        decode_json(response).await
    }

    /// Send and discard the body; non-2xx becomes [`Error::Api`]
    pub async fn request_empty(&self, request: PendingRequest) -> Result<()> {
        let response = self.send(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(PendingRequest::get(path)).await
    }

    /// GET a list, degrading to empty on any failure
    pub async fn get_list_or_empty<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        match self.get_json::<Vec<T>>(path).await {
            Ok(items) => items,
            Err(e) => {
                debug!(path, "Optional fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn dispatch(&self, request: &PendingRequest) -> Result<Response> {
        let url = self.url(&request.path, &request.query)?;
        let mut builder = self.http.request(request.method.clone(), url);

        if let Some(token) = self.session.store().access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    fn expire_session(&self) -> Error {
        warn!("Request rejected after token refresh, ending session");
        let _ = self.session.logout(LogoutReason::SessionExpired);
        Error::SessionExpired
    }
}

/// Decode a successful JSON response or turn the failure into [`Error::Api`]
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(api_error(response).await)
    }
}

/// Build an [`Error::Api`] from a failed response, keeping the body as details
pub async fn api_error(response: Response) -> Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let details = serde_json::from_str::<serde_json::Value>(&text).ok();

    let message = details
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text.clone()
            }
        });

    Error::Api {
        status: status.as_u16(),
        message,
        details,
    }
}

/// Pull a human readable message out of a backend error body
fn error_message(body: &serde_json::Value) -> Option<String> {
    for key in ["error", "message", "detail"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }

    // Field errors: {"errors": {"email": ["..."]}} or {"email": ["..."]}
    let fields = body.get("errors").unwrap_or(body).as_object()?;
    fields.iter().find_map(|(field, value)| {
        let text = match value {
            serde_json::Value::Array(items) => items.first()?.as_str()?.to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => return None,
        };
        Some(format!("{}: {}", field, text))
    })
}
