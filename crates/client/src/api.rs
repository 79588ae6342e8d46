//! HTTP client for the three server calls the remote client makes:
//! catalog, restore, and session-check.
//!
//! Denials are surfaced as typed [`Denial`] values parsed from the
//! server's machine-readable `code` field, so callers can route to the
//! login flow vs. the subscribe flow without string-matching messages.

use std::sync::RwLock;

use knox_core::cookie::CookieDescriptor;
use serde::Deserialize;

/// Why the server refused a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Missing/invalid token or revoked session: force re-login and clear
    /// the local token.
    AuthenticationRequired,
    /// Authenticated but not entitled: route to the subscribe flow.
    SubscriptionRequired,
}

impl Denial {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "authentication_required" => Some(Self::AuthenticationRequired),
            "subscription_required" => Some(Self::SubscriptionRequired),
            _ => None,
        }
    }
}

/// Client-side failure of an API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request denied: {0:?}")]
    Denied(Denial),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected API response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// One service entry as the catalog reports it (no credential payload).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogService {
    pub code: String,
    pub name: String,
    pub is_maintenance: bool,
}

/// A category of services.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCategory {
    pub name: String,
    pub services: Vec<CatalogService>,
}

/// A top-level group of the grouped catalog response.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
    pub categories: Vec<CatalogCategory>,
}

/// Entitlement + profile summary from the session-check endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSummary {
    pub user: ProfileSummary,
    pub has_active_subscription: bool,
}

/// The profile fields the client UI renders.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct RestorePayload {
    cookies: Vec<CookieDescriptor>,
}

/// Bearer-token HTTP client for the knox API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    /// Replace (or clear) the bearer token used for subsequent calls.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// GET /api/v1/services -- the grouped catalog, never with payloads.
    pub async fn catalog(&self) -> Result<Vec<CatalogGroup>, ApiError> {
        let response = self
            .authorized(reqwest::Method::GET, "/api/v1/services")
            .send()
            .await?;
        Self::parse(response).await
    }

    /// POST /api/v1/restore -- fetch one service's credential descriptors.
    pub async fn restore(&self, service_code: &str) -> Result<Vec<CookieDescriptor>, ApiError> {
        let response = self
            .authorized(reqwest::Method::POST, "/api/v1/restore")
            .json(&serde_json::json!({ "service_code": service_code }))
            .send()
            .await?;
        let payload: RestorePayload = Self::parse(response).await?;
        Ok(payload.cookies)
    }

    /// GET /api/v1/auth/me -- session-check for client UI state.
    pub async fn session_check(&self) -> Result<SessionSummary, ApiError> {
        let response = self
            .authorized(reqwest::Method::GET, "/api/v1/auth/me")
            .send()
            .await?;
        Self::parse(response).await
    }

    /// POST /api/v1/auth/signout -- revoke the current session server-side.
    pub async fn signout(&self) -> Result<(), ApiError> {
        let response = self
            .authorized(reqwest::Method::POST, "/api/v1/auth/signout")
            .send()
            .await?;
        if response.status().is_success() {
            self.set_token(None);
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    fn authorized(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            let envelope: DataEnvelope<T> = response.json().await?;
            return Ok(envelope.data);
        }
        Err(Self::error_from(response).await)
    }

    async fn error_from(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body: ErrorBody = match response.json().await {
            Ok(body) => body,
            Err(_) => {
                return ApiError::Unexpected {
                    status,
                    message: "unparseable error body".to_string(),
                }
            }
        };

        match Denial::from_code(&body.code) {
            Some(denial) => ApiError::Denied(denial),
            None => ApiError::Unexpected {
                status,
                message: body.error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_codes() {
        assert_eq!(
            Denial::from_code("authentication_required"),
            Some(Denial::AuthenticationRequired)
        );
        assert_eq!(
            Denial::from_code("subscription_required"),
            Some(Denial::SubscriptionRequired)
        );
        assert_eq!(Denial::from_code("internal_error"), None);
        assert_eq!(Denial::from_code(""), None);
    }

    #[test]
    fn test_token_replacement() {
        let client = ApiClient::new("http://localhost:3000");
        assert_eq!(client.token(), None);
        client.set_token(Some("tok".to_string()));
        assert_eq!(client.token().as_deref(), Some("tok"));
        client.set_token(None);
        assert_eq!(client.token(), None);
    }
}
