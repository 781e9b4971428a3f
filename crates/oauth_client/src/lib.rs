use chrono::Utc;
use datastore::CredentialStore;
use domain::Credentials;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Scope needed to read comment threads and edit video metadata
pub const YOUTUBE_FORCE_SSL_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Google's token endpoint, used when the bundle does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bundle absent, unreadable, or not granting the required scopes
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The single refresh attempt was rejected or could not be made
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("access token expired and no refresh token is available")]
    Unrecoverable,
}

/// Successful refresh grant response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// OAuth error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// HTTP client bound to a valid access token
#[derive(Clone)]
pub struct AuthorizedClient {
    http: reqwest::Client,
    access_token: String,
}

impl AuthorizedClient {
    pub fn new(http: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self {
            http,
            access_token: access_token.into(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Attach the bearer token to a request
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.access_token)
    }
}

impl fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Turns a stored token bundle into an [`AuthorizedClient`].
///
/// The bundle is read from the store on every call and refreshed in memory
/// when expired. Nothing is written back; callers that want the refreshed
/// bundle persisted take it from [`Authenticator::credentials`].
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    required_scopes: Vec<String>,
    http: reqwest::Client,
    credentials: Option<Credentials>,
    refreshed: bool,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, required_scopes: Vec<String>) -> Self {
        Self::with_http_client(store, required_scopes, reqwest::Client::new())
    }

    pub fn with_http_client(
        store: Arc<dyn CredentialStore>,
        required_scopes: Vec<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            store,
            required_scopes,
            http,
            credentials: None,
            refreshed: false,
        }
    }

    /// Credentials from the last successful authentication
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Whether the last successful authentication refreshed the access token
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub async fn authenticate(&mut self) -> Result<AuthorizedClient, AuthError> {
        let mut credentials = self
            .store
            .load()
            .map_err(|err| AuthError::InvalidCredentials(err.to_string()))?;
        self.check_scopes(&credentials)?;

        let now = Utc::now();
        let refreshed = if credentials.is_expired(now) || credentials.access_token().is_none() {
            let Some(refresh_token) = credentials.refresh_token().map(str::to_string) else {
                return Err(if credentials.access_token().is_none() {
                    AuthError::InvalidCredentials("bundle has no access or refresh token".to_string())
                } else {
                    AuthError::Unrecoverable
                });
            };
            self.refresh(&mut credentials, &refresh_token).await?;
            self.check_scopes(&credentials)?;
            true
        } else {
            false
        };

        let access_token = credentials
            .access_token()
            .ok_or_else(|| AuthError::InvalidCredentials("empty access token".to_string()))?
            .to_string();

        tracing::debug!(
            location = %self.store.location(),
            refreshed,
            expiry = ?credentials.expiry,
            "credentials ready"
        );
        self.credentials = Some(credentials);
        self.refreshed = refreshed;
        Ok(AuthorizedClient::new(self.http.clone(), access_token))
    }

    fn check_scopes(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let missing = credentials.missing_scopes(&self.required_scopes);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials(format!(
                "missing required scopes: {}",
                missing.join(", ")
            )))
        }
    }

    /// One refresh grant against the bundle's token endpoint
    async fn refresh(
        &self,
        credentials: &mut Credentials,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let token_uri = credentials
            .token_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());
        tracing::info!(token_uri = %token_uri, "access token expired, refreshing");

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        if let Some(client_id) = credentials.client_id.as_deref() {
            form.push(("client_id", client_id));
        }
        if let Some(client_secret) = credentials.client_secret.as_deref() {
            form.push(("client_secret", client_secret));
        }

        let response = self
            .http
            .post(&token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|err| AuthError::RefreshFailed(format!("request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::RefreshFailed(format!("reading response failed: {err}")))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => match error.error_description {
                    Some(description) => format!("{}: {}", error.error, description),
                    None => error.error,
                },
                Err(_) => body,
            };
            return Err(AuthError::RefreshFailed(format!("{status}: {reason}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| AuthError::RefreshFailed(format!("malformed token response: {err}")))?;

        credentials.apply_refresh(
            token.access_token,
            token.expires_in,
            token.refresh_token,
            token.scope.as_deref(),
            Utc::now(),
        );
        Ok(())
    }
}
