use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use drivetree_config::OAuthSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Seconds before `expires_at` at which an access token is already treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Token response did not contain an access token")]
    MissingAccessToken,
    #[error("Credential has no refresh token")]
    MissingRefreshToken,
    #[error("Authorization was denied: {0}")]
    Denied(String),
    #[error("OAuth state mismatch")]
    StateMismatch,
}

/// Delegated access to the storage provider on behalf of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Unix seconds; `None` when the provider did not report a lifetime.
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - EXPIRY_SKEW_SECS <= now,
            None => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

/// The identity provider's side of the authorization-code flow.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    fn authorize_url(&self, state: &str) -> String;
    async fn exchange_code(&self, code: &str) -> Result<Credential, OAuthError>;
    async fn refresh(&self, credential: &Credential) -> Result<Credential, OAuthError>;
}

pub struct OAuthService {
    client: Client,
    settings: OAuthSettings,
}

impl OAuthService {
    pub fn new(settings: OAuthSettings, http_timeout: Duration) -> Result<Self, OAuthError> {
        let client = Client::builder().timeout(http_timeout).build()?;
        Ok(Self { client, settings })
    }

    async fn request_token(
        &self,
        token_uri: &str,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, OAuthError> {
        let resp = self.client.post(token_uri).form(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<TokenResponse>().await?)
    }

    fn scopes_from(&self, granted: Option<String>) -> Vec<String> {
        granted
            .unwrap_or_else(|| self.settings.scope.clone())
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl AuthorizationProvider for OAuthService {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&include_granted_scopes=true&prompt=consent",
            self.settings.auth_url,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(&self.settings.scope),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, OAuthError> {
        let token = self
            .request_token(
                &self.settings.token_url,
                &[
                    ("code", code),
                    ("client_id", self.settings.client_id.as_str()),
                    ("client_secret", self.settings.client_secret.as_str()),
                    ("redirect_uri", self.settings.redirect_uri.as_str()),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingAccessToken)?;

        debug!(
            has_refresh_token = token.refresh_token.is_some(),
            "Exchanged authorization code"
        );

        Ok(Credential {
            token: access_token,
            refresh_token: token.refresh_token,
            token_uri: self.settings.token_url.clone(),
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            scopes: self.scopes_from(token.scope),
            expires_at: token.expires_in.map(|e| Utc::now().timestamp() + e),
        })
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, OAuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::MissingRefreshToken)?;

        let token = self
            .request_token(
                &credential.token_uri,
                &[
                    ("refresh_token", refresh_token),
                    ("client_id", credential.client_id.as_str()),
                    ("client_secret", credential.client_secret.as_str()),
                    ("grant_type", "refresh_token"),
                ],
            )
            .await?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingAccessToken)?;

        // Providers usually omit the refresh token on refresh; keep the one we have.
        Ok(Credential {
            token: access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| credential.refresh_token.clone()),
            token_uri: credential.token_uri.clone(),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
            scopes: match token.scope {
                Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
                None => credential.scopes.clone(),
            },
            expires_at: token.expires_in.map(|e| Utc::now().timestamp() + e),
        })
    }
}
