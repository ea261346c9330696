// ABOUTME: Ambient workspace identity and the credential-provider seam.
// ABOUTME: Produces Authorization headers from a token or OAuth client credentials.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::DatabricksSettings;
use crate::error::AuthError;

/// Something that can authorize one outgoing connection.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a complete `Authorization` header value.
    async fn authorization(&self) -> Result<String, AuthError>;
}

/// How the workspace identity proves itself.
#[derive(Clone)]
pub enum Credentials {
    /// Personal access token, sent as-is.
    Token(String),
    /// OAuth machine-to-machine client credentials, exchanged per connection.
    OAuthM2m {
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::OAuthM2m { client_id, .. } => f
                .debug_struct("OAuthM2m")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// The identity shared by every managed and custom MCP call.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WorkspaceIdentity {
    host: String,
    credentials: Credentials,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl WorkspaceIdentity {
    /// Build an identity for `host`.
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            credentials,
            http_client: reqwest::Client::new(),
        }
    }

    /// Identity authenticated by a personal access token.
    pub fn with_token(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(host, Credentials::Token(token.into()))
    }

    /// Resolve the identity from settings. A token wins over client credentials.
    pub fn from_settings(settings: &DatabricksSettings) -> Result<Self, AuthError> {
        let host = settings
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingHost)?;

        let credentials = match (&settings.token, &settings.client_id, &settings.client_secret) {
            (Some(token), _, _) if !token.is_empty() => Credentials::Token(token.clone()),
            (_, Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Credentials::OAuthM2m {
                    client_id: id.clone(),
                    client_secret: secret.clone(),
                }
            }
            _ => return Err(AuthError::MissingCredentials),
        };

        Ok(Self::new(host, credentials))
    }

    /// Workspace base URL without a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn exchange_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, AuthError> {
        let url = format!("{}/oidc/v1/token", self.host);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "all-apis")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(host = %self.host, "Minted workspace OAuth token");
        Ok(format!("{} {}", token.token_type, token.access_token))
    }
}

#[async_trait]
impl CredentialProvider for WorkspaceIdentity {
    async fn authorization(&self) -> Result<String, AuthError> {
        match &self.credentials {
            Credentials::Token(token) => Ok(format!("Bearer {}", token)),
            Credentials::OAuthM2m {
                client_id,
                client_secret,
            } => {
                self.exchange_client_credentials(client_id, client_secret)
                    .await
            }
        }
    }
}
