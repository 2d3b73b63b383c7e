//! Azure AD token endpoint for the client-credentials grant.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use super::token::{AccessToken, TokenFailure, TokenResult};
use crate::error::AuthError;
use crate::secrets::SecureString;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters of one client-credentials token request.
#[derive(Debug)]
pub struct TokenRequest<'a> {
    pub authority: &'a Url,
    pub client_id: &'a str,
    pub client_secret: &'a SecureString,
    pub scopes: &'a [String],
}

/// Issues token requests over the network.
#[async_trait]
pub trait TokenEndpoint {
    /// Perform exactly one token request.
    ///
    /// An OAuth2 error body from the provider is `Ok(TokenResult::Failure)`;
    /// transport failures and unrecognised responses are `Err`.
    async fn request_token(&self, request: &TokenRequest<'_>) -> Result<TokenResult, AuthError>;
}

/// Token endpoint of an Azure AD (v2.0) authority.
pub struct AadTokenEndpoint {
    http_client: reqwest::Client,
}

impl AadTokenEndpoint {
    pub fn new() -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { http_client })
    }

    /// The v2.0 token URL for an authority.
    pub fn token_url(authority: &Url) -> String {
        format!(
            "{}/oauth2/v2.0/token",
            authority.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TokenEndpoint for AadTokenEndpoint {
    async fn request_token(&self, request: &TokenRequest<'_>) -> Result<TokenResult, AuthError> {
        let token_endpoint = Self::token_url(request.authority);
        let scope = request.scopes.join(" ");
        let client_request_id = Uuid::new_v4().to_string();

        let params = [
            ("client_id", request.client_id),
            ("client_secret", request.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        debug!(
            "Requesting token from {} (client-request-id {})",
            token_endpoint, client_request_id
        );

        let response = self
            .http_client
            .post(&token_endpoint)
            .header("client-request-id", &client_request_id)
            .header("return-client-request-id", "true")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        parse_token_response(status, &body)
    }
}

/// Map a token endpoint response onto a `TokenResult`.
///
/// A body carrying an OAuth2 `error` is a `Failure` whatever the HTTP status.
fn parse_token_response(status: StatusCode, body: &str) -> Result<TokenResult, AuthError> {
    if let Ok(failure) = serde_json::from_str::<TokenFailure>(body) {
        warn!(
            "Token request rejected: HTTP {} - {} (correlation id {})",
            status,
            failure.error,
            failure.correlation_id.as_deref().unwrap_or("none")
        );
        return Ok(TokenResult::Failure(failure));
    }

    if !status.is_success() {
        // Log error details for debugging (doesn't expose to user)
        error!("Token request failed: HTTP {} - {}", status, body);
        return Err(AuthError::InvalidResponse(format!(
            "HTTP {}",
            status.as_u16()
        )));
    }

    let token: AccessToken = serde_json::from_str(body)
        .map_err(|e| AuthError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e)))?;
    debug!("Token acquired, expires in {} seconds", token.expires_in);
    Ok(TokenResult::Success(token))
}
