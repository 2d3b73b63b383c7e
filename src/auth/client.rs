//! Confidential client: cache-first, client-credentials token acquisition.

use tracing::{debug, info};
use url::Url;

use super::cache::{CacheKey, InMemoryTokenCache, TokenCache};
use super::endpoint::{AadTokenEndpoint, TokenEndpoint, TokenRequest};
use super::token::{AccessToken, TokenResult};
use crate::error::AuthError;
use crate::secrets::SecureString;

/// Who the application is and what it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_id: String,
    pub authority: Url,
    pub scopes: Vec<String>,
}

/// An application that authenticates as itself with a client secret.
///
/// The cache and the endpoint are injected so either can be replaced; the
/// default pairing is a process-lifetime in-memory cache and Azure AD.
pub struct ConfidentialClient<C = InMemoryTokenCache, E = AadTokenEndpoint> {
    identity: ClientIdentity,
    secret: SecureString,
    cache_key: CacheKey,
    cache: C,
    endpoint: E,
}

impl<C: TokenCache, E: TokenEndpoint> ConfidentialClient<C, E> {
    pub fn new(
        identity: ClientIdentity,
        secret: SecureString,
        cache: C,
        endpoint: E,
    ) -> Result<Self, AuthError> {
        validate(&identity, &secret)?;

        let cache_key = CacheKey::new(&identity.authority, &identity.client_id, &identity.scopes);
        Ok(Self {
            identity,
            secret,
            cache_key,
            cache,
            endpoint,
        })
    }

    /// Look for a still-valid application token in the cache. Never touches the network.
    pub fn acquire_token_silent(&self) -> Option<AccessToken> {
        self.cache.lookup(&self.cache_key)
    }

    /// Request a new token from the authority, caching it on success.
    pub async fn acquire_token_for_client(&self) -> Result<TokenResult, AuthError> {
        let request = TokenRequest {
            authority: &self.identity.authority,
            client_id: &self.identity.client_id,
            client_secret: &self.secret,
            scopes: &self.identity.scopes,
        };

        let result = self.endpoint.request_token(&request).await?;

        if let TokenResult::Success(token) = &result {
            self.cache.store(self.cache_key.clone(), token.clone());
        }

        Ok(result)
    }

    /// Cached token if there is one, otherwise a single network request.
    pub async fn acquire_token(&self) -> Result<TokenResult, AuthError> {
        if let Some(token) = self.acquire_token_silent() {
            debug!("Using cached token, expires in {} seconds", token.expires_in);
            return Ok(TokenResult::Success(token));
        }

        info!(
            "No suitable token exists in cache, requesting a new one from {}",
            self.identity.authority
        );
        self.acquire_token_for_client().await
    }
}

fn validate(identity: &ClientIdentity, secret: &SecureString) -> Result<(), AuthError> {
    if identity.client_id.trim().is_empty() {
        return Err(AuthError::InvalidClient("client id is empty".into()));
    }

    if secret.is_empty() {
        return Err(AuthError::InvalidClient("client secret is empty".into()));
    }

    if !matches!(identity.authority.scheme(), "http" | "https") {
        return Err(AuthError::InvalidClient(format!(
            "authority '{}' is not an http(s) URL",
            identity.authority
        )));
    }

    if identity.scopes.is_empty() || identity.scopes.iter().any(|s| s.trim().is_empty()) {
        return Err(AuthError::InvalidClient("no scope requested".into()));
    }

    Ok(())
}
