//! Application token cache with expiry support.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use url::Url;

use super::token::AccessToken;

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_MARGIN_SECONDS: i64 = 300;

/// Identifies tokens issued to one application for one set of scopes.
///
/// There is no account component: the client-credentials flow acts as the
/// application itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    authority: String,
    client_id: String,
    scopes: Vec<String>,
}

impl CacheKey {
    pub fn new(authority: &Url, client_id: &str, scopes: &[String]) -> Self {
        let mut scopes: Vec<String> = scopes.iter().map(|s| s.to_lowercase()).collect();
        scopes.sort();
        scopes.dedup();

        Self {
            authority: authority.as_str().trim_end_matches('/').to_lowercase(),
            client_id: client_id.to_string(),
            scopes,
        }
    }
}

/// Storage for previously acquired tokens.
pub trait TokenCache {
    /// Return a still-valid token for `key`. Must not perform I/O.
    fn lookup(&self, key: &CacheKey) -> Option<AccessToken>;

    /// Remember a freshly issued token.
    fn store(&self, key: CacheKey, token: AccessToken);
}

/// Cached token with its absolute expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    expires_at: DateTime<Utc>,
}

/// Process-lifetime, in-memory token cache.
#[derive(Debug, Default)]
pub struct InMemoryTokenCache {
    entries: Mutex<HashMap<CacheKey, CachedToken>>,
}

impl InMemoryTokenCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<AccessToken> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = entries.get(key)?;

        let remaining = cached.expires_at - now;
        if remaining <= Duration::seconds(EXPIRY_MARGIN_SECONDS) {
            return None;
        }

        let mut token = cached.token.clone();
        token.expires_in = u64::try_from(remaining.num_seconds()).unwrap_or(0);
        Some(token)
    }

    fn store_at(&self, key: CacheKey, token: AccessToken, now: DateTime<Utc>) {
        let lifetime = i64::try_from(token.expires_in).unwrap_or(i64::MAX);
        let expires_at = now
            .checked_add_signed(Duration::seconds(lifetime.min(i64::MAX / 1000)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, CachedToken { token, expires_at });
    }
}

impl TokenCache for InMemoryTokenCache {
    fn lookup(&self, key: &CacheKey) -> Option<AccessToken> {
        self.lookup_at(key, Utc::now())
    }

    fn store(&self, key: CacheKey, token: AccessToken) {
        self.store_at(key, token, Utc::now());
    }
}
