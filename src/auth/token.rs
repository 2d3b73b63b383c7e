//! Token endpoint results.

use serde::{Deserialize, Deserializer};

/// Lifetime assumed when the identity provider omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3599;

/// Outcome of a token acquisition.
///
/// A structured OAuth2 error from the identity provider is a normal outcome,
/// not an `Err`; transport failures are reported separately as `AuthError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResult {
    Success(AccessToken),
    Failure(TokenFailure),
}

#[cfg(test)]
impl TokenResult {
    /// The bearer token, if the acquisition succeeded.
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::Success(token) => Some(&token.access_token),
            Self::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Successful token response from Azure AD.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Seconds until the access token expires.
    #[serde(
        default = "default_expires_in",
        deserialize_with = "deserialize_expires_in"
    )]
    pub expires_in: u64,
}

impl AccessToken {
    #[cfg(test)]
    pub fn bearer(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// OAuth2 error response (RFC 6749 section 5.2, plus Azure AD's correlation id).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenFailure {
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN
}

/// v2.0 endpoints send `expires_in` as a number, v1.0 endpoints as a string.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
