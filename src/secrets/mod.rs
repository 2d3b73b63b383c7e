//! Client secret retrieval.
//!
//! The token client only needs a secret string; where it comes from is behind
//! the [`SecretStore`] capability. [`KeePassStore`] reads it from a local
//! KeePass database unlocked with a key file.

pub mod kdbx;
pub mod secure;

pub use kdbx::KeePassStore;
pub use secure::SecureString;

use crate::error::SecretStoreError;

/// Title of the entry holding the Graph application secret.
pub const DEFAULT_SECRET_ENTRY: &str = "GraphApiSecret";

/// A source of named secrets.
pub trait SecretStore {
    /// Look up the secret stored under `entry_title`.
    fn lookup(&self, entry_title: &str) -> Result<SecureString, SecretStoreError>;
}
