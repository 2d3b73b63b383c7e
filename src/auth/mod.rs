//! Azure AD authentication module.
//!
//! Provides the confidential-client token flow: an injectable token cache,
//! the Azure AD token endpoint, and the client that consults the cache before
//! going to the network.

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod token;

pub use cache::InMemoryTokenCache;
pub use client::{ClientIdentity, ConfidentialClient};
pub use endpoint::AadTokenEndpoint;
pub use token::TokenResult;
