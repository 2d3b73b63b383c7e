//! Microsoft Graph API access: directory user listing and mail sending.

pub mod client;
pub mod models;

pub use client::{GraphApi, GraphClient};
pub use models::SendMailRequest;
