//! Microsoft Graph API client.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{MailOutcome, SendMailRequest};
use crate::error::ApiError;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The Graph operations this program performs.
#[async_trait]
pub trait GraphApi {
    /// `GET /users`, returning the JSON body as-is.
    async fn list_users(&self, access_token: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST /users/{user_id}/sendMail`.
    async fn send_mail(
        &self,
        access_token: &str,
        user_id: &str,
        request: &SendMailRequest,
    ) -> Result<MailOutcome, ApiError>;
}

/// Microsoft Graph API client.
pub struct GraphClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl GraphClient {
    /// Create a new Graph client rooted at `base_url` (e.g. `https://graph.microsoft.com/v1.0`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL '{}' cannot have a path",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn list_users(&self, access_token: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["users"])?;

        debug!("Fetching users from {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Graph API returned HTTP {} for /users", status);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::ParseFailed(e.to_string()))
    }

    async fn send_mail(
        &self,
        access_token: &str,
        user_id: &str,
        request: &SendMailRequest,
    ) -> Result<MailOutcome, ApiError> {
        if user_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "sendMail requires a user id".to_string(),
            ));
        }

        let url = self.endpoint(&["users", user_id, "sendMail"])?;

        debug!("Sending mail via {}", url);

        let response = self
            .http_client
            .post(url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            info!("Mail accepted for delivery (HTTP {})", status);
        } else {
            warn!("sendMail failed: HTTP {}", status);
        }

        Ok(MailOutcome {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> GraphClient {
        GraphClient::new(&format!("{}/v1.0", server.base_url())).unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let client = GraphClient::new("https://graph.microsoft.com/v1.0/").unwrap();

        let url = client.endpoint(&["users"]).unwrap();
        assert_eq!(url.as_str(), "https://graph.microsoft.com/v1.0/users");

        let url = client
            .endpoint(&["users", "adele vance/x", "sendMail"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/users/adele%20vance%2Fx/sendMail"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GraphClient::new("not a url"),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(GraphClient::new("mailto:someone@contoso.com").is_err());
    }

    #[tokio::test]
    async fn test_list_users() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1.0/users")
                    .header("authorization", "Bearer abc");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"value":[{"id":"87d349ed","displayName":"Adele Vance"}]}"#);
            })
            .await;

        let users = client(&server).list_users("abc").await.unwrap();

        assert_eq!(users["value"][0]["displayName"], json!("Adele Vance"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_users_error_body_returned() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1.0/users");
                then.status(403)
                    .header("content-type", "application/json")
                    .body(r#"{"error":{"code":"Authorization_RequestDenied","message":"Insufficient privileges to complete the operation."}}"#);
            })
            .await;

        let body = client(&server).list_users("abc").await.unwrap();

        assert_eq!(body["error"]["code"], json!("Authorization_RequestDenied"));
    }

    #[tokio::test]
    async fn test_list_users_non_json() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1.0/users");
                then.status(502).body("Bad Gateway");
            })
            .await;

        let result = client(&server).list_users("abc").await;

        assert!(matches!(result, Err(ApiError::ParseFailed(_))));
    }

    #[tokio::test]
    async fn test_send_mail() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1.0/users/87d349ed/sendMail")
                    .header("authorization", "Bearer abc")
                    .header("content-type", "application/json")
                    .body_includes(r#""saveToSentItems":false"#);
                then.status(202);
            })
            .await;

        let request = SendMailRequest::test_message(&["adele@contoso.com".to_string()]);
        let outcome = client(&server)
            .send_mail("abc", "87d349ed", &request)
            .await
            .unwrap();

        assert_eq!(outcome.status, 202);
        assert!(outcome.body.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_mail_requires_user_id() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(202);
            })
            .await;

        let request = SendMailRequest::test_message(&[]);
        let result = client(&server).send_mail("abc", "", &request).await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        mock.assert_hits_async(0).await;
    }
}
