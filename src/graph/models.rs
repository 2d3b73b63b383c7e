//! Request and response shapes for the Graph endpoints used here.

use serde::Serialize;

/// Body of `POST /users/{id}/sendMail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    pub message: Message,
    pub save_to_sent_items: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub subject: String,
    pub body: ItemBody,
    pub to_recipients: Vec<Recipient>,
    pub cc_recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub address: String,
}

impl SendMailRequest {
    /// Plain-text test message to the given recipients, not saved to Sent Items.
    pub fn test_message(to: &[String]) -> Self {
        Self {
            message: Message {
                subject: "Test message".to_string(),
                body: ItemBody {
                    content_type: "Text".to_string(),
                    content: "Hello from msgraph-client".to_string(),
                },
                to_recipients: to.iter().map(|a| Recipient::new(a)).collect(),
                cc_recipients: Vec::new(),
            },
            save_to_sent_items: false,
        }
    }
}

impl Recipient {
    pub fn new(address: &str) -> Self {
        Self {
            email_address: EmailAddress {
                address: address.to_string(),
            },
        }
    }
}

/// Status and raw body returned by `sendMail` (normally `202` with an empty body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailOutcome {
    pub status: u16,
    pub body: String,
}
