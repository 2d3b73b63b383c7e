//! Command-line arguments.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::app::MailTarget;
use crate::secrets::DEFAULT_SECRET_ENTRY;

/// List Azure AD directory users through Microsoft Graph with an application token.
#[derive(Debug, Clone, Parser)]
#[command(name = "msgraph-client", version, about)]
pub struct Cli {
    /// JSON file with `client_id`, `authority` and `scope`.
    #[arg(long)]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub logging: bool,

    /// KeePass database holding the client secret.
    #[arg(long = "secretsdb")]
    pub secrets_db: PathBuf,

    /// Key file unlocking the KeePass database.
    #[arg(long = "secretdbkey")]
    pub secret_db_key: PathBuf,

    /// Title of the KeePass entry whose password is the client secret.
    #[arg(long, default_value = DEFAULT_SECRET_ENTRY)]
    pub secret_name: String,

    /// Send a test mail as this user (object id or user principal name).
    #[arg(long = "send-mail-as", value_name = "USER_ID")]
    pub send_mail_as: Option<String>,

    /// Recipient of the test mail; may be repeated.
    #[arg(long = "mail-to", value_name = "ADDRESS", requires = "send_mail_as")]
    pub mail_to: Vec<String>,
}

impl Cli {
    /// The mail to send after listing users, if any.
    pub fn mail_target(&self) -> Option<MailTarget> {
        self.send_mail_as.as_ref().map(|user_id| MailTarget {
            user_id: user_id.clone(),
            recipients: self.mail_to.clone(),
        })
    }
}
