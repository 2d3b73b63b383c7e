//! The run sequence: config, secret, token, Graph calls, output.

use std::io::Write;
use tracing::info;

use crate::auth::{
    AadTokenEndpoint, ClientIdentity, ConfidentialClient, InMemoryTokenCache, TokenResult,
};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{ApiError, AppError};
use crate::graph::{GraphApi, GraphClient, SendMailRequest};
use crate::secrets::SecretStore;

/// Who sends the optional test mail, and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailTarget {
    pub user_id: String,
    pub recipients: Vec<String>,
}

/// Run once, writing program output to `out`.
///
/// The config is loaded and validated before the credential store is opened,
/// so a bad config never reaches the store or the network.
pub async fn run<S, W>(cli: &Cli, store: &S, out: &mut W) -> Result<(), AppError>
where
    S: SecretStore + ?Sized,
    W: Write,
{
    let config = Config::load(&cli.config)?;

    let secret = store.lookup(&cli.secret_name)?;
    info!("Client secret read from entry '{}'", cli.secret_name);

    let identity = ClientIdentity {
        client_id: config.client_id.clone(),
        authority: config.authority_url()?,
        scopes: config.scopes(),
    };
    let client = ConfidentialClient::new(
        identity,
        secret,
        InMemoryTokenCache::new(),
        AadTokenEndpoint::new()?,
    )?;
    let graph = GraphClient::new(&config.graph_base_url)?;

    let result = client.acquire_token().await?;
    report(result, &graph, cli.mail_target().as_ref(), out).await
}

/// Act on a token result: call Graph on success, print the OAuth2 error otherwise.
pub async fn report<G, W>(
    result: TokenResult,
    graph: &G,
    mail: Option<&MailTarget>,
    out: &mut W,
) -> Result<(), AppError>
where
    G: GraphApi + ?Sized,
    W: Write,
{
    match result {
        TokenResult::Success(token) => {
            let users = graph.list_users(&token.access_token).await?;
            let pretty = serde_json::to_string_pretty(&users)
                .map_err(|e| ApiError::ParseFailed(e.to_string()))?;
            writeln!(out, "Graph API call result: ")?;
            writeln!(out, "{}", pretty)?;

            if let Some(target) = mail {
                let request = SendMailRequest::test_message(&target.recipients);
                let outcome = graph
                    .send_mail(&token.access_token, &target.user_id, &request)
                    .await?;
                writeln!(out, "Send results {}", outcome.status)?;
                writeln!(out, "{}", outcome.body)?;
            }
        }
        TokenResult::Failure(failure) => {
            writeln!(out, "{}", failure.error)?;
            writeln!(out, "{}", failure.error_description)?;
            // Quote this when reporting a problem to Microsoft
            writeln!(out, "{}", failure.correlation_id.unwrap_or_default())?;
        }
    }

    Ok(())
}
