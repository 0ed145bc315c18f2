use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gcal_auth::{CredentialManager, CredentialState, OAuth2Config, CALENDAR_SCOPE};
use gcal_core::{Config, GoogleConfig};
use gcal_tools::{Dispatcher, GoogleCalendarProvider, McpServer, Registry};
use tokio::io::BufReader;

/// Google Calendar tools for MCP clients, served over stdio.
#[derive(Parser)]
#[command(name = "gcal-mcp", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdin/stdout (default)
    Serve,
    /// Print the Google authorization URL
    AuthUrl,
    /// Exchange an authorization code and print the refresh token
    ExchangeCode {
        /// Code shown after approving access
        code: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    gcal_core::init()?;

    let (config, _) = Config::load_validated()?;
    let credentials = Arc::new(
        CredentialManager::new(oauth_config(&config.google)?)
            .context("Invalid OAuth client configuration")?,
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, credentials).await,
        Command::AuthUrl => {
            println!("{}", credentials.authorization_url(&[CALENDAR_SCOPE]));
            Ok(())
        }
        Command::ExchangeCode { code } => {
            let tokens = credentials
                .exchange_code(code.trim())
                .await
                .context("Failed to exchange authorization code")?;
            match tokens.refresh_token {
                Some(refresh_token) => {
                    println!("GOOGLE_REFRESH_TOKEN={}", refresh_token);
                    Ok(())
                }
                None => bail!(
                    "Google returned no refresh token; revoke the app's access in your \
                     Google account and run get_auth_url again"
                ),
            }
        }
    }
}

fn oauth_config(google: &GoogleConfig) -> Result<OAuth2Config> {
    let (client_id, client_secret) = google.require_credentials()?;
    Ok(OAuth2Config::google(client_id, client_secret)
        .with_redirect_uri(google.redirect_uri.clone())
        .with_refresh_token(google.refresh_token.clone())
        .with_endpoints(google.auth_url.clone(), google.token_url.clone()))
}

async fn serve(config: &Config, credentials: Arc<CredentialManager>) -> Result<()> {
    let state = credentials.state();
    let provider =
        GoogleCalendarProvider::new(credentials, config.google.calendar_api_base.as_deref());
    let dispatcher = Dispatcher::new(
        Registry::calendar(),
        provider,
        config.server.tool_timeout(),
    );
    let server = McpServer::new(dispatcher);

    // The only line written at the default filter.
    tracing::info!("{}", startup_message(state));

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("stdio transport failed")
}

fn startup_message(state: CredentialState) -> String {
    match state {
        CredentialState::Authorized => "Google Calendar MCP server running on stdio".to_string(),
        CredentialState::Configured => "Google Calendar MCP server running on stdio \
             (no refresh token configured, only get_auth_url will succeed)"
            .to_string(),
    }
}
