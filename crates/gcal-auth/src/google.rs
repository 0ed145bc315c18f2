//! Google OAuth2 provider for Calendar access.

use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken,
    RequestTokenError, TokenUrl,
};
use url::Url;

use crate::error::AuthError;
use crate::oauth::OAuth2Config;
use crate::token::TokenSet;

/// Read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

pub struct GoogleOAuth2Provider {
    client: BasicClient,
    auth_endpoint: Url,
    client_id: String,
    redirect_uri: String,
}

impl GoogleOAuth2Provider {
    /// Build the provider, rejecting blank client credentials and malformed
    /// endpoint URLs up front.
    pub fn new(config: &OAuth2Config) -> Result<Self, AuthError> {
        config.ensure_client_credentials()?;

        let auth_endpoint = Url::parse(&config.auth_url).map_err(|e| AuthError::InvalidEndpoint {
            name: "authorization",
            reason: e.to_string(),
        })?;
        let token_url =
            TokenUrl::new(config.token_url.clone()).map_err(|e| AuthError::InvalidEndpoint {
                name: "token",
                reason: e.to_string(),
            })?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| {
            AuthError::InvalidEndpoint {
                name: "redirect",
                reason: e.to_string(),
            }
        })?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::from_url(auth_endpoint.clone()),
            Some(token_url),
        )
        // Google accepts the secret in the form body; keeps requests identical
        // to the documented curl examples.
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        Ok(Self {
            client,
            auth_endpoint,
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
        })
    }

    /// Authorization-code URL requesting offline access so the consent yields
    /// a refresh token. Pure function of the configuration.
    pub fn authorization_url(&self, scopes: &[&str]) -> String {
        let mut url = self.auth_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url.to_string()
    }

    /// Exchange authorization code for tokens.
    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::TokenRequest(describe_token_error(e)))?;

        Ok(TokenSet::from_response(&response))
    }

    /// Mint a new access token from a refresh token.
    #[tracing::instrument(skip(self, refresh_token), level = "debug")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::TokenRequest(describe_token_error(e)))?;

        Ok(TokenSet::from_response(&response))
    }
}

/// The oauth2 error `Display` impls drop the server's error code and
/// description; surface them so the tool caller sees e.g. `invalid_grant`.
fn describe_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(resp) => match resp.error_description() {
            Some(description) => format!("{}: {}", resp.error(), description),
            None => resp.error().to_string(),
        },
        RequestTokenError::Request(e) => format!("request error: {}", e),
        RequestTokenError::Parse(e, _) => format!("malformed token response: {}", e),
        RequestTokenError::Other(msg) => msg,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider() -> GoogleOAuth2Provider {
        GoogleOAuth2Provider::new(&OAuth2Config::google("test_client_id", "test_client_secret"))
            .unwrap()
    }

    fn query(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_google_auth_url_contains_scopes() {
        let url = provider().authorization_url(&[CALENDAR_SCOPE]);
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(query(&url).contains(&("scope".into(), CALENDAR_SCOPE.into())));
    }

    #[test]
    fn test_google_auth_url_contains_offline_access() {
        let pairs = query(&provider().authorization_url(&[CALENDAR_SCOPE]));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("prompt".into(), "consent".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "test_client_id".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "urn:ietf:wg:oauth:2.0:oob".into()
        )));
    }

    #[test]
    fn test_auth_url_is_deterministic() {
        let provider = provider();
        assert_eq!(
            provider.authorization_url(&[CALENDAR_SCOPE]),
            provider.authorization_url(&[CALENDAR_SCOPE])
        );
    }

    #[test]
    fn test_multiple_scopes_are_space_joined() {
        let pairs = query(&provider().authorization_url(&[CALENDAR_SCOPE, "email"]));
        assert!(pairs.contains(&("scope".into(), format!("{} email", CALENDAR_SCOPE))));
    }

    #[test]
    fn test_invalid_token_url_is_rejected() {
        let config = OAuth2Config::google("id", "secret")
            .with_endpoints(None, Some("not a url".into()));
        assert!(matches!(
            GoogleOAuth2Provider::new(&config),
            Err(AuthError::InvalidEndpoint { name: "token", .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=stored_refresh"))
            .and(body_string_contains("client_secret=test_client_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh_access",
                "expires_in": 3599,
                "scope": CALENDAR_SCOPE,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = OAuth2Config::google("test_client_id", "test_client_secret")
            .with_endpoints(None, Some(format!("{}/token", mock_server.uri())));
        let provider = GoogleOAuth2Provider::new(&config).unwrap();

        let tokens = provider.refresh_token("stored_refresh").await.unwrap();
        assert_eq!(tokens.access_token, "fresh_access");
        assert!(tokens.refresh_token.is_none());
        assert_eq!(tokens.scopes, vec![CALENDAR_SCOPE.to_string()]);
        assert!(!tokens.needs_refresh());
    }

    #[tokio::test]
    async fn test_refresh_token_invalid_grant() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&mock_server)
            .await;

        let config = OAuth2Config::google("id", "secret")
            .with_endpoints(None, Some(format!("{}/token", mock_server.uri())));
        let provider = GoogleOAuth2Provider::new(&config).unwrap();

        let err = provider.refresh_token("revoked").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid_grant"), "got: {msg}");
        assert!(msg.contains("expired or revoked"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_exchange_code_returns_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2Fabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access",
                "refresh_token": "long_lived",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&mock_server)
            .await;

        let config = OAuth2Config::google("id", "secret")
            .with_endpoints(None, Some(format!("{}/token", mock_server.uri())));
        let provider = GoogleOAuth2Provider::new(&config).unwrap();

        let tokens = provider.exchange_code("4/abc").await.unwrap();
        assert_eq!(tokens.refresh_token.as_deref(), Some("long_lived"));
    }
}
