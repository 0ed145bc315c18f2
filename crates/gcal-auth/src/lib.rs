//! OAuth2 credential lifecycle for the Google Calendar tools.
//!
//! The [`CredentialManager`] owns the client configuration and the optional
//! refresh token, and hands out [`AuthorizedClient`]s that attach a fresh
//! access token to every request.

pub mod credentials;
pub mod error;
pub mod google;
pub mod oauth;
pub mod token;

pub use credentials::{AuthorizedClient, CredentialManager, CredentialState};
pub use error::AuthError;
pub use google::{GoogleOAuth2Provider, CALENDAR_SCOPE};
pub use oauth::{OAuth2Config, OOB_REDIRECT_URI};
pub use token::TokenSet;
