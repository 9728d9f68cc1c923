//! OAuth 2.0 flows for obtaining a TwitCasting access token.
//!
//! Two grants are supported:
//!
//! - [`ImplicitFlow`]: the token comes back directly in the fragment of the redirect URL.
//! - [`AuthorizationCodeFlow`]: the redirect carries a one-time code that the application then
//!   exchanges for a token using its client secret.
//!
//! Application-level access (no user involved) does not need either; use
//! [`Authorization::basic`] instead.

use crate::auth::Authorization;
use crate::error::{Error, Result};
use jiff::{SignedDuration, Timestamp};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::url::Url;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    TokenResponse, TokenUrl, reqwest,
};
use std::borrow::Cow;
use std::collections::HashMap;

/// Where the user is sent to grant access.
pub const AUTHORIZE_URL: &str = "https://apiv2.twitcasting.tv/oauth2/authorize";

/// Where authorization codes are exchanged for access tokens.
pub const ACCESS_TOKEN_URL: &str = "https://apiv2.twitcasting.tv/oauth2/access_token";

/// An access token together with when it stops working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `bearer` in practice.
    pub token_type: String,
    /// Lifetime in seconds, as reported by the server.
    pub expires_in: Option<u64>,
    /// When the token expires, computed from `expires_in` at the time it was received.
    pub expires_at: Option<Timestamp>,
}

impl AccessToken {
    fn issued_now(access_token: String, token_type: String, expires_in: Option<u64>) -> Self {
        let expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| Timestamp::now().checked_add(SignedDuration::from_secs(secs)).ok());
        Self {
            access_token,
            token_type,
            expires_in,
            expires_at,
        }
    }

    fn from_token_response(token: &BasicTokenResponse) -> Self {
        Self::issued_now(
            token.access_token().secret().clone(),
            token.token_type().as_ref().to_string(),
            token.expires_in().map(|d| d.as_secs()),
        )
    }

    /// Whether the token's lifetime has run out. Tokens without a known lifetime never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Timestamp::now())
    }

    /// The credential to configure a client with.
    pub fn authorization(&self) -> Authorization {
        Authorization::bearer(self.access_token.clone())
    }
}

/// The Implicit grant.
///
/// See: <https://apiv2-doc.twitcasting.tv/#implicit>
#[derive(Debug, Clone)]
pub struct ImplicitFlow {
    client_id: String,
    state: Option<String>,
}

impl ImplicitFlow {
    /// A flow protected by a freshly generated random `state`.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            state: Some(CsrfToken::new_random().secret().clone()),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Skips `state` verification when parsing the redirect.
    pub fn without_state(mut self) -> Self {
        self.state = None;
        self
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The URL to send the user to.
    pub fn authorize_url(&self) -> Result<Url> {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(auth_url()?);
        let state = csrf_token(self.state.as_deref());
        let (url, _) = client
            .authorize_url(move || state)
            .use_implicit_flow()
            .url();
        Ok(url)
    }

    /// Reads the access token out of the URL the user was redirected to.
    pub fn parse_redirect(&self, redirect_url: &str) -> Result<AccessToken> {
        let url = parse_url(redirect_url)?;
        check_error(&url)?;
        let fragment = url
            .fragment()
            .ok_or_else(|| Error::Authorization("redirect URL has no fragment".to_string()))?;
        let params: HashMap<_, _> = form_urlencoded::parse(fragment.as_bytes())
            .into_owned()
            .collect();
        check_state(self.state.as_deref(), params.get("state").map(String::as_str))?;

        let access_token = params
            .get("access_token")
            .ok_or_else(|| Error::Authorization("redirect URL has no access token".to_string()))?;
        let expires_in = params
            .get("expires_in")
            .map(|secs| {
                secs.parse::<u64>()
                    .map_err(|_| Error::Authorization(format!("invalid expires_in: {secs}")))
            })
            .transpose()?;
        let token_type = params
            .get("token_type")
            .cloned()
            .unwrap_or_else(|| "bearer".to_string());
        Ok(AccessToken::issued_now(
            access_token.clone(),
            token_type,
            expires_in,
        ))
    }
}

/// The Authorization Code grant.
///
/// See: <https://apiv2-doc.twitcasting.tv/#authorization-code-grant>
#[derive(Debug, Clone)]
pub struct AuthorizationCodeFlow {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    state: Option<String>,
    token_url: String,
}

impl AuthorizationCodeFlow {
    /// A flow protected by a freshly generated random `state`.
    ///
    /// `redirect_uri` must match the callback URL registered for the application.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            state: Some(CsrfToken::new_random().secret().clone()),
            token_url: ACCESS_TOKEN_URL.to_string(),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Skips `state` verification when parsing the redirect.
    pub fn without_state(mut self) -> Self {
        self.state = None;
        self
    }

    /// Exchanges codes somewhere other than [`ACCESS_TOKEN_URL`].
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The URL to send the user to.
    pub fn authorize_url(&self) -> Result<Url> {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(auth_url()?);
        let state = csrf_token(self.state.as_deref());
        let (url, _) = client.authorize_url(move || state).url();
        Ok(url)
    }

    /// Reads the authorization code out of the URL the user was redirected to.
    pub fn parse_redirect(&self, redirect_url: &str) -> Result<String> {
        let url = parse_url(redirect_url)?;
        check_error(&url)?;
        let mut state = None;
        let mut code = None;
        for (k, v) in url.query_pairs() {
            match &*k {
                "state" => state = Some(v.into_owned()),
                "code" => code = Some(v.into_owned()),
                _ => {}
            }
        }
        check_state(self.state.as_deref(), state.as_deref())?;
        code.ok_or_else(|| Error::Authorization("redirect URL has no code".to_string()))
    }

    /// Trades an authorization code for an access token.
    ///
    /// The client credentials are sent in the request body.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let token_url = TokenUrl::new(self.token_url.clone())
            .map_err(|e| Error::Authorization(format!("invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(self.redirect_uri.clone())
            .map_err(|e| Error::Authorization(format!("invalid redirect URI: {e}")))?;
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(token_url)
            .set_auth_type(AuthType::RequestBody);

        let http_client = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Authorization(format!("build HTTP client: {e}")))?;
        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(Cow::Owned(redirect_url))
            .request_async(&http_client)
            .await
            .map_err(|e| Error::Authorization(format!("exchange authorization code: {e}")))?;

        let token = AccessToken::from_token_response(&token);
        tracing::debug!(expires_at = ?token.expires_at, "obtained access token");
        Ok(token)
    }
}

fn auth_url() -> Result<AuthUrl> {
    AuthUrl::new(AUTHORIZE_URL.to_string())
        .map_err(|e| Error::Authorization(format!("invalid authorization URL: {e}")))
}

fn csrf_token(state: Option<&str>) -> CsrfToken {
    // the server echoes whatever it is given, so an unverified flow still sends a random one
    state.map_or_else(CsrfToken::new_random, |s| CsrfToken::new(s.to_string()))
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::Authorization(format!("invalid redirect URL: {e}")))
}

/// Fails if the server redirected with an OAuth error instead of a grant.
fn check_error(url: &Url) -> Result<()> {
    let pairs = url
        .query_pairs()
        .chain(url.fragment().into_iter().flat_map(|f| form_urlencoded::parse(f.as_bytes())));
    let mut error = None;
    let mut description = None;
    for (k, v) in pairs {
        match &*k {
            "error" => error = Some(v.into_owned()),
            "error_description" => description = Some(v.into_owned()),
            _ => {}
        }
    }
    match (error, description) {
        (None, _) => Ok(()),
        (Some(error), None) => Err(Error::Authorization(error)),
        (Some(error), Some(description)) => {
            Err(Error::Authorization(format!("{error}: {description}")))
        }
    }
}

fn check_state(expected: Option<&str>, presented: Option<&str>) -> Result<()> {
    match expected {
        Some(expected) if presented != Some(expected) => {
            Err(Error::Authorization("invalid CSRF token".to_string()))
        }
        _ => Ok(()),
    }
}
