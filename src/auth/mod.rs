//! Authorization-Code-with-PKCE broker.
//!
//! `Unauthenticated -> Authorizing -> Exchanging -> Authenticated`. A failure while
//! authorizing or exchanging passes through `Failed`, is returned to the caller, and
//! leaves the broker `Unauthenticated` with the verifier slot empty.

mod pkce;
mod verifier;

pub use pkce::{challenge_for, generate_verifier, VERIFIER_LEN};
pub use verifier::VerifierSlot;

use crate::config::Config;
use crate::error::{check_response, Error, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;

const TOKEN_SERVICE: &str = "token endpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authorizing,
    Exchanging,
    Authenticated,
    Failed,
}

/// Access token obtained from the exchange. Never refreshed.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scope: None,
            expires_at: None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Informational; an expired token is detected for real by the 401 that follows.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|t| t <= Utc::now()).unwrap_or(false)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    scope: Option<String>,
}

/// `code` / `error` query parameters of the provider's redirect back to us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Callback {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Pull `code` and `error` out of the redirect URL the user agent landed on.
pub fn parse_callback(url: &str) -> Result<Callback> {
    let url = Url::parse(url.trim())
        .map_err(|e| Error::auth(format!("malformed callback URL: {}", e)))?;
    let mut cb = Callback::default();
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => cb.code = Some(v.into_owned()),
            "error" => cb.error = Some(v.into_owned()),
            _ => {}
        }
    }
    Ok(cb)
}

// Absolute expiry for a lifetime in seconds; `None` when negative or past chrono's range.
fn expiry_from(secs: i64) -> Option<DateTime<Utc>> {
    if secs < 0 {
        return None;
    }
    Duration::try_seconds(secs).and_then(|d| Utc::now().checked_add_signed(d))
}

pub struct CredentialBroker {
    config: Config,
    http: reqwest::Client,
    state: AuthState,
    verifier: VerifierSlot,
    session: Option<Session>,
    last_failure: Option<String>,
}

impl CredentialBroker {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            state: AuthState::Unauthenticated,
            verifier: VerifierSlot::new(),
            session: None,
            last_failure: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::auth("not connected to the music service"))
    }

    /// Message of the most recent authorization failure, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn has_pending_verifier(&self) -> bool {
        !self.verifier.is_empty()
    }

    /// Start a new attempt: store a fresh verifier and return the URL the user agent
    /// must be sent to.
    pub fn begin_authorization(&mut self) -> Result<Url> {
        let verifier = generate_verifier();
        let challenge = challenge_for(&verifier);

        let url = Url::parse_with_params(
            &self.config.authorize_url(),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope().as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", challenge.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorize endpoint: {}", e)))?;

        self.session = None;
        self.verifier.store(verifier);
        self.state = AuthState::Authorizing;
        tracing::info!("authorization started");
        Ok(url)
    }

    /// Handle the provider's redirect. The stored verifier is consumed whatever happens.
    pub async fn complete_authorization(
        &mut self,
        code: Option<&str>,
        error: Option<&str>,
    ) -> Result<&Session> {
        let verifier = self.verifier.take();

        if let Some(err) = error {
            return Err(self.fail(Error::auth(format!(
                "provider denied authorization: {}",
                err
            ))));
        }
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Err(self.fail(Error::auth("callback carried no authorization code")));
        };
        let Some(verifier) = verifier else {
            return Err(self.fail(Error::auth("missing verifier")));
        };

        self.state = AuthState::Exchanging;
        match self.exchange(code, &verifier).await {
            Ok(session) => {
                tracing::info!(expires_at = ?session.expires_at, "access token obtained");
                self.state = AuthState::Authenticated;
                self.last_failure = None;
                Ok(self.session.insert(session))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn complete_from_url(&mut self, callback_url: &str) -> Result<&Session> {
        let cb = match parse_callback(callback_url) {
            Ok(cb) => cb,
            Err(e) => return Err(self.fail(e)),
        };
        self.complete_authorization(cb.code.as_deref(), cb.error.as_deref())
            .await
    }

    async fn exchange(&self, code: &str, verifier: &str) -> Result<Session> {
        let resp = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await
            .map_err(|e| Error::auth(format!("token request failed: {}", e)))?;

        let resp = match check_response(TOKEN_SERVICE, resp).await {
            Ok(r) => r,
            Err(Error::Upstream { status, body, .. }) => {
                return Err(Error::Auth {
                    status: Some(status),
                    message: format!("token exchange failed: {}", body),
                })
            }
            Err(e) => return Err(e),
        };
        let status = resp.status().as_u16();
        let token: TokenResponse = resp.json().await.map_err(|e| Error::Auth {
            status: Some(status),
            message: format!("malformed token response: {}", e),
        })?;
        if token.access_token.is_empty() {
            return Err(Error::Auth {
                status: Some(status),
                message: "malformed token response: empty access_token".into(),
            });
        }

        let expires_at = match token.expires_in {
            None => None,
            Some(secs) => Some(expiry_from(secs).ok_or_else(|| Error::Auth {
                status: Some(status),
                message: format!("malformed token response: expires_in {} out of range", secs),
            })?),
        };

        Ok(Session {
            access_token: token.access_token,
            scope: token.scope,
            expires_at,
        })
    }

    /// Surface a failure: pass through `Failed`, then tear down to `Unauthenticated`.
    fn fail(&mut self, err: Error) -> Error {
        self.state = AuthState::Failed;
        tracing::warn!(error = %err, "authorization failed");
        self.last_failure = Some(err.to_string());
        self.reset();
        err
    }

    fn reset(&mut self) {
        self.session = None;
        self.verifier.clear();
        self.state = AuthState::Unauthenticated;
    }

    #[cfg(test)]
    pub(crate) fn restore_session(&mut self, session: Session) {
        self.session = Some(session);
        self.state = AuthState::Authenticated;
    }

    pub fn logout(&mut self) {
        self.reset();
        tracing::info!("logged out");
    }

    /// Drop the session if `err` says the token is no longer accepted. Returns whether it did.
    pub fn invalidate(&mut self, err: &Error) -> bool {
        if !err.is_auth() {
            return false;
        }
        tracing::warn!(error = %err, "session invalidated");
        self.last_failure = Some(err.to_string());
        self.reset();
        true
    }
}
