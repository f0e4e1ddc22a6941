//! Authentication state and its persistence.
//!
//! Only the token is persisted. The user profile is re-fetched on every
//! bootstrap, and a token the backend refuses is wiped from the store.

use std::sync::Arc;

use tracing::{info, warn};

use super::token::AccessToken;
use crate::activity::Indicator;
use super::validation::is_valid_token;
use crate::api::{Backend, UserProfile};
use crate::error::SessionError;
use crate::store::{CredentialStore, SELECTED_BRANCH_KEY, TOKEN_KEY};

/// In-memory authentication state.
///
/// `user` is only ever set alongside a token that the backend accepted.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<AccessToken>,
    user: Option<UserProfile>,
    loading: Indicator,
}

impl Session {
    fn starting() -> Self {
        Self {
            token: None,
            user: None,
            loading: Indicator::new(true),
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    /// Handle that stays true while bootstrap or a code login is in flight.
    pub fn loading_indicator(&self) -> Indicator {
        self.loading.clone()
    }

    /// A token is present. Says nothing about whether the user fetch succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// How startup resolved the persisted session.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// Nothing stored; user must log in.
    NoSession,
    /// Stored token accepted and the user profile loaded.
    Restored,
    /// Stored token refused. Persisted keys were cleared; carries `AuthInvalid`.
    TokenRejected(SessionError),
}

/// Owns the session and keeps it in step with the credential store.
///
/// Mutating operations take `&mut self`, so a single owner serializes
/// bootstrap, login and logout.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn Backend>,
    session: Session,
    bootstrapped: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn Backend>) -> Self {
        Self {
            store,
            backend,
            session: Session::starting(),
            bootstrapped: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Restore the session persisted by a previous run.
    ///
    /// Runs once per manager; `loading` is false afterwards whatever the result.
    /// A store read failure is returned as `Persistence` and leaves the session
    /// signed out.
    pub async fn bootstrap(&mut self) -> Result<BootstrapOutcome, SessionError> {
        if self.bootstrapped {
            warn!("Ignoring repeated session bootstrap");
            return Err(SessionError::AlreadyBootstrapped);
        }
        self.bootstrapped = true;

        let outcome = self.restore().await;
        self.session.loading.set(false);
        match &outcome {
            Ok(BootstrapOutcome::Restored) => info!("Session restored from secure store"),
            Ok(BootstrapOutcome::NoSession) => info!("No stored session, login required"),
            Ok(BootstrapOutcome::TokenRejected(e)) => info!("Stored session discarded: {}", e),
            Err(e) => warn!("Session bootstrap failed: {}", e),
        }
        outcome
    }

    async fn restore(&mut self) -> Result<BootstrapOutcome, SessionError> {
        let Some(stored) = self.store.get(TOKEN_KEY)? else {
            return Ok(BootstrapOutcome::NoSession);
        };

        let token = AccessToken::from_stored(stored);
        self.session.token = Some(token.clone());

        match self.backend.current_user(&token).await {
            Ok(user) => {
                self.session.user = Some(user);
                Ok(BootstrapOutcome::Restored)
            }
            Err(e) => {
                warn!("Stored token rejected, signing out: {}", e);
                if let Err(cleanup) = self.logout() {
                    warn!("Could not fully clear rejected session: {}", cleanup);
                }
                Ok(BootstrapOutcome::TokenRejected(SessionError::AuthInvalid(e)))
            }
        }
    }

    /// Persist `token` and adopt it together with `user`. Bare GitHub tokens
    /// are stored with the `Bearer ` scheme so the stored value is header-ready.
    ///
    /// The store is written first; on failure nothing in memory changes.
    pub fn login(&mut self, token: AccessToken, user: UserProfile) -> Result<(), SessionError> {
        if !is_valid_token(token.as_header_value()) {
            return Err(SessionError::InvalidToken);
        }
        let token = token.with_bearer_scheme();

        self.store.set(TOKEN_KEY, token.as_header_value())?;
        self.session.token = Some(token);
        self.session.user = Some(user);
        info!(
            "Logged in as {}",
            self.session
                .user()
                .and_then(UserProfile::login)
                .unwrap_or("<unknown>")
        );
        Ok(())
    }

    /// Complete the OAuth flow: exchange `code`, validate the new token by
    /// fetching the user, then [`login`](Self::login).
    ///
    /// Any failure leaves the session as it was.
    pub async fn login_with_code(&mut self, code: &str, redirect_uri: &str) -> Result<(), SessionError> {
        let (token, user) = {
            let _busy = self.session.loading.hold();
            self.authenticate_code(code, redirect_uri).await?
        };
        self.login(token, user)
    }

    async fn authenticate_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(AccessToken, UserProfile), SessionError> {
        let raw = self.backend.exchange_code(code, redirect_uri).await?;
        let token = AccessToken::bearer(&raw);
        let user = self
            .backend
            .current_user(&token)
            .await
            .map_err(SessionError::AuthInvalid)?;
        Ok((token, user))
    }

    /// Forget the token and selected branch, locally and in the store.
    ///
    /// In-memory state is always cleared. Both deletes are attempted; the
    /// first failure is returned so callers can report it.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let token_deleted = self.store.delete(TOKEN_KEY);
        let branch_deleted = self.store.delete(SELECTED_BRANCH_KEY);
        self.session.clear();
        info!("Session cleared");

        token_deleted.and(branch_deleted).map_err(|e| {
            warn!("Logout could not clear secure store: {}", e);
            SessionError::from(e)
        })
    }
}
