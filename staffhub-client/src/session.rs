//! Session store: the single owner of the signed-in identity and its token.
//!
//! [`SessionStore`] restores a persisted token on startup, signs users in and out, and
//! reacts to the request pipeline detaching a rejected token. Consumers observe the
//! current [`SessionState`] through a `tokio::sync::watch` channel.

use shared::models::{LoginCredentials, User, UserRole};
use std::{fmt, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ApiClient, UnauthorizedHook},
    error::SessionError,
    navigation::Navigator,
    permissions::Permissions,
    routes::Route,
    storage::TokenStore,
};

/// An authenticated identity together with the token that proves it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity returned by the backend.
    pub user: User,
    token: String,
}

impl Session {
    /// Pair `user` with its bearer `token`.
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Bearer token of the session.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.email)
            .field("role", &self.user.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Observable state of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Current session, if signed in.
    pub session: Option<Session>,
    /// Bootstrap or login in progress.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

impl SessionState {
    /// Signed-in identity.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Role of the signed-in identity.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.user().map(|user| user.role)
    }

    /// Whether a session is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the signed-in identity holds the manager role.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role().is_some_and(UserRole::is_privileged)
    }
}

struct SessionShared {
    state: watch::Sender<SessionState>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionShared {
    fn forget_token(&self) {
        if let Err(err) = self.tokens.remove() {
            warn!(error = %err, "failed to erase persisted session token");
        }
    }

    /// Erase the persisted token unless a newer one has replaced `token`.
    fn forget_token_if(&self, token: &str) {
        match self.tokens.load() {
            Ok(Some(stored)) if stored != token => {
                debug!("persisted session token was replaced; keeping it");
            }
            Ok(_) => self.forget_token(),
            Err(err) => {
                warn!(error = %err, "could not read persisted session token; erasing it");
                self.forget_token();
            }
        }
    }

    fn clear_session(&self) {
        self.state.send_if_modified(|state| state.session.take().is_some());
    }

    /// Empty the session if it was built on `token`.
    ///
    /// Returns `false` when a session for a different token is present.
    fn release_session(&self, token: &str) -> bool {
        let mut owned = true;
        self.state.send_if_modified(|state| match &state.session {
            Some(session) if session.token() == token => {
                state.session = None;
                true
            }
            Some(_) => {
                owned = false;
                false
            }
            None => false,
        });
        owned
    }
}

impl UnauthorizedHook for SessionShared {
    fn on_unauthorized(&self, rejected_token: &str) {
        if !self.release_session(rejected_token) {
            debug!("rejected token belongs to a replaced session; keeping the current one");
            return;
        }
        self.forget_token_if(rejected_token);
        if self.navigator.current_route() == Some(Route::Login) {
            debug!("already on the login route; not redirecting");
        } else {
            self.navigator.redirect(Route::Login);
        }
    }
}

/// Owner of the session lifecycle.
///
/// Cloning is cheap; clones share state, storage, and the request pipeline.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    shared: Arc<SessionShared>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.shared.state.borrow())
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build a store around `api`, registering itself as the pipeline's 401 handler.
    ///
    /// The store starts in the loading state; call [`SessionStore::restore`] once.
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let shared = Arc::new(SessionShared {
            state,
            tokens,
            navigator,
        });
        let api = api.with_unauthorized_hook(shared.clone());
        Self { api, shared }
    }

    /// Pipeline that carries this store's token. Use it for every resource call.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Load the persisted token and validate it against the backend.
    ///
    /// Any failure discards the token and leaves the session empty. `loading` is always
    /// cleared on return.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<User> {
        let stored = match self.shared.tokens.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "could not read persisted session token");
                None
            }
        };

        let restored = match stored {
            None => {
                debug!("no persisted session token");
                None
            }
            Some(token) => {
                self.api.set_token(token.clone());
                match self.api.validate_token().await {
                    Ok(user) => {
                        info!(email = %user.email, role = %user.role, "session restored");
                        Some(Session::new(user, token))
                    }
                    Err(err) => {
                        warn!(error = %err, "persisted session token rejected; discarding");
                        self.api.clear_token_if(&token);
                        self.shared.forget_token_if(&token);
                        None
                    }
                }
            }
        };

        let user = restored.as_ref().map(|session| session.user.clone());
        self.shared.state.send_modify(|state| {
            // A login that finished while the token was being validated wins.
            if state.session.is_none() {
                state.session = restored;
            }
            state.loading = false;
        });
        user
    }

    /// Exchange `credentials` for a session and navigate to the dashboard.
    ///
    /// # Errors
    /// Returns [`SessionError::Rejected`] with a user-facing message when the backend or
    /// network refuses the login, or [`SessionError::Storage`] when the issued token
    /// cannot be persisted. The previous session and storage are left untouched.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, SessionError> {
        self.shared
            .state
            .send_if_modified(|state| !std::mem::replace(&mut state.loading, true));

        let result = self.sign_in(credentials).await;

        self.shared
            .state
            .send_if_modified(|state| std::mem::replace(&mut state.loading, false));

        match &result {
            Ok(user) => info!(role = %user.role, "signed in"),
            Err(err) => warn!(error = %err, "sign-in failed"),
        }
        result
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<User, SessionError> {
        let payload = self.api.login(credentials).await?;
        if payload.token.trim().is_empty() {
            return Err(SessionError::rejected(crate::error::GENERIC_LOGIN_FAILURE));
        }

        self.shared.tokens.store(&payload.token)?;
        self.api.set_token(payload.token.clone());

        let user = payload.user.clone();
        self.shared.state.send_modify(|state| {
            state.session = Some(Session::new(payload.user, payload.token));
            state.loading = false;
        });
        self.shared.navigator.push(Route::Dashboard);
        Ok(user)
    }

    /// Sign out locally: forget the token, empty the session, and go to the login route.
    pub fn logout(&self) {
        self.shared.forget_token();
        self.api.clear_token();
        self.shared.clear_session();
        self.shared.navigator.push(Route::Login);
        info!("signed out");
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Wait until no bootstrap or login is in progress and return the settled state.
    pub async fn ready(&self) -> SessionState {
        let mut receiver = self.subscribe();
        match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Signed-in identity.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.shared.state.borrow().user().cloned()
    }

    /// Whether a session is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    /// Whether the signed-in identity holds the manager role.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.shared.state.borrow().is_privileged()
    }

    /// Whether bootstrap or a login is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// Client-side permissions of the signed-in identity.
    #[must_use]
    pub fn permissions(&self) -> Permissions {
        Permissions::for_user(self.shared.state.borrow().user())
    }
}
