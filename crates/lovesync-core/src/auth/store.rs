//! The session store: one owned session, its persisted token, and the three
//! network-backed actions (login, register, fetch current user).
//!
//! Every mutation goes through `Session::transition` first; the resulting
//! storage effect is applied afterwards by `sync_storage`. Storage failures
//! never reach the caller: the store logs them, marks itself degraded and
//! keeps working in memory for the rest of the process lifetime.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, LoginResponse, ProfileResponse, Registration, User};

use super::session::{Session, SessionEvent, StorageEffect};
use super::storage::TokenStorage;

/// What `fetch_current_user` does with the session when the request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Any failure logs out.
    #[default]
    Logout,
    /// Only a 401/403 logs out; network and server failures keep the session.
    LogoutOnRejection,
}

impl FetchFailurePolicy {
    fn should_logout(self, error: &ApiError) -> bool {
        match self {
            FetchFailurePolicy::Logout => true,
            FetchFailurePolicy::LogoutOnRejection => error.is_credential_rejection(),
        }
    }
}

pub struct SessionStore {
    session: Session,
    storage: Box<dyn TokenStorage>,
    api: ApiClient,
    policy: FetchFailurePolicy,
    storage_degraded: bool,
}

impl SessionStore {
    /// Create a store, hydrating the token from `storage`.
    pub fn new(api: ApiClient, storage: Box<dyn TokenStorage>) -> Self {
        let (stored, storage_degraded) = match storage.load() {
            Ok(token) => (token, false),
            Err(e) => {
                warn!(error = %e, "Token storage unavailable, session will not persist");
                (None, true)
            }
        };

        let session = Session::hydrated(stored);
        debug!(authenticated = session.is_authenticated(), "Session hydrated");

        let mut store = Self {
            session,
            storage,
            api,
            policy: FetchFailurePolicy::default(),
            storage_degraded,
        };
        store.sync_api_token();
        store
    }

    pub fn with_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn policy(&self) -> FetchFailurePolicy {
        self.policy
    }

    /// True once a storage read or write has failed; the session then only
    /// lives in memory.
    pub fn storage_degraded(&self) -> bool {
        self.storage_degraded
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn set_token(&mut self, token: Option<String>) {
        self.commit(SessionEvent::TokenSet(token));
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.commit(SessionEvent::UserSet(user));
    }

    pub fn logout(&mut self) {
        self.commit(SessionEvent::LoggedOut);
        info!("Logged out");
    }

    fn commit(&mut self, event: SessionEvent) {
        let (next, effect) = self.session.transition(event);
        self.session = next;
        self.sync_api_token();
        self.sync_storage(effect);
    }

    fn sync_api_token(&mut self) {
        self.api.set_token(self.session.token().map(str::to_string));
    }

    fn sync_storage(&mut self, effect: StorageEffect) {
        let result = match effect {
            StorageEffect::Write(ref token) => self.storage.store(token),
            StorageEffect::Remove => self.storage.remove(),
            StorageEffect::Nothing => return,
        };
        if let Err(e) = result {
            warn!(error = %e, ?effect, "Failed to sync token storage");
            self.storage_degraded = true;
        }
    }

    // =========================================================================
    // Network actions
    // =========================================================================

    /// Log in and adopt the returned token and user.
    ///
    /// On failure the session is left untouched.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = self.api.obtain_token(credentials).await.inspect_err(|e| {
            warn!(username = %credentials.username, error = %e, "Login failed");
        })?;

        self.set_token(Some(response.access.clone()));
        self.set_user(Some(response.user.clone()));
        info!(user_id = response.user.id, "Login successful");
        Ok(response)
    }

    /// Create an account. Registering does not log in.
    pub async fn register(&mut self, registration: &Registration) -> Result<serde_json::Value, ApiError> {
        let payload = self.api.register(registration).await.inspect_err(|e| {
            warn!(username = %registration.username, error = %e, "Registration failed");
        })?;
        info!(username = %registration.username, "Registration successful");
        Ok(payload)
    }

    /// Fetch the profile for the current token and store the user.
    ///
    /// On failure the fetch-failure policy decides whether to log out; the
    /// error is returned either way.
    pub async fn fetch_current_user(&mut self) -> Result<ProfileResponse, ApiError> {
        match self.api.fetch_profile().await {
            Ok(response) => {
                self.set_user(Some(response.user.clone()));
                debug!(user_id = response.user.id, "Current user fetched");
                Ok(response)
            }
            Err(e) => {
                if self.policy.should_logout(&e) {
                    warn!(error = %e, "Fetching current user failed, logging out");
                    self.logout();
                } else {
                    warn!(error = %e, "Fetching current user failed, keeping session");
                }
                Err(e)
            }
        }
    }
}
