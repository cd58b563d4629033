//! services/reader/src/app/auth.rs
//!
//! The auth slice: who is logged in, and the actions that change it. The token
//! and user are mirrored into session storage under `token` and `user`.

use auraread_core::domain::{AuthSession, Credentials, Registration, User};
use auraread_core::ports::{PortError, PortResult, SessionStorage};
use tracing::{error, info, warn};

use crate::adapters::records::UserRecord;
use crate::adapters::storage::{TOKEN_KEY, USER_KEY};
use crate::app::state::AppStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub error: Option<String>,
}

impl AuthState {
    /// Rebuilds the state from storage. A session needs both a token and a
    /// readable user; anything less starts logged out.
    pub fn restore(storage: &dyn SessionStorage) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                error!("Error loading session from storage: {}", e);
                return Self::default();
            }
        };
        let user = storage
            .get_item(USER_KEY)
            .ok()
            .flatten()
            .and_then(|raw| match serde_json::from_str::<UserRecord>(&raw) {
                Ok(record) => Some(record.to_domain()),
                Err(e) => {
                    warn!("Ignoring unreadable stored user: {}", e);
                    None
                }
            });
        match (token, user) {
            (Some(token), Some(user)) => Self {
                token: Some(token),
                user: Some(user),
                error: None,
            },
            _ => Self::default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

fn persist_session(storage: &dyn SessionStorage, session: &AuthSession) -> PortResult<()> {
    let user = serde_json::to_string(&UserRecord::from_domain(&session.user))
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    storage.set_item(TOKEN_KEY, &session.token)?;
    storage.set_item(USER_KEY, &user)
}

fn clear_session(storage: &dyn SessionStorage) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = storage.remove_item(key) {
            error!("Failed to clear '{}' from session storage: {}", key, e);
        }
    }
}

impl AppStore {
    pub async fn login(&mut self, credentials: &Credentials) -> PortResult<User> {
        self.auth.error = None;
        let result = self.services.auth.login(credentials).await;
        self.start_session(result)
    }

    /// Registers a new account and logs straight into it.
    pub async fn register(&mut self, registration: &Registration) -> PortResult<User> {
        self.auth.error = None;
        let result = self.services.auth.register(registration).await;
        self.start_session(result)
    }

    fn start_session(&mut self, result: PortResult<AuthSession>) -> PortResult<User> {
        let session = match result {
            Ok(session) => session,
            Err(e) => {
                self.auth.error = Some(e.message().to_string());
                return Err(e);
            }
        };
        if let Err(e) = persist_session(self.services.storage.as_ref(), &session) {
            self.auth.error = Some(e.message().to_string());
            return Err(e);
        }
        info!("Logged in as {}", session.user.username);
        self.auth = AuthState {
            token: Some(session.token),
            user: Some(session.user.clone()),
            error: None,
        };
        Ok(session.user)
    }

    /// Logs out on the server and locally. Local state is cleared even when
    /// the server call fails; that failure is still returned.
    pub async fn logout(&mut self) -> PortResult<()> {
        let result = self.services.auth.logout().await;
        if let Err(e) = &result {
            warn!("Server logout failed: {}", e);
        }
        self.force_logout();
        result
    }

    /// Refreshes the user from the server. Any failure ends the session.
    pub async fn load_current_user(&mut self) -> PortResult<User> {
        self.auth.error = None;
        match self.services.auth.current_user().await {
            Ok(user) => {
                self.auth.user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.force_logout();
                self.auth.error = Some(e.message().to_string());
                Err(e)
            }
        }
    }

    /// Drops the session without talking to the server.
    pub fn force_logout(&mut self) {
        clear_session(self.services.storage.as_ref());
        self.auth = AuthState::default();
        self.documents = Default::default();
        self.annotations = Default::default();
        info!("Session cleared");
    }

    pub fn clear_auth_error(&mut self) {
        self.auth.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemorySessionStorage;

    #[test]
    fn restore_requires_token_and_user() {
        let storage = MemorySessionStorage::new();
        assert!(!AuthState::restore(&storage).is_authenticated());

        storage.set_item(TOKEN_KEY, "abc").unwrap();
        assert!(!AuthState::restore(&storage).is_authenticated());

        storage.set_item(USER_KEY, r#"{"id":1,"username":"ada"}"#).unwrap();
        let state = AuthState::restore(&storage);
        assert!(state.is_authenticated());
        assert_eq!(state.user.unwrap().username, "ada");
    }

    #[test]
    fn restore_ignores_corrupt_user() {
        let storage = MemorySessionStorage::new();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();
        assert_eq!(AuthState::restore(&storage), AuthState::default());
    }
}
