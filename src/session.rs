use crate::api::client::{ApiClient, ApiError};
use crate::storage::{LocalStore, StorageError, TOKEN_KEY};

pub const LOGIN_ERROR: &str = "Usuário ou senha inválidos";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("login failed: {0}")]
    Login(#[from] ApiError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Message shown to the operator; failures are not told apart.
    pub fn user_message(&self) -> &'static str {
        LOGIN_ERROR
    }
}

/// Authentication gate: owns the stored token and keeps the client's bearer
/// credential in sync with it.
#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    store: LocalStore,
    authenticated: bool,
}

impl Session {
    pub fn new(client: ApiClient, store: LocalStore) -> Self {
        Self {
            client,
            store,
            authenticated: false,
        }
    }

    /// Picks up a token left by a previous run.
    pub fn restore(&mut self) -> bool {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => {
                log::info!("restored stored session");
                self.client.set_bearer(Some(token));
                self.authenticated = true;
            }
            Ok(_) => {}
            Err(e) => log::warn!("could not read stored session: {e}"),
        }
        self.authenticated
    }

    pub fn login(&mut self, token: &str) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token)?;
        self.client.set_bearer(Some(token.to_string()));
        self.authenticated = true;
        log::info!("session started");
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            log::warn!("could not remove stored session: {e}");
        }
        self.client.set_bearer(None);
        self.authenticated = false;
        log::info!("session ended");
    }

    /// Exchanges credentials for a token. Any credential left from an
    /// earlier session is dropped when the exchange fails.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        match self.client.login(username, password).await {
            Ok(token) => self.login(&token),
            Err(e) => {
                log::error!("login failed: {e}");
                self.logout();
                Err(e.into())
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
