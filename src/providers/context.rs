use parking_lot::Mutex;
use std::sync::Arc;

use super::agent::UserAgent;
use super::http::Transport;
use super::session::SessionStore;
use super::types::ProviderId;
use crate::models::AuthSession;
use crate::notifier::Notifier;

/// Host collaborators shared by every provider client.
#[derive(Clone)]
pub struct ProviderContext {
    pub transport: Arc<dyn Transport>,
    pub sessions: Arc<dyn SessionStore>,
    pub agent: Arc<dyn UserAgent>,
    pub notifier: Arc<dyn Notifier>,
}

/// The in-memory copy of one provider's session, kept in step with the store.
pub struct AuthSlot {
    provider: ProviderId,
    current: Mutex<Option<AuthSession>>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthSlot {
    pub fn new(provider: ProviderId, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            provider,
            current: Mutex::new(None),
            sessions,
        }
    }

    pub fn get(&self) -> Option<AuthSession> {
        self.current.lock().clone()
    }

    /// Persisted session, without adopting it.
    pub fn stored(&self) -> Option<AuthSession> {
        self.sessions.load(self.provider)
    }

    /// Adopts `session` and persists it. A failed write is logged; the session
    /// still serves the running process.
    pub fn set(&self, session: AuthSession) {
        if let Err(e) = self.sessions.save(self.provider, &session) {
            log::error!("Failed to persist {} session: {}", self.provider, e);
        }
        *self.current.lock() = Some(session);
    }

    /// Adopts a session that is already persisted.
    pub fn adopt(&self, session: AuthSession) {
        *self.current.lock() = Some(session);
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
        if let Err(e) = self.sessions.clear(self.provider) {
            log::error!("Failed to clear {} session: {}", self.provider, e);
        }
    }

    pub fn valid_token(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .filter(|s| s.is_valid())
            .map(|s| s.access_token.clone())
    }

    pub fn is_valid(&self) -> bool {
        self.valid_token().is_some()
    }
}
