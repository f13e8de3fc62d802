use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::types::ProviderId;
use crate::errors::AppError;
use crate::models::AuthSession;

/// Key-value persistence for one `AuthSession` per provider.
///
/// A load either returns a complete session or nothing; partially written or
/// corrupt entries read as absent.
pub trait SessionStore: Send + Sync {
    fn load(&self, provider: ProviderId) -> Option<AuthSession>;
    fn save(&self, provider: ProviderId, session: &AuthSession) -> Result<(), AppError>;
    fn clear(&self, provider: ProviderId) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<ProviderId, AuthSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, provider: ProviderId) -> Option<AuthSession> {
        self.sessions.lock().get(&provider).cloned()
    }

    fn save(&self, provider: ProviderId, session: &AuthSession) -> Result<(), AppError> {
        self.sessions.lock().insert(provider, session.clone());
        Ok(())
    }

    fn clear(&self, provider: ProviderId) -> Result<(), AppError> {
        self.sessions.lock().remove(&provider);
        Ok(())
    }
}

/// One JSON file per provider. Writes go to a temp file that is renamed over
/// the target, so a crash mid-write leaves the previous file intact.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, provider: ProviderId) -> PathBuf {
        self.dir.join(format!("{}.json", provider.session_key()))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, provider: ProviderId) -> Option<AuthSession> {
        let path = self.path_for(provider);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Could not read session {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Ignoring corrupt session {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, provider: ProviderId, session: &AuthSession) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(provider);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, serde_json::to_vec(session)?)?;
        fs::rename(&tmp, &path)?;

        log::debug!("Persisted {} session to {}", provider, path.display());
        Ok(())
    }

    fn clear(&self, provider: ProviderId) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(provider)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
