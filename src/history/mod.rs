pub mod models;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::errors::AppError;
pub use models::{default_playlist_name, HistoryRecord};

/// Saved generations, listed newest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(&self, record: HistoryRecord) -> Result<(), AppError>;
    async fn list(&self) -> Result<Vec<HistoryRecord>, AppError>;
    async fn get(&self, id: &str) -> Result<Option<HistoryRecord>, AppError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

fn newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, record: HistoryRecord) -> Result<(), AppError> {
        let mut records = self.records.lock();
        records.retain(|r| r.id != record.id);
        records.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let mut records = self.records.lock().clone();
        newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<HistoryRecord>, AppError> {
        Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.records.lock().clear();
        Ok(())
    }
}

/// All records in one JSON array. Every write replaces the file through a
/// temp file and rename; writers are serialized by `lock`.
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Storage(format!("Corrupt history file {}: {}", self.path.display(), e))
        })
    }

    fn write_all(&self, records: &[HistoryRecord]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn save(&self, record: HistoryRecord) -> Result<(), AppError> {
        let _guard = self.lock.lock();
        let mut records = self.read_all()?;
        records.retain(|r| r.id != record.id);
        log::info!(
            "Saving history record {} ({} recommendations)",
            record.id,
            record.recommendations.len()
        );
        records.push(record);
        self.write_all(&records)
    }

    async fn list(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let _guard = self.lock.lock();
        let mut records = self.read_all()?;
        newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<HistoryRecord>, AppError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.into_iter().find(|r| r.id == id))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.lock.lock();
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        Ok(true)
    }

    async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
