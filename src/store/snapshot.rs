use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::credits::UserCredits;
use crate::model::{default_plans, PlanConfig, ScaleRecord, SessionRecord, User};

/// Raw key/value snapshot storage.
///
/// Writes are synchronous and atomic per key: callers always hand over a
/// complete serialized collection, never a partial update.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key under a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers; keep only filename-safe chars.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", safe))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Writing snapshot {} ({} bytes)", key, value.len());
        fs::write(&path, value)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove snapshot {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

fn credits_key(user_id: &str) -> String {
    format!("psikoscribe_credits_{}", user_id)
}

fn sessions_key(user_id: &str) -> String {
    format!("psikoscribe_sessions_{}", user_id)
}

fn scales_key(user_id: &str) -> String {
    format!("psikoscribe_scales_{}", user_id)
}

const PLANS_KEY: &str = "psikoscribe_plans";
const ACTIVE_USER_KEY: &str = "psikoscribe_user_session";

/// Typed access to the snapshot store.
///
/// Session, scale, and credit snapshots are namespaced by user id;
/// plans and the active login session are process-wide.
#[derive(Clone)]
pub struct DataStore {
    backend: Arc<dyn SnapshotStore>,
}

impl DataStore {
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self { backend }
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.load(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt snapshot under key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn save_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.save(key, &raw)
    }

    /// Load a user's ledger, seeding the free tier on first access.
    pub fn load_credits(&self, user_id: &str) -> Result<UserCredits> {
        match self.load_json(&credits_key(user_id))? {
            Some(credits) => Ok(credits),
            None => {
                let credits = UserCredits::default();
                self.save_credits(user_id, &credits)?;
                Ok(credits)
            }
        }
    }

    pub fn save_credits(&self, user_id: &str, credits: &UserCredits) -> Result<()> {
        self.save_json(&credits_key(user_id), credits)
    }

    pub fn load_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        Ok(self.load_json(&sessions_key(user_id))?.unwrap_or_default())
    }

    pub fn save_sessions(&self, user_id: &str, sessions: &[SessionRecord]) -> Result<()> {
        self.save_json(&sessions_key(user_id), &sessions)
    }

    pub fn load_scales(&self, user_id: &str) -> Result<Vec<ScaleRecord>> {
        Ok(self.load_json(&scales_key(user_id))?.unwrap_or_default())
    }

    pub fn save_scales(&self, user_id: &str, scales: &[ScaleRecord]) -> Result<()> {
        self.save_json(&scales_key(user_id), &scales)
    }

    /// Load the shared plan configuration, falling back to the seeded
    /// defaults when no admin has edited pricing yet.
    pub fn load_plans(&self) -> Result<Vec<PlanConfig>> {
        Ok(self.load_json(PLANS_KEY)?.unwrap_or_else(default_plans))
    }

    pub fn save_plans(&self, plans: &[PlanConfig]) -> Result<()> {
        self.save_json(PLANS_KEY, &plans)
    }

    pub fn load_active_user(&self) -> Result<Option<User>> {
        self.load_json(ACTIVE_USER_KEY)
    }

    pub fn save_active_user(&self, user: &User) -> Result<()> {
        self.save_json(ACTIVE_USER_KEY, user)
    }

    pub fn clear_active_user(&self) -> Result<()> {
        self.backend.remove(ACTIVE_USER_KEY)
    }
}
