//! Local state for managed resources
//!
//! Manages the `.fleetform/state.json` file which records, for every
//! declared resource, the id the remote system assigned to it and the
//! attributes observed by the latest read.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".fleetform";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Locks older than this are considered abandoned.
const STALE_LOCK_HOURS: i64 = 1;

/// Contents of the state file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Records indexed by `type:name`
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which a declared resource is stored
    pub fn key(resource_type: &str, name: &str) -> String {
        format!("{}:{}", resource_type, name)
    }

    /// Record for `key`, or a fresh absent record of `resource_type`
    pub fn record(&self, key: &str, resource_type: &str) -> ResourceState {
        self.resources
            .get(key)
            .cloned()
            .unwrap_or_else(|| ResourceState::new(resource_type))
    }

    /// Store a record. Records without an id are dropped from the file.
    pub fn put(&mut self, key: String, state: ResourceState) {
        if state.has_id() {
            self.resources.insert(key, state);
        } else {
            self.resources.remove(&key);
        }
        self.updated_at = Utc::now();
    }

    pub fn get(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    /// Records of one resource type
    pub fn by_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a ResourceState)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }
}

/// Local record of one managed entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Id assigned by the remote system; empty when not created or gone
    #[serde(default)]
    pub id: String,

    /// Resource type
    pub resource_type: String,

    /// Lifecycle phase
    pub status: ResourceStatus,

    /// Status string last reported by the remote system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<String>,

    /// Attributes observed by the latest read
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    /// When the id was recorded
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Absent,
            remote_status: None,
            attributes: serde_json::Map::new(),
            created_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn transition(&mut self, status: ResourceStatus) {
        if self.status != status {
            tracing::debug!(
                "{} {}: {} -> {}",
                self.resource_type,
                self.id,
                self.status,
                status
            );
        }
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn record_id(&mut self, id: impl Into<String>) {
        let now = Utc::now();
        self.id = id.into();
        self.created_at = Some(now);
        self.updated_at = now;
    }

    /// Forget the remote entity: the id, its attributes and its status.
    pub fn clear(&mut self) {
        self.id.clear();
        self.remote_status = None;
        self.attributes.clear();
        self.created_at = None;
        self.transition(ResourceStatus::Gone);
    }

    /// Replace (never merge) the observed attributes.
    pub fn observe(
        &mut self,
        remote_status: impl Into<String>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) {
        self.remote_status = Some(remote_status.into());
        self.attributes = attributes;
        self.updated_at = Utc::now();
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Lifecycle phase of a managed resource, from the caller's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Never created
    Absent,
    /// Create accepted, waiting for convergence
    Creating,
    /// Converged
    Active,
    /// Update in flight
    Updating,
    /// Delete in flight
    Deleting,
    /// Deleted, or found missing by a read
    Gone,
    /// The last operation failed
    Failed,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Absent => write!(f, "absent"),
            ResourceStatus::Creating => write!(f, "creating"),
            ResourceStatus::Active => write!(f, "active"),
            ResourceStatus::Updating => write!(f, "updating"),
            ResourceStatus::Deleting => write!(f, "deleting"),
            ResourceStatus::Gone => write!(f, "gone"),
            ResourceStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Reads and writes the state file of one project
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state; a missing file is an empty state.
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !fs::try_exists(&path).await? {
            tracing::debug!("State file not found, starting from empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup.
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if fs::try_exists(&path).await? {
            fs::copy(&path, self.backup_path()).await?;
        }

        // Write to a sibling file first so a crash never leaves half a state file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_string_pretty(state)?).await?;
        fs::rename(&staging, &path).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Acquire the project lock, serializing callers across processes.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        if fs::try_exists(&lock_path).await? {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < STALE_LOCK_HOURS {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} (pid {}) since {}",
                    lock_info.holder, lock_info.pid, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock held by {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&lock_info)?).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    #[serde(default)]
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if fs::try_exists(&self.lock_path).await? {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
