pub mod error;

pub use error::*;

use fleetform_core::{PollConfig, ReconcileConfig};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the project file directly
pub const CONFIG_ENV: &str = "FLEETFORM_CONFIG";

/// Project-local directory holding the project file and state
pub const PROJECT_DIR: &str = ".fleetform";

const CANDIDATES: [&str; 4] = [
    "fleet.local.yaml",
    ".fleet.local.yaml",
    "fleet.yaml",
    ".fleet.yaml",
];

/// Locate the project file.
///
/// Search order:
/// 1. `FLEETFORM_CONFIG` (direct path)
/// 2. current directory: fleet.local.yaml, .fleet.local.yaml, fleet.yaml, .fleet.yaml
/// 3. `./.fleetform/`: same order
/// 4. `~/.config/fleetform/fleet.yaml` (global)
pub fn find_project_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points at missing file {}", CONFIG_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("fleetform").join("fleet.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ProjectFileNotFound)
}

/// Directory that owns the project file's state.
///
/// A file inside `.fleetform/` belongs to that directory's parent.
pub fn project_root(project_file: &Path) -> PathBuf {
    let dir = project_file.parent().unwrap_or(Path::new("."));
    if dir.file_name().is_some_and(|name| name == PROJECT_DIR) {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

/// A project file: global settings plus named fleet declarations.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "R: DeserializeOwned"))]
pub struct ProjectFile<R> {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default = "BTreeMap::new")]
    pub fleets: BTreeMap<String, R>,
}

impl<R: DeserializeOwned> ProjectFile<R> {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded project file {}", path.display());
        Self::parse(&content, path)
    }

    /// `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// AWS region; falls back to the SDK's own resolution
    #[serde(default)]
    pub region: Option<String>,

    /// AWS shared-config profile
    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Convergence timing, in seconds. Unset values keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeouts {
    #[serde(default)]
    pub create_secs: Option<u64>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub max_poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub visibility_grace_secs: Option<u64>,
}

/// Upper bound for every `timeouts.*` value (one day).
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

fn bounded(field: &str, secs: Option<u64>) -> Result<Option<Duration>> {
    match secs {
        Some(secs) if secs > MAX_TIMEOUT_SECS => Err(ConfigError::InvalidSettings(format!(
            "timeouts.{} ({}s) exceeds the {}s limit",
            field, secs, MAX_TIMEOUT_SECS
        ))),
        secs => Ok(secs.map(Duration::from_secs)),
    }
}

impl Timeouts {
    pub fn poll_config(&self) -> Result<PollConfig> {
        let mut config = PollConfig::default();
        if let Some(timeout) = bounded("create_secs", self.create_secs)? {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidSettings(
                    "timeouts.create_secs must be positive".to_string(),
                ));
            }
            config.timeout = timeout;
        }
        if let Some(interval) = bounded("poll_interval_secs", self.poll_interval_secs)? {
            config.initial_interval = interval;
        }
        if let Some(interval) = bounded("max_poll_interval_secs", self.max_poll_interval_secs)? {
            config.max_interval = interval;
        }
        if let Some(grace) = bounded("visibility_grace_secs", self.visibility_grace_secs)? {
            config.visibility_grace = grace;
        }
        if config.visibility_grace >= config.timeout {
            return Err(ConfigError::InvalidSettings(format!(
                "timeouts.visibility_grace_secs ({}s) must be shorter than create_secs ({}s)",
                config.visibility_grace.as_secs(),
                config.timeout.as_secs()
            )));
        }
        if config.initial_interval > config.max_interval {
            return Err(ConfigError::InvalidSettings(format!(
                "timeouts.poll_interval_secs ({}s) exceeds max_poll_interval_secs ({}s)",
                config.initial_interval.as_secs(),
                config.max_interval.as_secs()
            )));
        }
        Ok(config)
    }

    pub fn reconcile_config(&self) -> Result<ReconcileConfig> {
        Ok(ReconcileConfig {
            create: self.poll_config()?,
        })
    }
}
