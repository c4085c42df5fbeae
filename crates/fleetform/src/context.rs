//! Loaded project and locked state sessions

use fleetform_config::{ProjectFile, Settings};
use fleetform_core::{
    CancellationToken, GlobalState, ResourceState, StateLock, StateManager,
};
use fleetform_gamelift::{
    FleetConfig, FleetReconciler, GameLiftClient, RESOURCE_TYPE, fleet_reconciler,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct Project {
    pub file: PathBuf,
    pub root: PathBuf,
    pub settings: Settings,
    pub fleets: BTreeMap<String, FleetConfig>,
}

impl Project {
    pub fn load(file: &Path) -> anyhow::Result<Self> {
        let project: ProjectFile<FleetConfig> = ProjectFile::load(file)?;
        Ok(Self {
            file: file.to_path_buf(),
            root: fleetform_config::project_root(file),
            settings: project.settings,
            fleets: project.fleets,
        })
    }

    pub fn fleet(&self, name: &str) -> anyhow::Result<&FleetConfig> {
        self.fleets.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.fleets.keys().map(String::as_str).collect();
            anyhow::anyhow!(
                "Fleet '{}' is not declared in {} (declared: {})",
                name,
                self.file.display(),
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )
        })
    }

    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.root)
    }

    pub async fn reconciler(
        &self,
        cancel: CancellationToken,
    ) -> anyhow::Result<FleetReconciler<GameLiftClient>> {
        let config = self.settings.timeouts.reconcile_config()?;
        let client =
            GameLiftClient::from_env(self.settings.region.clone(), self.settings.profile.clone())
                .await;
        Ok(fleet_reconciler(client, config).with_cancellation(cancel))
    }
}

/// State loaded under the project lock.
///
/// Records are saved even when an operation fails, so an id assigned
/// before a failed convergence wait is never lost.
pub struct Session {
    manager: StateManager,
    lock: StateLock,
    state: GlobalState,
}

impl Session {
    pub async fn open(project: &Project) -> anyhow::Result<Self> {
        let manager = project.state_manager();
        let lock = manager.acquire_lock().await?;
        let state = manager.load().await?;
        Ok(Self {
            manager,
            lock,
            state,
        })
    }

    pub fn record(&self, name: &str) -> ResourceState {
        self.state
            .record(&GlobalState::key(RESOURCE_TYPE, name), RESOURCE_TYPE)
    }

    /// Store `record` and write the state file.
    pub async fn put(&mut self, name: &str, record: ResourceState) -> anyhow::Result<()> {
        self.state
            .put(GlobalState::key(RESOURCE_TYPE, name), record);
        self.manager.save(&self.state).await?;
        Ok(())
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.lock.release().await?;
        Ok(())
    }
}
