//! Fleet status domain

use fleetform_core::Convergence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a GameLift fleet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FleetStatus {
    New,
    Downloading,
    Validating,
    Building,
    Activating,
    Active,
    Deleting,
    Error,
    Terminated,
    NotFound,
    /// A status this version does not know about
    Unknown(String),
}

impl FleetStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FleetStatus::New => "NEW",
            FleetStatus::Downloading => "DOWNLOADING",
            FleetStatus::Validating => "VALIDATING",
            FleetStatus::Building => "BUILDING",
            FleetStatus::Activating => "ACTIVATING",
            FleetStatus::Active => "ACTIVE",
            FleetStatus::Deleting => "DELETING",
            FleetStatus::Error => "ERROR",
            FleetStatus::Terminated => "TERMINATED",
            FleetStatus::NotFound => "NOT_FOUND",
            FleetStatus::Unknown(s) => s,
        }
    }
}

impl From<&str> for FleetStatus {
    fn from(s: &str) -> Self {
        match s {
            "NEW" => FleetStatus::New,
            "DOWNLOADING" => FleetStatus::Downloading,
            "VALIDATING" => FleetStatus::Validating,
            "BUILDING" => FleetStatus::Building,
            "ACTIVATING" => FleetStatus::Activating,
            "ACTIVE" => FleetStatus::Active,
            "DELETING" => FleetStatus::Deleting,
            "ERROR" => FleetStatus::Error,
            "TERMINATED" => FleetStatus::Terminated,
            "NOT_FOUND" => FleetStatus::NotFound,
            other => FleetStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FleetStatus {
    fn from(s: String) -> Self {
        FleetStatus::from(s.as_str())
    }
}

impl From<FleetStatus> for String {
    fn from(status: FleetStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for FleetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses a new fleet moves through before it becomes ACTIVE.
pub fn create_convergence() -> Convergence<FleetStatus> {
    Convergence::new(
        [
            FleetStatus::Activating,
            FleetStatus::Building,
            FleetStatus::Downloading,
            FleetStatus::New,
            FleetStatus::Validating,
        ],
        [FleetStatus::Active],
    )
}
