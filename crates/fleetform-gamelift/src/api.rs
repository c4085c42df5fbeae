//! Request and response shapes of the GameLift fleet API
//!
//! These mirror the remote wire model. The SDK adapter in [`crate::client`]
//! converts them to and from `aws_sdk_gamelift` types.

use crate::status::FleetStatus;
use fleetform_core::RemoteEntity;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Tcp,
    Udp,
}

impl IpProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpProtocol::Tcp => "TCP",
            IpProtocol::Udp => "UDP",
        }
    }

    /// Case-insensitive parse; `None` for anything but TCP or UDP.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("tcp") {
            Some(IpProtocol::Tcp)
        } else if s.eq_ignore_ascii_case("udp") {
            Some(IpProtocol::Udp)
        } else {
            None
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPermission {
    pub from_port: i32,
    pub to_port: i32,
    pub ip_range: String,
    pub protocol: IpProtocol,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCreationLimitPolicy {
    pub new_game_sessions_per_creator: Option<i32>,
    pub policy_period_in_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProcess {
    pub launch_path: String,
    pub parameters: Option<String>,
    pub concurrent_executions: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfiguration {
    pub server_processes: Vec<ServerProcess>,
    pub max_concurrent_game_session_activations: Option<i32>,
    pub game_session_activation_timeout_seconds: Option<i32>,
}

/// CreateFleet input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFleetRequest {
    pub name: String,
    pub build_id: String,
    pub ec2_instance_type: String,
    pub description: Option<String>,
    pub ec2_inbound_permissions: Option<Vec<IpPermission>>,
    pub log_paths: Option<Vec<String>>,
    pub metric_groups: Option<Vec<String>>,
    pub new_game_session_protection_policy: Option<String>,
    pub peer_vpc_aws_account_id: Option<String>,
    pub peer_vpc_id: Option<String>,
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
    pub runtime_configuration: Option<RuntimeConfiguration>,
    pub server_launch_parameters: Option<String>,
    pub server_launch_path: Option<String>,
}

/// UpdateFleetAttributes input, plus the runtime configuration which the
/// service updates through a separate call. Unset fields are left untouched
/// remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFleetRequest {
    pub name: String,
    pub description: Option<String>,
    pub metric_groups: Option<Vec<String>>,
    pub new_game_session_protection_policy: Option<String>,
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
    pub runtime_configuration: Option<RuntimeConfiguration>,
}

/// Fleet as reported by the service.
///
/// `inbound_permissions` and `runtime_configuration` come from separate
/// describe calls and are `None` when those were not fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetAttributes {
    pub fleet_id: String,
    pub fleet_arn: Option<String>,
    pub status: FleetStatus,
    pub name: Option<String>,
    pub build_id: Option<String>,
    pub instance_type: Option<String>,
    pub description: Option<String>,
    pub log_paths: Option<Vec<String>>,
    pub metric_groups: Option<Vec<String>>,
    pub new_game_session_protection_policy: Option<String>,
    pub operating_system: Option<String>,
    pub peer_vpc_aws_account_id: Option<String>,
    pub peer_vpc_id: Option<String>,
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
    pub runtime_configuration: Option<RuntimeConfiguration>,
    pub inbound_permissions: Option<Vec<IpPermission>>,
    pub server_launch_parameters: Option<String>,
    pub server_launch_path: Option<String>,
}

impl FleetAttributes {
    /// A bare fleet carrying only an id and status.
    pub fn new(fleet_id: impl Into<String>, status: FleetStatus) -> Self {
        Self {
            fleet_id: fleet_id.into(),
            fleet_arn: None,
            status,
            name: None,
            build_id: None,
            instance_type: None,
            description: None,
            log_paths: None,
            metric_groups: None,
            new_game_session_protection_policy: None,
            operating_system: None,
            peer_vpc_aws_account_id: None,
            peer_vpc_id: None,
            resource_creation_limit_policy: None,
            runtime_configuration: None,
            inbound_permissions: None,
            server_launch_parameters: None,
            server_launch_path: None,
        }
    }
}

impl RemoteEntity for FleetAttributes {
    type Status = FleetStatus;

    fn entity_id(&self) -> &str {
        &self.fleet_id
    }

    fn status(&self) -> FleetStatus {
        self.status.clone()
    }
}
