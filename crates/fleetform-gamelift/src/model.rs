//! Declarative fleet configuration and its observed counterpart

use crate::status::FleetStatus;
use serde::{Deserialize, Serialize};

/// Operator-supplied fleet configuration.
///
/// Every optional field left unset is omitted from remote requests.
/// Nested blocks are `Option` so "not set" and "set but empty" stay
/// distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    #[serde(default)]
    pub build_id: String,
    #[serde(default)]
    pub ec2_instance_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec2_inbound_permissions: Option<Vec<IpPermission>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_game_session_protection_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_vpc_aws_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_vpc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_configuration: Option<RuntimeConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_launch_parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_launch_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpPermission {
    pub from_port: u16,
    pub to_port: u16,
    pub ip_range: String,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceCreationLimitPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_game_sessions_per_creator: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_period_in_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfiguration {
    #[serde(default)]
    pub server_processes: Vec<ServerProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_game_session_activations: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_session_activation_timeout_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerProcess {
    pub launch_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default = "default_concurrent_executions")]
    pub concurrent_executions: i32,
}

fn default_concurrent_executions() -> i32 {
    1
}

/// Local view of a remote fleet: the configuration fields as the service
/// reports them, plus output-only attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetState {
    pub fleet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fleet_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    pub status: FleetStatus,
    #[serde(flatten)]
    pub config: FleetConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_fleet() {
        let yaml = r#"
build_id: b-1
ec2_instance_type: c5.large
name: fleet-A
"#;
        let config: FleetConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.build_id, "b-1");
        assert_eq!(config.name, "fleet-A");
        assert!(config.ec2_inbound_permissions.is_none());
        assert!(config.runtime_configuration.is_none());
    }

    #[test]
    fn test_parse_nested_blocks() {
        let yaml = r#"
build_id: b-1
ec2_instance_type: c5.large
name: fleet-A
ec2_inbound_permissions:
  - from_port: 7777
    to_port: 7780
    ip_range: 0.0.0.0/0
    protocol: UDP
runtime_configuration:
  server_processes:
    - launch_path: /local/game/server
      parameters: "-port 7777"
"#;
        let config: FleetConfig = serde_yaml::from_str(yaml).unwrap();
        let perms = config.ec2_inbound_permissions.unwrap();
        assert_eq!(perms.len(), 1);
        assert_eq!(perms[0].from_port, 7777);

        let runtime = config.runtime_configuration.unwrap();
        assert_eq!(runtime.server_processes[0].concurrent_executions, 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "name: fleet-A\nroute: nowhere\n";
        assert!(serde_yaml::from_str::<FleetConfig>(yaml).is_err());
    }

    #[test]
    fn test_state_serializes_flat() {
        let state = FleetState {
            fleet_id: "fleet-123".to_string(),
            fleet_arn: None,
            operating_system: Some("AMAZON_LINUX".to_string()),
            status: FleetStatus::Active,
            config: FleetConfig {
                name: "fleet-A".to_string(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["fleet_id"], "fleet-123");
        assert_eq!(value["status"], "ACTIVE");
        assert_eq!(value["name"], "fleet-A");
        assert!(value.get("fleet_arn").is_none());
        assert!(value.get("description").is_none());
    }
}
