//! Field tables between [`FleetConfig`] and the GameLift API shapes

use crate::api::{self, CreateFleetRequest, FleetAttributes, IpProtocol, UpdateFleetRequest};
use crate::model::{
    FleetConfig, FleetState, IpPermission, ResourceCreationLimitPolicy, RuntimeConfiguration,
    ServerProcess,
};
use fleetform_core::{CloudError, Result, Translator};
use std::net::IpAddr;

const MAX_PORT: u16 = 60000;
const MAX_SERVER_PROCESSES: usize = 50;
const PROTECTION_POLICIES: [&str; 2] = ["NoProtection", "FullProtection"];

/// Translator for the `gamelift_fleet` resource type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetTranslator;

impl Translator for FleetTranslator {
    type Desired = FleetConfig;
    type CreateRequest = CreateFleetRequest;
    type UpdateRequest = UpdateFleetRequest;
    type Response = FleetAttributes;
    type Observed = FleetState;

    fn validate(&self, desired: &FleetConfig) -> Result<()> {
        let problems = check_fleet(desired);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CloudError::InvalidConfig(problems.join("; ")))
        }
    }

    fn to_create_request(&self, desired: &FleetConfig) -> CreateFleetRequest {
        CreateFleetRequest {
            name: desired.name.clone(),
            build_id: desired.build_id.clone(),
            ec2_instance_type: desired.ec2_instance_type.clone(),
            description: desired.description.clone(),
            ec2_inbound_permissions: desired
                .ec2_inbound_permissions
                .as_ref()
                .map(|perms| perms.iter().map(expand_permission).collect()),
            log_paths: desired.log_paths.clone(),
            metric_groups: desired.metric_groups.clone(),
            new_game_session_protection_policy: desired.new_game_session_protection_policy.clone(),
            peer_vpc_aws_account_id: desired.peer_vpc_aws_account_id.clone(),
            peer_vpc_id: desired.peer_vpc_id.clone(),
            resource_creation_limit_policy: desired
                .resource_creation_limit_policy
                .as_ref()
                .map(expand_limit_policy),
            runtime_configuration: desired.runtime_configuration.as_ref().map(expand_runtime),
            server_launch_parameters: desired.server_launch_parameters.clone(),
            server_launch_path: desired.server_launch_path.clone(),
        }
    }

    fn to_update_request(&self, desired: &FleetConfig) -> UpdateFleetRequest {
        UpdateFleetRequest {
            name: desired.name.clone(),
            description: desired.description.clone(),
            metric_groups: desired.metric_groups.clone(),
            new_game_session_protection_policy: desired.new_game_session_protection_policy.clone(),
            resource_creation_limit_policy: desired
                .resource_creation_limit_policy
                .as_ref()
                .map(expand_limit_policy),
            runtime_configuration: desired.runtime_configuration.as_ref().map(expand_runtime),
        }
    }

    fn to_local_state(&self, response: &FleetAttributes) -> FleetState {
        FleetState {
            fleet_id: response.fleet_id.clone(),
            fleet_arn: response.fleet_arn.clone(),
            operating_system: response.operating_system.clone(),
            status: response.status.clone(),
            config: FleetConfig {
                build_id: response.build_id.clone().unwrap_or_default(),
                ec2_instance_type: response.instance_type.clone().unwrap_or_default(),
                name: response.name.clone().unwrap_or_default(),
                description: response.description.clone(),
                ec2_inbound_permissions: response
                    .inbound_permissions
                    .as_ref()
                    .map(|perms| perms.iter().map(flatten_permission).collect()),
                log_paths: response.log_paths.clone(),
                metric_groups: response.metric_groups.clone(),
                new_game_session_protection_policy: response
                    .new_game_session_protection_policy
                    .clone(),
                peer_vpc_aws_account_id: response.peer_vpc_aws_account_id.clone(),
                peer_vpc_id: response.peer_vpc_id.clone(),
                resource_creation_limit_policy: response
                    .resource_creation_limit_policy
                    .as_ref()
                    .map(flatten_limit_policy),
                runtime_configuration: response
                    .runtime_configuration
                    .as_ref()
                    .map(flatten_runtime),
                server_launch_parameters: response.server_launch_parameters.clone(),
                server_launch_path: response.server_launch_path.clone(),
            },
        }
    }
}

fn expand_permission(perm: &IpPermission) -> api::IpPermission {
    api::IpPermission {
        from_port: i32::from(perm.from_port),
        to_port: i32::from(perm.to_port),
        ip_range: perm.ip_range.clone(),
        // validated beforehand; TCP is the remote default
        protocol: IpProtocol::parse(&perm.protocol).unwrap_or(IpProtocol::Tcp),
    }
}

fn flatten_permission(perm: &api::IpPermission) -> IpPermission {
    IpPermission {
        from_port: clamp_port(perm.from_port),
        to_port: clamp_port(perm.to_port),
        ip_range: perm.ip_range.clone(),
        protocol: perm.protocol.as_str().to_string(),
    }
}

fn clamp_port(port: i32) -> u16 {
    u16::try_from(port.max(0)).unwrap_or(u16::MAX)
}

fn expand_limit_policy(policy: &ResourceCreationLimitPolicy) -> api::ResourceCreationLimitPolicy {
    api::ResourceCreationLimitPolicy {
        new_game_sessions_per_creator: policy.new_game_sessions_per_creator,
        policy_period_in_minutes: policy.policy_period_in_minutes,
    }
}

fn flatten_limit_policy(policy: &api::ResourceCreationLimitPolicy) -> ResourceCreationLimitPolicy {
    ResourceCreationLimitPolicy {
        new_game_sessions_per_creator: policy.new_game_sessions_per_creator,
        policy_period_in_minutes: policy.policy_period_in_minutes,
    }
}

fn expand_runtime(runtime: &RuntimeConfiguration) -> api::RuntimeConfiguration {
    api::RuntimeConfiguration {
        server_processes: runtime
            .server_processes
            .iter()
            .map(|p| api::ServerProcess {
                launch_path: p.launch_path.clone(),
                parameters: p.parameters.clone(),
                concurrent_executions: p.concurrent_executions,
            })
            .collect(),
        max_concurrent_game_session_activations: runtime.max_concurrent_game_session_activations,
        game_session_activation_timeout_seconds: runtime.game_session_activation_timeout_seconds,
    }
}

fn flatten_runtime(runtime: &api::RuntimeConfiguration) -> RuntimeConfiguration {
    RuntimeConfiguration {
        server_processes: runtime
            .server_processes
            .iter()
            .map(|p| ServerProcess {
                launch_path: p.launch_path.clone(),
                parameters: p.parameters.clone(),
                concurrent_executions: p.concurrent_executions,
            })
            .collect(),
        max_concurrent_game_session_activations: runtime.max_concurrent_game_session_activations,
        game_session_activation_timeout_seconds: runtime.game_session_activation_timeout_seconds,
    }
}

/// Collect every problem with `config` rather than stopping at the first.
fn check_fleet(config: &FleetConfig) -> Vec<String> {
    let mut problems = Vec::new();

    for (field, value) in [
        ("build_id", &config.build_id),
        ("ec2_instance_type", &config.ec2_instance_type),
        ("name", &config.name),
    ] {
        if value.trim().is_empty() {
            problems.push(format!("{} is required", field));
        }
    }

    if let Some(perms) = &config.ec2_inbound_permissions {
        for (i, perm) in perms.iter().enumerate() {
            check_permission(i, perm, &mut problems);
        }
    }

    if let Some(policy) = &config.new_game_session_protection_policy
        && !PROTECTION_POLICIES.contains(&policy.as_str())
    {
        problems.push(format!(
            "new_game_session_protection_policy must be one of {}, got '{}'",
            PROTECTION_POLICIES.join(", "),
            policy
        ));
    }

    if let Some(policy) = &config.resource_creation_limit_policy {
        for (field, value) in [
            (
                "new_game_sessions_per_creator",
                policy.new_game_sessions_per_creator,
            ),
            ("policy_period_in_minutes", policy.policy_period_in_minutes),
        ] {
            if value.is_some_and(|v| v < 0) {
                problems.push(format!(
                    "resource_creation_limit_policy.{} must not be negative",
                    field
                ));
            }
        }
    }

    if let Some(runtime) = &config.runtime_configuration {
        check_runtime(runtime, &mut problems);
    }

    problems
}

fn check_permission(index: usize, perm: &IpPermission, problems: &mut Vec<String>) {
    let at = format!("ec2_inbound_permissions[{}]", index);
    for (field, port) in [("from_port", perm.from_port), ("to_port", perm.to_port)] {
        if !(1..=MAX_PORT).contains(&port) {
            problems.push(format!(
                "{}.{} must be within 1..={}, got {}",
                at, field, MAX_PORT, port
            ));
        }
    }
    if perm.from_port > perm.to_port {
        problems.push(format!(
            "{}: from_port {} is greater than to_port {}",
            at, perm.from_port, perm.to_port
        ));
    }
    if IpProtocol::parse(&perm.protocol).is_none() {
        problems.push(format!(
            "{}.protocol must be TCP or UDP, got '{}'",
            at, perm.protocol
        ));
    }
    if !is_cidr(&perm.ip_range) {
        problems.push(format!(
            "{}.ip_range must be a CIDR block, got '{}'",
            at, perm.ip_range
        ));
    }
}

fn check_runtime(runtime: &RuntimeConfiguration, problems: &mut Vec<String>) {
    let count = runtime.server_processes.len();
    if count == 0 || count > MAX_SERVER_PROCESSES {
        problems.push(format!(
            "runtime_configuration needs 1..={} server_processes, got {}",
            MAX_SERVER_PROCESSES, count
        ));
    }
    for (i, process) in runtime.server_processes.iter().enumerate() {
        if process.launch_path.trim().is_empty() {
            problems.push(format!(
                "runtime_configuration.server_processes[{}].launch_path is required",
                i
            ));
        }
        if process.concurrent_executions < 1 {
            problems.push(format!(
                "runtime_configuration.server_processes[{}].concurrent_executions must be at least 1",
                i
            ));
        }
    }
    for (field, value) in [
        (
            "max_concurrent_game_session_activations",
            runtime.max_concurrent_game_session_activations,
        ),
        (
            "game_session_activation_timeout_seconds",
            runtime.game_session_activation_timeout_seconds,
        ),
    ] {
        if value.is_some_and(|v| v < 1) {
            problems.push(format!("runtime_configuration.{} must be positive", field));
        }
    }
}

fn is_cidr(range: &str) -> bool {
    let Some((addr, prefix)) = range.split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    let max = if addr.is_ipv4() { 32 } else { 128 };
    prefix.parse::<u8>().is_ok_and(|p| p <= max)
}

/// Response the service would echo for `request`, used to exercise the
/// translator without a remote.
#[cfg(test)]
pub(crate) fn echo(request: &CreateFleetRequest, fleet_id: &str) -> FleetAttributes {
    FleetAttributes {
        fleet_arn: Some(format!("arn:aws:gamelift:us-east-1::fleet/{}", fleet_id)),
        name: Some(request.name.clone()),
        build_id: Some(request.build_id.clone()),
        instance_type: Some(request.ec2_instance_type.clone()),
        description: request.description.clone(),
        log_paths: request.log_paths.clone(),
        metric_groups: request.metric_groups.clone(),
        new_game_session_protection_policy: request.new_game_session_protection_policy.clone(),
        operating_system: Some("AMAZON_LINUX".to_string()),
        peer_vpc_aws_account_id: request.peer_vpc_aws_account_id.clone(),
        peer_vpc_id: request.peer_vpc_id.clone(),
        resource_creation_limit_policy: request.resource_creation_limit_policy.clone(),
        runtime_configuration: request.runtime_configuration.clone(),
        inbound_permissions: request.ec2_inbound_permissions.clone(),
        server_launch_parameters: request.server_launch_parameters.clone(),
        server_launch_path: request.server_launch_path.clone(),
        ..FleetAttributes::new(fleet_id, crate::status::FleetStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::FleetStatus;

    fn minimal() -> FleetConfig {
        FleetConfig {
            build_id: "b-1".to_string(),
            ec2_instance_type: "c5.large".to_string(),
            name: "fleet-A".to_string(),
            ..Default::default()
        }
    }

    fn full() -> FleetConfig {
        FleetConfig {
            description: Some("ranked matches".to_string()),
            ec2_inbound_permissions: Some(vec![IpPermission {
                from_port: 7777,
                to_port: 7780,
                ip_range: "10.0.0.0/16".to_string(),
                protocol: "UDP".to_string(),
            }]),
            log_paths: Some(vec!["/local/game/logs".to_string()]),
            metric_groups: Some(vec!["ranked".to_string()]),
            new_game_session_protection_policy: Some("FullProtection".to_string()),
            resource_creation_limit_policy: Some(ResourceCreationLimitPolicy {
                new_game_sessions_per_creator: Some(3),
                policy_period_in_minutes: Some(15),
            }),
            runtime_configuration: Some(RuntimeConfiguration {
                server_processes: vec![ServerProcess {
                    launch_path: "/local/game/server".to_string(),
                    parameters: Some("-port 7777".to_string()),
                    concurrent_executions: 2,
                }],
                max_concurrent_game_session_activations: Some(4),
                game_session_activation_timeout_seconds: Some(300),
            }),
            server_launch_path: Some("/local/game/server".to_string()),
            ..minimal()
        }
    }

    #[test]
    fn test_minimal_request_omits_optionals() {
        let request = FleetTranslator.to_create_request(&minimal());
        assert_eq!(request.name, "fleet-A");
        assert_eq!(request.build_id, "b-1");
        assert_eq!(request.ec2_instance_type, "c5.large");
        assert!(request.description.is_none());
        assert!(request.ec2_inbound_permissions.is_none());
        assert!(request.resource_creation_limit_policy.is_none());
        assert!(request.runtime_configuration.is_none());
    }

    #[test]
    fn test_empty_permission_list_stays_empty() {
        let config = FleetConfig {
            ec2_inbound_permissions: Some(vec![]),
            ..minimal()
        };
        let request = FleetTranslator.to_create_request(&config);
        assert_eq!(request.ec2_inbound_permissions, Some(vec![]));
    }

    #[test]
    fn test_protocol_is_normalized() {
        let config = FleetConfig {
            ec2_inbound_permissions: Some(vec![IpPermission {
                from_port: 1,
                to_port: 2,
                ip_range: "0.0.0.0/0".to_string(),
                protocol: "tcp".to_string(),
            }]),
            ..minimal()
        };
        let request = FleetTranslator.to_create_request(&config);
        let perms = request.ec2_inbound_permissions.unwrap();
        assert_eq!(perms[0].protocol, IpProtocol::Tcp);

        let state = FleetTranslator.to_local_state(&echo(
            &FleetTranslator.to_create_request(&config),
            "fleet-1",
        ));
        let echoed = state.config.ec2_inbound_permissions.unwrap();
        assert_eq!(echoed[0].protocol, "TCP");
    }

    #[test]
    fn test_round_trip_preserves_config() {
        for config in [minimal(), full()] {
            let request = FleetTranslator.to_create_request(&config);
            let state = FleetTranslator.to_local_state(&echo(&request, "fleet-123"));
            assert_eq!(state.config, config);
            assert_eq!(state.fleet_id, "fleet-123");
            assert_eq!(state.status, FleetStatus::Active);
            assert!(state.fleet_arn.is_some());
        }
    }

    #[test]
    fn test_update_request_carries_full_values() {
        let request = FleetTranslator.to_update_request(&full());
        assert_eq!(request.name, "fleet-A");
        assert_eq!(request.description.as_deref(), Some("ranked matches"));
        assert_eq!(request.metric_groups, Some(vec!["ranked".to_string()]));
        assert!(request.resource_creation_limit_policy.is_some());
        assert_eq!(
            request.runtime_configuration.unwrap().server_processes.len(),
            1
        );

        let bare = FleetTranslator.to_update_request(&minimal());
        assert!(bare.description.is_none());
        assert!(bare.runtime_configuration.is_none());
    }

    #[test]
    fn test_validate_accepts_good_config() {
        assert!(FleetTranslator.validate(&minimal()).is_ok());
        assert!(FleetTranslator.validate(&full()).is_ok());
    }

    #[test]
    fn test_validate_requires_fields() {
        let err = FleetTranslator
            .validate(&FleetConfig::default())
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
        assert!(msg.contains("build_id is required"));
        assert!(msg.contains("ec2_instance_type is required"));
        assert!(msg.contains("name is required"));
    }

    #[test]
    fn test_validate_permissions() {
        let config = FleetConfig {
            ec2_inbound_permissions: Some(vec![IpPermission {
                from_port: 8000,
                to_port: 61000,
                ip_range: "10.0.0.0".to_string(),
                protocol: "ICMP".to_string(),
            }]),
            ..minimal()
        };
        let msg = FleetTranslator.validate(&config).unwrap_err().to_string();
        assert!(msg.contains("to_port must be within 1..=60000"));
        assert!(msg.contains("protocol must be TCP or UDP"));
        assert!(msg.contains("ip_range must be a CIDR block"));

        let reversed = FleetConfig {
            ec2_inbound_permissions: Some(vec![IpPermission {
                from_port: 9000,
                to_port: 8000,
                ip_range: "10.0.0.0/8".to_string(),
                protocol: "TCP".to_string(),
            }]),
            ..minimal()
        };
        let msg = FleetTranslator.validate(&reversed).unwrap_err().to_string();
        assert!(msg.contains("greater than to_port"));
    }

    #[test]
    fn test_validate_runtime_and_policy() {
        let mut config = full();
        if let Some(runtime) = config.runtime_configuration.as_mut() {
            runtime.server_processes[0].concurrent_executions = 0;
        }
        config.resource_creation_limit_policy = Some(ResourceCreationLimitPolicy {
            new_game_sessions_per_creator: Some(-1),
            policy_period_in_minutes: None,
        });
        let msg = FleetTranslator.validate(&config).unwrap_err().to_string();
        assert!(msg.contains("concurrent_executions must be at least 1"));
        assert!(msg.contains("new_game_sessions_per_creator must not be negative"));

        let empty = FleetConfig {
            runtime_configuration: Some(RuntimeConfiguration::default()),
            ..minimal()
        };
        let msg = FleetTranslator.validate(&empty).unwrap_err().to_string();
        assert!(msg.contains("server_processes, got 0"));
    }

    #[test]
    fn test_is_cidr() {
        assert!(is_cidr("0.0.0.0/0"));
        assert!(is_cidr("192.168.1.0/24"));
        assert!(is_cidr("2001:db8::/32"));
        assert!(!is_cidr("192.168.1.0/33"));
        assert!(!is_cidr("192.168.1.0"));
        assert!(!is_cidr("not-an-ip/8"));
    }
}
