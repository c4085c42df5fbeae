//! GameLift fleet client over the AWS SDK

use crate::api::{
    CreateFleetRequest, FleetAttributes, IpPermission, IpProtocol, ResourceCreationLimitPolicy,
    RuntimeConfiguration, ServerProcess, UpdateFleetRequest,
};
use crate::error::{classify, malformed};
use crate::status::FleetStatus;
use async_trait::async_trait;
use aws_sdk_gamelift::Client;
use aws_sdk_gamelift::types as sdk;
use fleetform_core::{RemoteClient, RemoteError, RemoteErrorKind, RemoteResult};

/// [`RemoteClient`] for GameLift fleets
#[derive(Debug, Clone)]
pub struct GameLiftClient {
    client: Client,
}

impl GameLiftClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS credential chain.
    pub async fn from_env(region: Option<String>, profile: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }

    /// Fill in port settings and runtime configuration, which
    /// DescribeFleetAttributes does not report.
    async fn enrich(&self, fleet: &mut FleetAttributes) -> RemoteResult<()> {
        let ports = self
            .client
            .describe_fleet_port_settings()
            .fleet_id(&fleet.fleet_id)
            .send()
            .await
            .map_err(classify)?;
        fleet.inbound_permissions = Some(
            ports
                .inbound_permissions()
                .iter()
                .map(from_sdk_permission)
                .collect(),
        );

        let runtime = self
            .client
            .describe_runtime_configuration()
            .fleet_id(&fleet.fleet_id)
            .send()
            .await
            .map_err(classify)?;
        fleet.runtime_configuration = runtime.runtime_configuration().map(from_sdk_runtime);
        Ok(())
    }
}

#[async_trait]
impl RemoteClient for GameLiftClient {
    type CreateRequest = CreateFleetRequest;
    type UpdateRequest = UpdateFleetRequest;
    type Response = FleetAttributes;

    async fn create(&self, request: &CreateFleetRequest) -> RemoteResult<FleetAttributes> {
        let permissions = request
            .ec2_inbound_permissions
            .as_deref()
            .map(to_sdk_permissions)
            .transpose()?;
        let runtime = request
            .runtime_configuration
            .as_ref()
            .map(to_sdk_runtime)
            .transpose()?;

        tracing::debug!("CreateFleet name={}", request.name);
        let output = self
            .client
            .create_fleet()
            .name(&request.name)
            .build_id(&request.build_id)
            .ec2_instance_type(sdk::Ec2InstanceType::from(
                request.ec2_instance_type.as_str(),
            ))
            .set_description(request.description.clone())
            .set_ec2_inbound_permissions(permissions)
            .set_log_paths(request.log_paths.clone())
            .set_metric_groups(request.metric_groups.clone())
            .set_new_game_session_protection_policy(
                request
                    .new_game_session_protection_policy
                    .as_deref()
                    .map(sdk::ProtectionPolicy::from),
            )
            .set_peer_vpc_aws_account_id(request.peer_vpc_aws_account_id.clone())
            .set_peer_vpc_id(request.peer_vpc_id.clone())
            .set_resource_creation_limit_policy(
                request
                    .resource_creation_limit_policy
                    .as_ref()
                    .map(to_sdk_limit_policy),
            )
            .set_runtime_configuration(runtime)
            .set_server_launch_parameters(request.server_launch_parameters.clone())
            .set_server_launch_path(request.server_launch_path.clone())
            .send()
            .await
            .map_err(classify)?;

        output
            .fleet_attributes()
            .map(from_sdk_attributes)
            .ok_or_else(|| {
                RemoteError::new(
                    RemoteErrorKind::Unknown,
                    "CreateFleet returned no fleet attributes",
                )
            })
    }

    async fn fetch(&self, id: &str) -> RemoteResult<Vec<FleetAttributes>> {
        tracing::debug!("DescribeFleetAttributes {}", id);
        let output = self
            .client
            .describe_fleet_attributes()
            .fleet_ids(id)
            .send()
            .await
            .map_err(classify)?;

        let mut fleets: Vec<FleetAttributes> = output
            .fleet_attributes()
            .iter()
            .map(from_sdk_attributes)
            .collect();
        if let [fleet] = fleets.as_mut_slice() {
            self.enrich(fleet).await?;
        }
        Ok(fleets)
    }

    async fn update(
        &self,
        id: &str,
        request: &UpdateFleetRequest,
    ) -> RemoteResult<Vec<FleetAttributes>> {
        tracing::debug!("UpdateFleetAttributes {}", id);
        self.client
            .update_fleet_attributes()
            .fleet_id(id)
            .name(&request.name)
            .set_description(request.description.clone())
            .set_metric_groups(request.metric_groups.clone())
            .set_new_game_session_protection_policy(
                request
                    .new_game_session_protection_policy
                    .as_deref()
                    .map(sdk::ProtectionPolicy::from),
            )
            .set_resource_creation_limit_policy(
                request
                    .resource_creation_limit_policy
                    .as_ref()
                    .map(to_sdk_limit_policy),
            )
            .send()
            .await
            .map_err(classify)?;

        if let Some(runtime) = &request.runtime_configuration {
            tracing::debug!("UpdateRuntimeConfiguration {}", id);
            self.client
                .update_runtime_configuration()
                .fleet_id(id)
                .runtime_configuration(to_sdk_runtime(runtime)?)
                .send()
                .await
                .map_err(classify)?;
        }

        self.fetch(id).await
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        tracing::debug!("DeleteFleet {}", id);
        self.client
            .delete_fleet()
            .fleet_id(id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

fn to_sdk_permissions(perms: &[IpPermission]) -> RemoteResult<Vec<sdk::IpPermission>> {
    perms
        .iter()
        .map(|p| {
            sdk::IpPermission::builder()
                .from_port(p.from_port)
                .to_port(p.to_port)
                .ip_range(&p.ip_range)
                .protocol(sdk::IpProtocol::from(p.protocol.as_str()))
                .build()
                .map_err(malformed)
        })
        .collect()
}

fn to_sdk_limit_policy(policy: &ResourceCreationLimitPolicy) -> sdk::ResourceCreationLimitPolicy {
    sdk::ResourceCreationLimitPolicy::builder()
        .set_new_game_sessions_per_creator(policy.new_game_sessions_per_creator)
        .set_policy_period_in_minutes(policy.policy_period_in_minutes)
        .build()
}

fn to_sdk_runtime(runtime: &RuntimeConfiguration) -> RemoteResult<sdk::RuntimeConfiguration> {
    let processes = runtime
        .server_processes
        .iter()
        .map(|p| {
            sdk::ServerProcess::builder()
                .launch_path(&p.launch_path)
                .set_parameters(p.parameters.clone())
                .concurrent_executions(p.concurrent_executions)
                .build()
                .map_err(malformed)
        })
        .collect::<RemoteResult<Vec<_>>>()?;

    Ok(sdk::RuntimeConfiguration::builder()
        .set_server_processes(Some(processes))
        .set_max_concurrent_game_session_activations(
            runtime.max_concurrent_game_session_activations,
        )
        .set_game_session_activation_timeout_seconds(
            runtime.game_session_activation_timeout_seconds,
        )
        .build())
}

fn from_sdk_permission(perm: &sdk::IpPermission) -> IpPermission {
    IpPermission {
        from_port: perm.from_port(),
        to_port: perm.to_port(),
        ip_range: perm.ip_range().to_string(),
        protocol: IpProtocol::parse(perm.protocol().as_str()).unwrap_or(IpProtocol::Tcp),
    }
}

fn from_sdk_runtime(runtime: &sdk::RuntimeConfiguration) -> RuntimeConfiguration {
    RuntimeConfiguration {
        server_processes: runtime
            .server_processes()
            .iter()
            .map(|p| ServerProcess {
                launch_path: p.launch_path().to_string(),
                parameters: p.parameters().map(str::to_string),
                concurrent_executions: p.concurrent_executions(),
            })
            .collect(),
        max_concurrent_game_session_activations: runtime.max_concurrent_game_session_activations(),
        game_session_activation_timeout_seconds: runtime.game_session_activation_timeout_seconds(),
    }
}

/// Empty lists in a response mean "not set".
fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

fn from_sdk_attributes(attrs: &sdk::FleetAttributes) -> FleetAttributes {
    let status = attrs
        .status()
        .map_or(FleetStatus::Unknown(String::new()), |s| {
            FleetStatus::from(s.as_str())
        });

    FleetAttributes {
        fleet_arn: attrs.fleet_arn().map(str::to_string),
        name: attrs.name().map(str::to_string),
        build_id: attrs.build_id().map(str::to_string),
        instance_type: attrs.instance_type().map(|t| t.as_str().to_string()),
        description: attrs.description().map(str::to_string),
        log_paths: non_empty(attrs.log_paths()),
        metric_groups: non_empty(attrs.metric_groups()),
        new_game_session_protection_policy: attrs
            .new_game_session_protection_policy()
            .map(|p| p.as_str().to_string()),
        operating_system: attrs.operating_system().map(|o| o.as_str().to_string()),
        resource_creation_limit_policy: attrs.resource_creation_limit_policy().map(|p| {
            ResourceCreationLimitPolicy {
                new_game_sessions_per_creator: p.new_game_sessions_per_creator(),
                policy_period_in_minutes: p.policy_period_in_minutes(),
            }
        }),
        server_launch_parameters: attrs.server_launch_parameters().map(str::to_string),
        server_launch_path: attrs.server_launch_path().map(str::to_string),
        ..FleetAttributes::new(attrs.fleet_id().unwrap_or_default(), status)
    }
}
