use async_trait::async_trait;
use fleetform_core::{RemoteClient, RemoteError, RemoteResult};
use fleetform_gamelift::{
    CreateFleetRequest, FleetAttributes, FleetConfig, FleetStatus, UpdateFleetRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-memory GameLift. Every fetch moves a fleet one step along its status
/// script; once the script is exhausted the fleet stays where it is.
#[derive(Default)]
pub struct FakeGameLift {
    fleets: Mutex<HashMap<String, FleetAttributes>>,
    scripts: Mutex<HashMap<String, VecDeque<FleetStatus>>>,
    script: Vec<FleetStatus>,
    calls: Mutex<Vec<String>>,
}

impl FakeGameLift {
    /// Fleets report these statuses on successive fetches after CreateFleet.
    pub fn with_script(script: &[&str]) -> Self {
        Self {
            script: script.iter().map(|s| FleetStatus::from(*s)).collect(),
            ..Default::default()
        }
    }

    /// Drop a fleet behind the reconciler's back.
    #[allow(dead_code)]
    pub fn remove(&self, id: &str) {
        self.fleets.lock().unwrap().remove(id);
    }

    #[allow(dead_code)]
    pub fn fleet(&self, id: &str) -> Option<FleetAttributes> {
        self.fleets.lock().unwrap().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteClient for FakeGameLift {
    type CreateRequest = CreateFleetRequest;
    type UpdateRequest = UpdateFleetRequest;
    type Response = FleetAttributes;

    async fn create(&self, request: &CreateFleetRequest) -> RemoteResult<FleetAttributes> {
        let mut fleets = self.fleets.lock().unwrap();
        let id = format!("fleet-{}", 123 + fleets.len());
        self.record(format!("CreateFleet {}", request.name));

        let fleet = FleetAttributes {
            fleet_arn: Some(format!("arn:aws:gamelift:us-east-1::fleet/{}", id)),
            name: Some(request.name.clone()),
            build_id: Some(request.build_id.clone()),
            instance_type: Some(request.ec2_instance_type.clone()),
            description: request.description.clone(),
            log_paths: request.log_paths.clone(),
            metric_groups: request.metric_groups.clone(),
            new_game_session_protection_policy: request
                .new_game_session_protection_policy
                .clone(),
            operating_system: Some("AMAZON_LINUX_2".to_string()),
            peer_vpc_aws_account_id: request.peer_vpc_aws_account_id.clone(),
            peer_vpc_id: request.peer_vpc_id.clone(),
            resource_creation_limit_policy: request.resource_creation_limit_policy.clone(),
            runtime_configuration: request.runtime_configuration.clone(),
            inbound_permissions: request.ec2_inbound_permissions.clone(),
            server_launch_parameters: request.server_launch_parameters.clone(),
            server_launch_path: request.server_launch_path.clone(),
            ..FleetAttributes::new(id.clone(), FleetStatus::New)
        };
        fleets.insert(id.clone(), fleet.clone());
        self.scripts
            .lock()
            .unwrap()
            .insert(id, self.script.iter().cloned().collect());
        Ok(fleet)
    }

    async fn fetch(&self, id: &str) -> RemoteResult<Vec<FleetAttributes>> {
        self.record(format!("DescribeFleetAttributes {}", id));
        let mut fleets = self.fleets.lock().unwrap();
        let Some(fleet) = fleets.get_mut(id) else {
            return Ok(vec![]);
        };
        if let Some(next) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front)
        {
            fleet.status = next;
        }
        Ok(vec![fleet.clone()])
    }

    async fn update(
        &self,
        id: &str,
        request: &UpdateFleetRequest,
    ) -> RemoteResult<Vec<FleetAttributes>> {
        self.record(format!("UpdateFleetAttributes {}", id));
        let mut fleets = self.fleets.lock().unwrap();
        let fleet = fleets
            .get_mut(id)
            .ok_or_else(|| RemoteError::not_found(format!("fleet {} does not exist", id)))?;
        fleet.name = Some(request.name.clone());
        if request.description.is_some() {
            fleet.description = request.description.clone();
        }
        if request.metric_groups.is_some() {
            fleet.metric_groups = request.metric_groups.clone();
        }
        if request.runtime_configuration.is_some() {
            fleet.runtime_configuration = request.runtime_configuration.clone();
        }
        Ok(vec![fleet.clone()])
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.record(format!("DeleteFleet {}", id));
        match self.fleets.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(RemoteError::not_found(format!("fleet {} does not exist", id))),
        }
    }
}

pub fn fleet_a() -> FleetConfig {
    FleetConfig {
        build_id: "b-1".to_string(),
        ec2_instance_type: "c5.large".to_string(),
        name: "fleet-A".to_string(),
        ..Default::default()
    }
}
