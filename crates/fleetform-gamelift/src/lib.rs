//! AWS GameLift fleet resource for FleetForm
//!
//! Provides the `gamelift_fleet` resource type: the declarative
//! [`FleetConfig`], the [`FleetTranslator`] field tables, and a
//! [`GameLiftClient`] that speaks to the service through `aws-sdk-gamelift`.
//!
//! # Example
//!
//! ```ignore
//! use fleetform_core::{ReconcileConfig, ResourceState};
//! use fleetform_gamelift::{FleetConfig, GameLiftClient, fleet_reconciler};
//!
//! let client = GameLiftClient::from_env(Some("us-east-1".into()), None).await;
//! let reconciler = fleet_reconciler(client, ReconcileConfig::default());
//!
//! let mut record = ResourceState::new(fleetform_gamelift::RESOURCE_TYPE);
//! let fleet = reconciler.create(&mut record, &config).await?;
//! println!("{} is {}", fleet.fleet_id, fleet.status);
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod model;
pub mod status;
pub mod translator;

pub use api::{CreateFleetRequest, FleetAttributes, UpdateFleetRequest};
pub use client::GameLiftClient;
pub use model::{
    FleetConfig, FleetState, IpPermission, ResourceCreationLimitPolicy, RuntimeConfiguration,
    ServerProcess,
};
pub use status::{FleetStatus, create_convergence};
pub use translator::FleetTranslator;

use fleetform_core::{ReconcileConfig, Reconciler, RemoteClient};

/// Resource type name used for state records.
pub const RESOURCE_TYPE: &str = "gamelift_fleet";

pub type FleetReconciler<C> = Reconciler<FleetTranslator, C>;

/// Reconciler for fleets managed through `client`.
pub fn fleet_reconciler<C>(client: C, config: ReconcileConfig) -> FleetReconciler<C>
where
    C: RemoteClient<
            CreateRequest = CreateFleetRequest,
            UpdateRequest = UpdateFleetRequest,
            Response = FleetAttributes,
        >,
{
    Reconciler::new(FleetTranslator, client, create_convergence(), config)
}
