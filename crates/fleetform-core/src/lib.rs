//! FleetForm Core
//!
//! Reconciliation primitives shared by every FleetForm resource type.
//! A resource type plugs in a [`Translator`] (pure field mapping) and a
//! [`RemoteClient`] (the four remote verbs); the [`Reconciler`] drives them
//! through the create / read / update / delete lifecycle and keeps the
//! managed entity id in the local [`ResourceState`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              fleetform CLI (caller)             │
//! │      create / read / update / delete / apply    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                fleetform-core                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │              Reconciler                  │   │
//! │  └───────┬──────────────┬───────────┬───────┘   │
//! │  ┌───────▼──────┐ ┌─────▼──────┐ ┌──▼────────┐  │
//! │  │  Translator  │ │   Poller   │ │ State Mgmt│  │
//! │  └──────────────┘ └─────┬──────┘ └───────────┘  │
//! └─────────────────────────┼───────────────────────┘
//!                           │ trait RemoteClient
//!                   ┌───────▼───────┐
//!                   │   gamelift    │
//!                   │    client     │
//!                   └───────────────┘
//! ```

pub mod client;
pub mod error;
pub mod poller;
pub mod reconciler;
pub mod state;
pub mod translator;

// Re-exports
pub use client::{RemoteClient, RemoteEntity, RemoteError, RemoteErrorKind, RemoteResult, single};
pub use error::{CloudError, Result};
pub use poller::{Convergence, PollConfig, StatusPoller, Step};
pub use reconciler::{Applied, ReconcileConfig, Reconciler};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
pub use translator::Translator;
pub use tokio_util::sync::CancellationToken;
