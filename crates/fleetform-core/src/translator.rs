//! Field translator trait definition

use crate::client::RemoteEntity;
use crate::error::Result;
use serde::Serialize;

/// Bidirectional mapping between a resource's declarative configuration
/// and its remote request/response shapes.
///
/// All methods are pure. Optional attributes the operator did not set must
/// not appear in the produced requests.
pub trait Translator: Send + Sync {
    /// Operator-supplied configuration.
    type Desired: Send + Sync;
    type CreateRequest: Send + Sync;
    type UpdateRequest: Send + Sync;
    type Response: RemoteEntity;
    /// Local view of the remote entity, stored as the record's attributes.
    type Observed: Serialize + Send + Sync;

    /// Reject malformed configuration before anything is sent.
    fn validate(&self, _desired: &Self::Desired) -> Result<()> {
        Ok(())
    }

    fn to_create_request(&self, desired: &Self::Desired) -> Self::CreateRequest;

    /// Full (never delta) update request.
    fn to_update_request(&self, desired: &Self::Desired) -> Self::UpdateRequest;

    /// Total mapping of every remote field, output-only ones included.
    fn to_local_state(&self, response: &Self::Response) -> Self::Observed;
}
