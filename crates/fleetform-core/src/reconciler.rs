//! Resource reconciler
//!
//! Orchestrates a [`Translator`], a [`RemoteClient`] and a [`StatusPoller`]
//! into the four lifecycle verbs. The managed entity id lives in the
//! caller's [`ResourceState`]; the reconciler is the only code that sets or
//! clears it.

use crate::client::{RemoteClient, RemoteEntity, single};
use crate::error::{CloudError, Result};
use crate::poller::{Convergence, PollConfig, StatusPoller, Step};
use crate::state::{ResourceState, ResourceStatus};
use crate::translator::Translator;
use tokio_util::sync::CancellationToken;

type StatusOf<T> = <<T as Translator>::Response as RemoteEntity>::Status;

/// Timing configuration for the lifecycle verbs
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Convergence wait after create
    pub create: PollConfig,
}

/// Which verb [`Reconciler::apply`] ran
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<O> {
    Created(O),
    Updated(O),
}

impl<O> Applied<O> {
    pub fn observed(&self) -> &O {
        match self {
            Applied::Created(o) | Applied::Updated(o) => o,
        }
    }
}

/// Drives one resource type through create / read / update / delete.
///
/// Each call runs to completion before the next; callers serialize
/// operations on the same record.
pub struct Reconciler<T, C>
where
    T: Translator,
    C: RemoteClient<
            CreateRequest = T::CreateRequest,
            UpdateRequest = T::UpdateRequest,
            Response = T::Response,
        >,
{
    translator: T,
    client: C,
    poller: StatusPoller<StatusOf<T>>,
}

impl<T, C> Reconciler<T, C>
where
    T: Translator,
    C: RemoteClient<
            CreateRequest = T::CreateRequest,
            UpdateRequest = T::UpdateRequest,
            Response = T::Response,
        >,
{
    /// `convergence` holds the statuses a freshly created entity passes
    /// through (pending) and the ones that mean it is ready (target).
    pub fn new(
        translator: T,
        client: C,
        convergence: Convergence<StatusOf<T>>,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            translator,
            client,
            poller: StatusPoller::new(convergence, config.create),
        }
    }

    /// Abort convergence waits when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(cancel);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create the entity and wait for it to converge.
    ///
    /// Refuses to run when `record` already carries an id; use
    /// [`Reconciler::replace`] to swap out an existing entity. If the
    /// create call succeeds but convergence fails, the id stays recorded.
    pub async fn create(
        &self,
        record: &mut ResourceState,
        desired: &T::Desired,
    ) -> Result<T::Observed> {
        if record.has_id() {
            return Err(CloudError::InvariantViolation(format!(
                "{} is already managed as {}; replace it explicitly",
                record.resource_type, record.id
            )));
        }
        self.translator.validate(desired)?;
        let request = self.translator.to_create_request(desired);

        record.transition(ResourceStatus::Creating);
        tracing::info!("Creating {}", record.resource_type);

        let created = match self.client.create(&request).await {
            Ok(created) => created,
            Err(e) => {
                record.transition(ResourceStatus::Failed);
                return Err(e.into());
            }
        };

        let id = created.entity_id().to_string();
        if id.is_empty() {
            record.transition(ResourceStatus::Failed);
            return Err(CloudError::InvariantViolation(format!(
                "remote system accepted the {} without assigning an id",
                record.resource_type
            )));
        }
        record.record_id(&id);
        if let Err(e) = self.observe(record, &created) {
            record.transition(ResourceStatus::Failed);
            return Err(e);
        }

        tracing::info!(
            "Created {} {} ({}), waiting for convergence",
            record.resource_type,
            id,
            created.status()
        );

        if let Err(e) = self.poller.wait_for(&id, || self.client.fetch(&id)).await {
            record.transition(ResourceStatus::Failed);
            return Err(e);
        }

        match self.read(record).await {
            Ok(Some(observed)) => Ok(observed),
            Ok(None) => Err(CloudError::ResourceNotFound(id)),
            Err(e) => {
                record.transition(ResourceStatus::Failed);
                Err(e)
            }
        }
    }

    /// Refresh the record from the remote system.
    ///
    /// Returns `Ok(None)` when the entity no longer exists; the record's
    /// id is cleared in that case and the caller should forget it.
    pub async fn read(&self, record: &mut ResourceState) -> Result<Option<T::Observed>> {
        if !record.has_id() {
            return Ok(None);
        }

        let id = record.id.clone();
        tracing::info!("Describing {} {}", record.resource_type, id);

        let fetched = match self.client.fetch(&id).await {
            Ok(entities) => single(&id, entities)?,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let Some(entity) = fetched else {
            tracing::warn!(
                "{} ({}) not found, removing from state",
                record.resource_type,
                id
            );
            record.clear();
            return Ok(None);
        };

        let observed = self.observe(record, &entity)?;
        record.transition(self.phase_of(&entity));
        Ok(Some(observed))
    }

    /// Submit the full desired state. Does not wait for convergence.
    pub async fn update(
        &self,
        record: &mut ResourceState,
        desired: &T::Desired,
    ) -> Result<T::Observed> {
        if !record.has_id() {
            return Err(CloudError::InvariantViolation(format!(
                "cannot update {}: no remote id recorded",
                record.resource_type
            )));
        }
        self.translator.validate(desired)?;
        let request = self.translator.to_update_request(desired);

        let id = record.id.clone();
        record.transition(ResourceStatus::Updating);
        tracing::info!("Updating {} {}", record.resource_type, id);

        let updated = match self.client.update(&id, &request).await {
            Ok(entities) => single(&id, entities).and_then(|entity| {
                entity.ok_or_else(|| CloudError::ResourceNotFound(id.clone()))
            }),
            Err(e) => Err(e.into()),
        };
        match updated.and_then(|entity| self.observe(record, &entity)) {
            Ok(observed) => {
                record.transition(ResourceStatus::Active);
                Ok(observed)
            }
            Err(e) => {
                record.transition(ResourceStatus::Failed);
                Err(e)
            }
        }
    }

    /// Delete the entity. An entity that is already gone counts as deleted.
    pub async fn delete(&self, record: &mut ResourceState) -> Result<()> {
        if !record.has_id() {
            tracing::debug!("{} has no remote id, nothing to delete", record.resource_type);
            return Ok(());
        }

        let id = record.id.clone();
        record.transition(ResourceStatus::Deleting);
        tracing::info!("Deleting {} {}", record.resource_type, id);

        match self.client.delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} was already gone", record.resource_type, id);
            }
            Err(e) => {
                record.transition(ResourceStatus::Failed);
                return Err(e.into());
            }
        }

        record.clear();
        Ok(())
    }

    /// Delete the recorded entity, then create a new one from `desired`.
    pub async fn replace(
        &self,
        record: &mut ResourceState,
        desired: &T::Desired,
    ) -> Result<T::Observed> {
        self.translator.validate(desired)?;
        self.delete(record).await?;
        self.create(record, desired).await
    }

    /// Create the entity when it does not exist, update it otherwise.
    pub async fn apply(
        &self,
        record: &mut ResourceState,
        desired: &T::Desired,
    ) -> Result<Applied<T::Observed>> {
        self.translator.validate(desired)?;
        match self.read(record).await? {
            None => Ok(Applied::Created(self.create(record, desired).await?)),
            Some(_) => Ok(Applied::Updated(self.update(record, desired).await?)),
        }
    }

    fn observe(&self, record: &mut ResourceState, response: &T::Response) -> Result<T::Observed> {
        let observed = self.translator.to_local_state(response);
        let attributes = match serde_json::to_value(&observed)? {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(CloudError::StateError(format!(
                    "observed state must serialize to an object, got {}",
                    other
                )));
            }
        };
        record.observe(response.status().to_string(), attributes);
        Ok(observed)
    }

    fn phase_of(&self, entity: &T::Response) -> ResourceStatus {
        match self.poller.convergence().classify(&entity.status()) {
            Step::Done => ResourceStatus::Active,
            Step::Wait => ResourceStatus::Creating,
            Step::Fail => ResourceStatus::Failed,
        }
    }
}
