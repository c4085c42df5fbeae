//! Remote operation client trait definition

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// An entity as reported by the remote system.
pub trait RemoteEntity: Send + Sync {
    /// Discrete status domain tracked by the poller.
    type Status: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// Identifier assigned by the remote system.
    fn entity_id(&self) -> &str;

    /// Current status of the entity.
    fn status(&self) -> Self::Status;
}

/// Remote operation client abstraction trait
///
/// Implementations wrap a concrete remote API (e.g. AWS GameLift) and expose
/// the four lifecycle verbs. Every call returns either the remote
/// representation or a classified [`RemoteError`]; nothing is retried here.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    type CreateRequest: Send + Sync;
    type UpdateRequest: Send + Sync;
    type Response: RemoteEntity;

    /// Create the entity. Must not be retried blindly: the remote side
    /// offers no idempotency token.
    async fn create(&self, request: &Self::CreateRequest) -> RemoteResult<Self::Response>;

    /// Describe the entities registered under `id`. Side-effect free.
    ///
    /// An empty vector means nothing is visible under the id yet (or any
    /// more); more than one entry violates identifier uniqueness.
    async fn fetch(&self, id: &str) -> RemoteResult<Vec<Self::Response>>;

    /// Submit the full desired attributes and return the entities
    /// reported under `id` afterwards, with the same contract as
    /// [`RemoteClient::fetch`].
    async fn update(
        &self,
        id: &str,
        request: &Self::UpdateRequest,
    ) -> RemoteResult<Vec<Self::Response>>;

    /// Delete the entity.
    async fn delete(&self, id: &str) -> RemoteResult<()>;
}

/// Classification of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Unauthorized,
    NotFound,
    Throttled,
    Conflict,
    TransientNetwork,
    MalformedInput,
    Unknown,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::Unauthorized => write!(f, "unauthorized"),
            RemoteErrorKind::NotFound => write!(f, "not-found"),
            RemoteErrorKind::Throttled => write!(f, "throttled"),
            RemoteErrorKind::Conflict => write!(f, "conflict"),
            RemoteErrorKind::TransientNetwork => write!(f, "transient-network"),
            RemoteErrorKind::MalformedInput => write!(f, "malformed-input"),
            RemoteErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A failed remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// Throttling and network failures; eligible for retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            RemoteErrorKind::Throttled | RemoteErrorKind::TransientNetwork
        )
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Reduce a describe result to the single entity expected under `id`.
pub fn single<T>(id: &str, entities: Vec<T>) -> Result<Option<T>> {
    match entities.len() {
        0 => Ok(None),
        1 => Ok(entities.into_iter().next()),
        n => Err(CloudError::InvariantViolation(format!(
            "expected exactly 1 entity, found {} under {:?}",
            n, id
        ))),
    }
}
