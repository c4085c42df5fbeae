//! State convergence poller
//!
//! Repeatedly describes a remote entity until its status reaches a target
//! value. Waits back off exponentially, are bounded by an overall deadline
//! and race a cancellation token.

use crate::client::{RemoteEntity, RemoteResult, single};
use crate::error::{CloudError, Result};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;

/// Lower bound for any wait between two polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline used when `timeout` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Status reported for an entity that vanished after being visible.
const ABSENT: &str = "<absent>";

/// Outcome of classifying one observed status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Target reached
    Done,
    /// Still converging
    Wait,
    /// Terminal or unrecognized status
    Fail,
}

/// Pending and target status sets for one wait
#[derive(Debug, Clone)]
pub struct Convergence<S> {
    pending: HashSet<S>,
    target: HashSet<S>,
}

impl<S: Eq + Hash + fmt::Display> Convergence<S> {
    pub fn new(
        pending: impl IntoIterator<Item = S>,
        target: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            pending: pending.into_iter().collect(),
            target: target.into_iter().collect(),
        }
    }

    pub fn classify(&self, status: &S) -> Step {
        if self.target.contains(status) {
            Step::Done
        } else if self.pending.contains(status) {
            Step::Wait
        } else {
            Step::Fail
        }
    }

    /// Target set rendered for error messages, e.g. `ACTIVE`.
    pub fn describe_target(&self) -> String {
        let mut names: Vec<String> = self.target.iter().map(|s| s.to_string()).collect();
        names.sort();
        names.join("|")
    }
}

/// Poll timing configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Overall deadline for the wait
    pub timeout: Duration,

    /// Delay after the first poll
    pub initial_interval: Duration,

    /// Maximum delay between polls
    pub max_interval: Duration,

    /// Backoff multiplier
    pub multiplier: f64,

    /// How long an entity may stay invisible after creation
    pub visibility_grace: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            visibility_grace: Duration::from_secs(30),
        }
    }
}

impl PollConfig {
    /// Delay to wait after poll number `attempt` (zero based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(32) as i32);
        let secs = (self.initial_interval.as_secs_f64() * factor)
            .min(self.max_interval.as_secs_f64());
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_interval)
            .max(MIN_POLL_INTERVAL)
    }
}

/// Drives repeated fetches until a status converges
#[derive(Debug, Clone)]
pub struct StatusPoller<S> {
    convergence: Convergence<S>,
    config: PollConfig,
    cancel: CancellationToken,
}

impl<S> StatusPoller<S>
where
    S: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync,
{
    pub fn new(convergence: Convergence<S>, config: PollConfig) -> Self {
        Self {
            convergence,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn convergence(&self) -> &Convergence<S> {
        &self.convergence
    }

    /// Wait until the entity under `id` reports a target status.
    ///
    /// # Returns
    /// * `Ok(entity)` - the first observation with a target status
    /// * `Err(ConvergenceFailed)` - a status outside both sets, or the entity vanished
    /// * `Err(NeverVisible)` - nothing visible under `id` once the grace period elapsed
    /// * `Err(InvariantViolation)` - more than one entity under `id`
    /// * `Err(Timeout)` - deadline passed while still pending
    /// * `Err(Cancelled)` - the cancellation token fired
    pub async fn wait_for<T, F, Fut>(&self, id: &str, mut fetch: F) -> Result<T>
    where
        T: RemoteEntity<Status = S>,
        F: FnMut() -> Fut,
        Fut: Future<Output = RemoteResult<Vec<T>>>,
    {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.config.timeout)
            .unwrap_or(started + FAR_FUTURE);
        let mut attempt: u32 = 0;
        let mut seen = false;
        let mut last_status: Option<S> = None;

        loop {
            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(CloudError::Cancelled(id.to_string()));
                }
                polled = timeout_at(deadline, fetch()) => match polled {
                    Ok(polled) => polled,
                    Err(_) => return Err(self.timed_out(id, last_status.as_ref(), started)),
                },
            };

            match polled {
                Ok(entities) => match single(id, entities)? {
                    Some(entity) => {
                        seen = true;
                        let status = entity.status();
                        match self.convergence.classify(&status) {
                            Step::Done => {
                                tracing::debug!(
                                    "Resource {} reached {} after {} polls",
                                    id,
                                    status,
                                    attempt + 1
                                );
                                return Ok(entity);
                            }
                            Step::Wait => {
                                tracing::debug!("Resource {} is {}, waiting", id, status);
                                last_status = Some(status);
                            }
                            Step::Fail => {
                                return Err(CloudError::ConvergenceFailed {
                                    id: id.to_string(),
                                    status: status.to_string(),
                                    expected: self.convergence.describe_target(),
                                });
                            }
                        }
                    }
                    None => self.not_visible(id, seen, started)?,
                },
                Err(err) if err.is_not_found() => self.not_visible(id, seen, started)?,
                Err(err) if err.is_transient() => {
                    tracing::warn!("Transient error while polling {}: {}", id, err);
                }
                Err(err) => return Err(err.into()),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(id, last_status.as_ref(), started));
            }

            let delay = self.config.delay_for_attempt(attempt).min(deadline - now);
            attempt += 1;

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(CloudError::Cancelled(id.to_string()));
                }
                _ = sleep(delay) => {}
            }
        }
    }

    fn not_visible(&self, id: &str, seen: bool, started: Instant) -> Result<()> {
        if seen {
            return Err(CloudError::ConvergenceFailed {
                id: id.to_string(),
                status: ABSENT.to_string(),
                expected: self.convergence.describe_target(),
            });
        }
        if started.elapsed() >= self.config.visibility_grace {
            return Err(CloudError::NeverVisible {
                id: id.to_string(),
                grace: self.config.visibility_grace,
            });
        }
        tracing::debug!("Resource {} not visible yet", id);
        Ok(())
    }

    fn timed_out(&self, id: &str, last_status: Option<&S>, started: Instant) -> CloudError {
        CloudError::Timeout {
            id: id.to_string(),
            last_status: last_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "not visible".to_string()),
            waited: started.elapsed(),
        }
    }
}
