//! Concurrent fan-out of one lifecycle operation over many containers.

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
};

use futures::{future, FutureExt};
use getset::Getters;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{ContainuError, ContainuResult};

use super::LifecycleService;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A container operation that can be applied to many ids at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    /// Start each container
    Start,

    /// Stop each container
    Stop,

    /// Restart each container
    Restart,

    /// Delete each container
    Delete,
}

/// Runs one operation per id concurrently and collects every outcome.
///
/// A failing unit never prevents its siblings from running or being reported.
#[derive(Clone)]
pub struct BatchCoordinator {
    service: LifecycleService,
}

/// The per-id outcomes of a batch.
#[derive(Getters)]
#[getset(get = "pub with_prefix")]
pub struct BatchReport {
    /// Past-tense verb describing the operation, e.g. `started`
    verb: String,

    /// Outcome of each distinct id in the batch
    outcomes: HashMap<Uuid, ContainuResult<()>>,

    /// Container names as they were when the batch was launched
    #[getset(skip)]
    names: HashMap<Uuid, String>,
}

//--------------------------------------------------------------------------------------------------
// Methods: BatchAction
//--------------------------------------------------------------------------------------------------

impl BatchAction {
    /// Returns the past-tense verb used in reports.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
            Self::Delete => "deleted",
        }
    }

    /// Applies the operation to a single container.
    pub async fn apply(&self, service: &LifecycleService, id: Uuid) -> ContainuResult<()> {
        match self {
            Self::Start => service.start(id).await,
            Self::Stop => service.stop(id).await,
            Self::Restart => service.restart(id).await,
            Self::Delete => service.delete(id).await.map(|_| ()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: BatchCoordinator
//--------------------------------------------------------------------------------------------------

impl BatchCoordinator {
    /// Creates a coordinator dispatching to `service`.
    pub fn new(service: LifecycleService) -> Self {
        Self { service }
    }

    /// Applies `action` to every id concurrently and waits for all of them.
    ///
    /// Repeated ids run once. An empty set completes immediately with an empty report.
    pub async fn run(&self, ids: impl IntoIterator<Item = Uuid>, action: BatchAction) -> BatchReport {
        self.run_cancellable(ids, action, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops launching units once `token` is cancelled.
    ///
    /// Units already launched run to completion, even if the returned future is dropped. Ids
    /// that were never launched are reported as [`ContainuError::Cancelled`].
    #[tracing::instrument(skip(self, ids, token))]
    pub async fn run_cancellable(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
        action: BatchAction,
        token: CancellationToken,
    ) -> BatchReport {
        let service = self.service.clone();
        self.launch(ids, action.past_tense(), token, move |id| {
            let service = service.clone();
            async move { action.apply(&service, id).await }
        })
        .await
    }

    /// Runs an arbitrary per-id operation concurrently and waits for all of them.
    pub async fn run_with<F, Fut>(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
        verb: &str,
        f: F,
    ) -> BatchReport
    where
        F: Fn(Uuid) -> Fut,
        Fut: Future<Output = ContainuResult<()>> + Send + 'static,
    {
        self.launch(ids, verb, CancellationToken::new(), f).await
    }

    /// Starts the marked containers, or the current one if none are marked.
    pub async fn start_selected_or_current(&self) -> ContainuResult<BatchReport> {
        self.run_on_selection(BatchAction::Start).await
    }

    /// Stops the marked containers, or the current one if none are marked.
    pub async fn stop_selected_or_current(&self) -> ContainuResult<BatchReport> {
        self.run_on_selection(BatchAction::Stop).await
    }

    /// Restarts the marked containers, or the current one if none are marked.
    pub async fn restart_selected_or_current(&self) -> ContainuResult<BatchReport> {
        self.run_on_selection(BatchAction::Restart).await
    }

    /// Deletes the marked containers, or the current one if none are marked.
    pub async fn delete_selected_or_current(&self) -> ContainuResult<BatchReport> {
        self.run_on_selection(BatchAction::Delete).await
    }

    async fn run_on_selection(&self, action: BatchAction) -> ContainuResult<BatchReport> {
        let targets = self
            .service
            .get_store()
            .read(|state| state.get_selection().resolve_targets())?;

        Ok(self.run(targets, action).await)
    }

    async fn launch<F, Fut>(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
        verb: &str,
        token: CancellationToken,
        f: F,
    ) -> BatchReport
    where
        F: Fn(Uuid) -> Fut,
        Fut: Future<Output = ContainuResult<()>> + Send + 'static,
    {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

        let names = match self.service.snapshot() {
            Ok(snapshot) => ids
                .iter()
                .filter_map(|id| snapshot.container(*id).map(|c| (*id, c.name.clone())))
                .collect(),
            Err(e) => {
                tracing::warn!("could not resolve container names for batch: {}", e);
                HashMap::new()
            }
        };

        let mut outcomes = HashMap::with_capacity(ids.len());
        let mut handles = Vec::with_capacity(ids.len());

        for id in ids {
            if token.is_cancelled() {
                outcomes.insert(id, Err(ContainuError::Cancelled));
                continue;
            }

            // Detached: a started unit finishes even if this batch is dropped.
            let unit = AssertUnwindSafe(f(id)).catch_unwind();
            handles.push(async move { (id, tokio::spawn(unit).await) });
        }

        tracing::info!(launched = handles.len(), verb, "batch launched");

        for (id, joined) in future::join_all(handles).await {
            let outcome = match joined {
                Ok(Ok(result)) => result,
                Ok(Err(panic)) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(%id, "batch unit panicked: {}", message);
                    Err(ContainuError::TaskPanicked(message))
                }
                Err(e) => {
                    tracing::error!(%id, "batch unit did not complete: {}", e);
                    Err(ContainuError::TaskPanicked(e.to_string()))
                }
            };
            outcomes.insert(id, outcome);
        }

        let report = BatchReport {
            verb: verb.to_string(),
            outcomes,
            names,
        };

        tracing::info!(
            succeeded = report.succeeded().len(),
            failed = report.failures().len(),
            "batch finished"
        );

        report
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: BatchReport
//--------------------------------------------------------------------------------------------------

impl BatchReport {
    /// Returns the number of distinct ids in the batch.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` if the batch had no ids.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the outcome for one id.
    pub fn outcome(&self, id: Uuid) -> Option<&ContainuResult<()>> {
        self.outcomes.get(&id)
    }

    /// Returns the ids that succeeded.
    pub fn succeeded(&self) -> Vec<Uuid> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_ok())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the ids that failed with their errors, ordered by display name.
    pub fn failures(&self) -> Vec<(Uuid, &ContainuError)> {
        let mut failures: Vec<_> = self
            .outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.as_ref().err().map(|e| (*id, e)))
            .collect();
        failures.sort_by_key(|(id, _)| self.name_of(*id));
        failures
    }

    /// Returns `true` if every id succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.values().all(Result::is_ok)
    }

    /// Returns the name a container had when the batch launched, or its id.
    pub fn name_of(&self, id: Uuid) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for BatchReport {
    /// Formats the report as e.g. `3 of 4 containers started; redis-cache failed: not found`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.len();
        let noun = if total == 1 { "container" } else { "containers" };
        write!(
            f,
            "{} of {} {} {}",
            self.succeeded().len(),
            total,
            noun,
            self.verb
        )?;

        for (id, error) in self.failures() {
            write!(f, "; {} failed: {}", self.name_of(id), error)?;
        }

        Ok(())
    }
}

impl fmt::Debug for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchReport")
            .field("verb", &self.verb)
            .field("succeeded", &self.succeeded().len())
            .field("failed", &self.failures().len())
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
