use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use scout_core::{
    apply_statuses, evaluate_batch, BatchId, BatchVerdict, ScrapeTask, SearchQuery, TaskId,
    TaskStatus,
};
use scout_logging::{scout_debug, scout_info, scout_warn};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::listing::ListingAggregator;
use crate::{ApiError, EngineEvent, OrchestratorError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The one batch being watched. `batch` is `None` when nothing is tracked.
#[derive(Debug, Default)]
struct Tracked {
    batch: Option<BatchId>,
    tasks: Vec<ScrapeTask>,
}

impl Tracked {
    fn clear(&mut self) {
        self.batch = None;
        self.tasks.clear();
    }
}

struct ActiveBatch {
    batch: BatchId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Submits scrape batches and polls them until they finish or fail.
///
/// At most one batch is tracked. A finished batch triggers one listing
/// refresh through the [`ListingAggregator`]. After [`teardown`](Self::teardown)
/// no request is issued and no late result touches the tracked state.
pub struct ScrapeOrchestrator {
    api: Arc<dyn JobApi>,
    listing: ListingAggregator,
    settings: PollSettings,
    sink: Arc<dyn EventSink>,
    tracked: Arc<Mutex<Tracked>>,
    next_batch: u64,
    active: Option<ActiveBatch>,
    torn_down: bool,
}

impl ScrapeOrchestrator {
    pub fn new(api: Arc<dyn JobApi>, settings: PollSettings, sink: Arc<dyn EventSink>) -> Self {
        Self {
            listing: ListingAggregator::new(api.clone()),
            api,
            settings,
            sink,
            tracked: Arc::new(Mutex::new(Tracked::default())),
            next_batch: 0,
            active: None,
            torn_down: false,
        }
    }

    /// Validate the query, create the remote tasks and start polling them.
    ///
    /// Emits [`EngineEvent::BatchStarted`] before the first poll can run. A
    /// batch already being polled is cancelled first.
    pub async fn submit(
        &mut self,
        role: &str,
        location: &str,
    ) -> Result<BatchId, OrchestratorError> {
        let query = SearchQuery::new(role, location)?;
        if self.torn_down {
            return Err(OrchestratorError::TaskCreation(
                "orchestrator was torn down".to_string(),
            ));
        }
        if let Some(previous) = self.cancel_active() {
            scout_info!("Replacing {} with a new search", previous);
            lock(&self.tracked).clear();
        }

        scout_info!(
            "Starting scrape for {:?} in {:?}",
            query.role_keywords(),
            query.location()
        );
        let tasks = self.api.create_scrape_batch(&query).await.map_err(|err| {
            scout_warn!("Scrape task creation failed: {}", err);
            OrchestratorError::TaskCreation(err.to_string())
        })?;
        if tasks.is_empty() {
            return Err(OrchestratorError::TaskCreation(
                "backend returned an empty batch".to_string(),
            ));
        }

        self.next_batch += 1;
        let batch = BatchId(self.next_batch);
        {
            let mut tracked = lock(&self.tracked);
            tracked.batch = Some(batch);
            tracked.tasks = tasks.clone();
        }
        scout_info!("{} created with {} tasks", batch, tasks.len());
        self.sink.emit(EngineEvent::BatchStarted { batch, tasks });

        let cancel = CancellationToken::new();
        let poller = BatchPoller {
            api: self.api.clone(),
            listing: self.listing.clone(),
            sink: self.sink.clone(),
            tracked: self.tracked.clone(),
            interval: self.settings.interval,
            batch,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(poller.run());
        self.active = Some(ActiveBatch {
            batch,
            cancel,
            handle,
        });
        Ok(batch)
    }

    /// Snapshot of the tracked tasks.
    pub fn tracked(&self) -> Vec<ScrapeTask> {
        lock(&self.tracked).tasks.clone()
    }

    pub fn active_batch(&self) -> Option<BatchId> {
        lock(&self.tracked).batch
    }

    /// True while a poll loop is still running.
    pub fn is_polling(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Abandon the current batch, if any. New searches can still be submitted.
    pub fn cancel(&mut self) {
        if let Some(batch) = self.cancel_active() {
            scout_info!("Cancelled {}", batch);
            lock(&self.tracked).clear();
        }
    }

    /// Stop polling for good. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        match self.cancel_active() {
            Some(batch) => scout_info!("Torn down while polling {}", batch),
            None => scout_debug!("Torn down with no active batch"),
        }
    }

    fn cancel_active(&mut self) -> Option<BatchId> {
        let active = self.active.take()?;
        active.cancel.cancel();
        Some(active.batch)
    }
}

impl Drop for ScrapeOrchestrator {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

fn lock(tracked: &Mutex<Tracked>) -> MutexGuard<'_, Tracked> {
    tracked.lock().unwrap_or_else(PoisonError::into_inner)
}

enum CycleOutcome {
    Continue,
    Finished,
    Stopped,
}

struct BatchPoller {
    api: Arc<dyn JobApi>,
    listing: ListingAggregator,
    sink: Arc<dyn EventSink>,
    tracked: Arc<Mutex<Tracked>>,
    interval: Duration,
    batch: BatchId,
    cancel: CancellationToken,
}

impl BatchPoller {
    async fn run(self) {
        // First check one interval after submission.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    scout_debug!("{} poll loop cancelled", self.batch);
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.cycle().await {
                CycleOutcome::Continue => {}
                CycleOutcome::Stopped => return,
                CycleOutcome::Finished => {
                    self.refresh_listing().await;
                    return;
                }
            }
        }
    }

    async fn cycle(&self) -> CycleOutcome {
        let snapshot: Vec<TaskId> = {
            let tracked = lock(&self.tracked);
            if tracked.batch != Some(self.batch) {
                return CycleOutcome::Stopped;
            }
            tracked.tasks.iter().map(|task| task.id.clone()).collect()
        };

        let checks = snapshot.into_iter().map(|id| {
            let api = self.api.clone();
            async move {
                let status = api.scrape_status(&id).await;
                (id, status)
            }
        });
        let results = join_all(checks).await;

        let mut tracked = lock(&self.tracked);
        // Results that arrive after teardown or replacement are dropped.
        if self.cancel.is_cancelled() || tracked.batch != Some(self.batch) {
            scout_debug!("Dropping late status results for {}", self.batch);
            return CycleOutcome::Stopped;
        }

        let (observed, failure) = split_results(results);
        if let Some(err) = failure {
            scout_warn!("Status check for {} failed: {}", self.batch, err);
            tracked.clear();
            self.sink.emit(EngineEvent::BatchFailed {
                batch: self.batch,
                error: OrchestratorError::Poll(err),
            });
            return CycleOutcome::Stopped;
        }

        apply_statuses(&mut tracked.tasks, &observed);
        match evaluate_batch(&tracked.tasks) {
            BatchVerdict::Continue => {
                self.sink.emit(EngineEvent::BatchProgress {
                    batch: self.batch,
                    tasks: tracked.tasks.clone(),
                });
                CycleOutcome::Continue
            }
            BatchVerdict::Failed { tasks } => {
                scout_warn!("{} failed: {} task(s) failed or vanished", self.batch, tasks.len());
                tracked.clear();
                self.sink.emit(EngineEvent::BatchFailed {
                    batch: self.batch,
                    error: OrchestratorError::TaskFailed { tasks },
                });
                CycleOutcome::Stopped
            }
            BatchVerdict::Finished => {
                scout_info!("{} finished", self.batch);
                tracked.clear();
                self.sink.emit(EngineEvent::BatchFinished { batch: self.batch });
                CycleOutcome::Finished
            }
        }
    }

    async fn refresh_listing(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        let result = self.listing.fetch().await;
        if self.cancel.is_cancelled() {
            scout_debug!("Dropping listing fetched after teardown");
            return;
        }
        self.sink.emit(EngineEvent::ListingFetched(result));
    }
}

/// Successful observations, plus the first failure if any request failed.
fn split_results(
    results: Vec<(TaskId, Result<TaskStatus, ApiError>)>,
) -> (Vec<(TaskId, TaskStatus)>, Option<ApiError>) {
    let mut observed = Vec::with_capacity(results.len());
    let mut failure = None;
    for (id, result) in results {
        match result {
            Ok(status) => observed.push((id, status)),
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
    }
    (observed, failure)
}
