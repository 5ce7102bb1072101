//! QueueCore - the single-owner state machine behind a queue.
//!
//! Everything here runs on the queue's runtime task. Perform futures and
//! watchdog timers are spawned separately and report back through
//! `QueueEvent`s, so no lock is ever held across an await.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::progress;
use super::{RequestPhase, RequestRecord};
use crate::app::status::{QueueSnapshot, TaskSummary};
use crate::config::QueueConfig;
use crate::domain::{Decision, RequestContext, RequestError, RequestId, RequestStatus, decide};
use crate::ports::{ArchiveStore, ConnectivityMonitor, ConnectivityStatus, QueueArchive, QueueObserver};

/// Owner-supplied rewrite of the pending list.
pub type PendingTransform = Box<dyn FnOnce(Vec<RequestRecord>) -> Vec<RequestRecord> + Send>;

/// Messages from spawned attempts and timers back to the runtime task.
///
/// `attempt` is the token handed out when the attempt started; events whose
/// token no longer matches an active request are dropped.
#[derive(Debug)]
pub enum QueueEvent {
    Completed {
        id: RequestId,
        attempt: u64,
        result: Result<(), RequestError>,
    },
    Progress {
        id: RequestId,
        attempt: u64,
        fraction: f64,
    },
    Heartbeat {
        id: RequestId,
        attempt: u64,
    },
    SaveRequested {
        id: RequestId,
    },
    /// `seq` identifies the armed timer; a heartbeat supersedes earlier ones.
    WatchdogFired {
        id: RequestId,
        attempt: u64,
        seq: u64,
    },
}

pub(crate) struct QueueCore {
    name: String,
    config: QueueConfig,

    /// Pending and active records, in enqueue order.
    incomplete: Vec<RequestRecord>,

    /// Active ids, in start order.
    ongoing: Vec<RequestId>,

    total_count: usize,
    completed_count: usize,
    progress: f64,

    /// Reachability used when no monitor is configured.
    connected: bool,

    connectivity: Option<Arc<dyn ConnectivityMonitor>>,
    observer: Arc<dyn QueueObserver>,
    store: Box<dyn ArchiveStore>,
    events: mpsc::UnboundedSender<QueueEvent>,
}

impl QueueCore {
    pub(crate) fn new(
        name: String,
        config: QueueConfig,
        store: Box<dyn ArchiveStore>,
        observer: Arc<dyn QueueObserver>,
        connectivity: Option<Arc<dyn ConnectivityMonitor>>,
        events: mpsc::UnboundedSender<QueueEvent>,
    ) -> Self {
        Self {
            name,
            config,
            incomplete: Vec::new(),
            ongoing: Vec::new(),
            total_count: 0,
            completed_count: 0,
            progress: 1.0,
            connected: true,
            connectivity,
            observer,
            store,
            events,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Add records revived from the archive. The archive is not rewritten.
    pub(crate) fn restore(&mut self, records: Vec<RequestRecord>) {
        if records.is_empty() {
            return;
        }
        info!(queue = %self.name, restored = records.len(), "restored requests from archive");
        self.incomplete.extend(records);
        self.total_count = self.incomplete.len() + self.completed_count;
        self.update_progress();
    }

    pub(crate) fn enqueue(&mut self, records: Vec<RequestRecord>, start_immediately: bool) {
        let mut worth_saving = false;
        for record in records {
            if self.index_of(record.id()).is_some() {
                warn!(queue = %self.name, request_id = %record.id(), "request already queued; ignoring");
                continue;
            }
            worth_saving |= !record.dictionary().is_empty();
            debug!(queue = %self.name, request_id = %record.id(), title = %record.title(), "request enqueued");
            self.incomplete.push(record);
        }

        self.total_count = self.incomplete.len() + self.completed_count;
        self.update_progress();

        if worth_saving {
            self.persist();
        }
        if start_immediately {
            self.attempt_next();
        }
    }

    /// Start pending requests, in order, while there is spare capacity.
    pub(crate) fn attempt_next(&mut self) {
        while self.ongoing.len() < self.config.max_concurrent_requests {
            let Some(index) = self
                .incomplete
                .iter()
                .position(|record| !self.ongoing.contains(&record.id()))
            else {
                break;
            };

            if !self.is_reachable() {
                debug!(queue = %self.name, "not reachable; holding pending requests");
                break;
            }
            if !self.observer.should_attempt(&self.incomplete[index]) {
                debug!(queue = %self.name, request_id = %self.incomplete[index].id(), "observer declined attempt");
                break;
            }

            self.start(index);
        }
    }

    fn start(&mut self, index: usize) {
        let record = &mut self.incomplete[index];
        let id = record.id();
        let attempt = record.begin_attempt();
        let request = record.shared_request();

        self.ongoing.push(id);
        self.update_progress();

        info!(queue = %self.name, request_id = %id, attempt, "starting request");
        self.observer.request_started(&self.incomplete[index]);

        let ctx = RequestContext::new(id, attempt, self.events.clone());
        let events = self.events.clone();
        let perform = tokio::spawn(async move {
            let result = request.perform(ctx).await;
            let _ = events.send(QueueEvent::Completed { id, attempt, result });
        });
        let seq = self.incomplete[index].next_watchdog_seq();
        let watchdog = self.arm_watchdog(id, attempt, seq);

        self.incomplete[index].attach(perform.abort_handle(), watchdog);
    }

    fn arm_watchdog(&self, id: RequestId, attempt: u64, seq: u64) -> AbortHandle {
        let timeout = self.config.request_timeout();
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(QueueEvent::WatchdogFired { id, attempt, seq });
        })
        .abort_handle()
    }

    pub(crate) fn handle_event(&mut self, event: QueueEvent) {
        match event {
            QueueEvent::Completed {
                id,
                attempt,
                result,
            } => self.on_completed(id, attempt, result),
            QueueEvent::Progress {
                id,
                attempt,
                fraction,
            } => self.on_progress(id, attempt, fraction),
            QueueEvent::Heartbeat { id, attempt } => self.on_heartbeat(id, attempt),
            QueueEvent::SaveRequested { id } => {
                if self.index_of(id).is_some() {
                    self.persist();
                }
            }
            QueueEvent::WatchdogFired { id, attempt, seq } => self.on_watchdog(id, attempt, seq),
        }
    }

    fn on_completed(&mut self, id: RequestId, attempt: u64, result: Result<(), RequestError>) {
        let Some(index) = self.active_index(id, attempt) else {
            debug!(queue = %self.name, request_id = %id, attempt, "ignoring completion of stale attempt");
            return;
        };
        self.release(id, index);

        let decision = {
            let record = &self.incomplete[index];
            let observer = &self.observer;
            decide(&result, |error| {
                record.request().should_retry(error) || observer.should_reattempt(record, error)
            })
        };

        match decision {
            Decision::Finish => self.resolve(index, None),
            Decision::RetryInPlace { status } => self.retry_in_place(index, status),
            Decision::Fail => self.resolve(index, result.err()),
        }
    }

    fn on_watchdog(&mut self, id: RequestId, attempt: u64, seq: u64) {
        let Some(index) = self.active_index(id, attempt) else {
            return;
        };
        if self.incomplete[index].watchdog_seq() != seq {
            debug!(queue = %self.name, request_id = %id, attempt, seq, "ignoring superseded watchdog");
            return;
        }
        let after = self.config.request_timeout();
        warn!(queue = %self.name, request_id = %id, attempt, ?after, "request watchdog expired");

        self.incomplete[index].abort_perform();
        self.release(id, index);
        self.resolve(index, Some(RequestError::WatchdogExpired { after }));
    }

    fn on_progress(&mut self, id: RequestId, attempt: u64, fraction: f64) {
        if let Some(index) = self.active_index(id, attempt) {
            self.incomplete[index].set_progress(fraction);
            self.update_progress();
        }
    }

    fn on_heartbeat(&mut self, id: RequestId, attempt: u64) {
        if let Some(index) = self.active_index(id, attempt) {
            let seq = self.incomplete[index].next_watchdog_seq();
            let watchdog = self.arm_watchdog(id, attempt, seq);
            self.incomplete[index].rearm_watchdog(watchdog);
        }
    }

    /// Back to pending; waits for the next scheduling pass.
    fn retry_in_place(&mut self, index: usize, status: RequestStatus) {
        let record = &mut self.incomplete[index];
        record.mark_retry(status);
        info!(
            queue = %self.name,
            request_id = %record.id(),
            failures = record.failures(),
            status = %record.status(),
            "request will be retried"
        );

        self.update_progress();
        self.persist();
        self.observer.request_updated(&self.incomplete[index]);
    }

    /// Drop a finished request, then look for more work.
    fn resolve(&mut self, index: usize, error: Option<RequestError>) {
        let mut record = self.incomplete.remove(index);
        match &error {
            None => record.mark_completed(),
            Some(RequestError::WatchdogExpired { .. }) => record.mark_failed(RequestStatus::FailedTimeout),
            Some(error) => record.mark_failed(RequestStatus::failed_error(error.to_string())),
        }
        self.completed_count += 1;

        if self.incomplete.is_empty() {
            self.reset();
        } else {
            self.update_progress();
            self.persist();
        }

        match &error {
            None => {
                info!(queue = %self.name, request_id = %record.id(), "request finished");
                self.observer.request_finished(&record);
            }
            Some(error) => {
                warn!(queue = %self.name, request_id = %record.id(), %error, "request failed");
                self.observer.request_failed(&record, error);
            }
        }

        self.attempt_next();
    }

    /// Active records stay first, in start order; the transform's output follows.
    pub(crate) fn modify_pending(&mut self, transform: PendingTransform) {
        let (mut active, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.incomplete)
            .into_iter()
            .partition(|record| self.ongoing.contains(&record.id()));
        active.sort_by_key(|record| self.ongoing.iter().position(|id| *id == record.id()));

        let mut seen: HashSet<RequestId> = active.iter().map(RequestRecord::id).collect();
        let mut next = active;
        for record in transform(pending) {
            if seen.insert(record.id()) {
                next.push(record);
            } else {
                warn!(queue = %self.name, request_id = %record.id(), "dropping duplicate request from pending rewrite");
            }
        }
        self.incomplete = next;

        if self.incomplete.is_empty() {
            self.reset();
            return;
        }
        self.total_count = self.incomplete.len() + self.completed_count;
        self.update_progress();
        self.persist();
    }

    /// Forget everything. Running performs are left alone; their results are ignored.
    pub(crate) fn clear_all(&mut self) {
        info!(queue = %self.name, dropped = self.incomplete.len(), "clearing queue");
        for record in &mut self.incomplete {
            record.detach();
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.incomplete.clear();
        self.ongoing.clear();
        self.total_count = 0;
        self.completed_count = 0;
        self.set_progress(1.0);
        self.persist();
    }

    /// Abort running attempts. Their records stay archived for the next start.
    pub(crate) fn shutdown(&mut self) {
        for record in &mut self.incomplete {
            record.abort_perform();
            record.detach();
        }
        self.ongoing.clear();
        info!(queue = %self.name, pending = self.incomplete.len(), "queue stopped");
    }

    /// Apply a connectivity report. Only transitions reach the observer.
    pub(crate) fn connectivity_changed(&mut self, status: ConnectivityStatus) {
        let usable = status.is_usable();
        if usable == self.connected {
            return;
        }
        self.connected = usable;
        info!(queue = %self.name, ?status, connected = usable, "connectivity changed");
        self.observer.connectivity_changed(usable);
        if usable {
            self.attempt_next();
        }
    }

    pub(crate) fn is_reachable(&self) -> bool {
        match &self.connectivity {
            Some(monitor) => monitor.current_status().is_usable(),
            None => self.connected,
        }
    }

    pub(crate) fn snapshot(&self) -> QueueSnapshot {
        let tasks = self
            .incomplete
            .iter()
            .map(|record| {
                let phase = if self.ongoing.contains(&record.id()) {
                    RequestPhase::Active
                } else {
                    RequestPhase::Pending
                };
                TaskSummary::from_record(record, phase)
            })
            .collect::<Vec<_>>();
        QueueSnapshot {
            name: self.name.clone(),
            total_count: self.total_count,
            completed_count: self.completed_count,
            pending_count: self.incomplete.len() - self.ongoing.len(),
            active_count: self.ongoing.len(),
            progress: self.progress,
            connected: self.is_reachable(),
            tasks,
        }
    }

    fn persist(&self) {
        let archive = QueueArchive::new(
            self.incomplete
                .iter()
                .map(RequestRecord::dictionary)
                .filter(|dictionary| !dictionary.is_empty())
                .collect(),
        );
        if let Err(error) = self.store.save(&archive) {
            warn!(queue = %self.name, %error, "failed to persist queue archive");
        }
    }

    fn update_progress(&mut self) {
        let in_flight = self
            .incomplete
            .iter()
            .filter(|record| self.ongoing.contains(&record.id()))
            .map(RequestRecord::progress);
        let value = progress::aggregate(self.completed_count, self.total_count, in_flight);
        self.set_progress(value);
    }

    fn set_progress(&mut self, value: f64) {
        self.progress = value;
        self.observer.progress_changed(value);
    }

    fn index_of(&self, id: RequestId) -> Option<usize> {
        self.incomplete.iter().position(|record| record.id() == id)
    }

    fn active_index(&self, id: RequestId, attempt: u64) -> Option<usize> {
        if !self.ongoing.contains(&id) {
            return None;
        }
        self.index_of(id)
            .filter(|index| self.incomplete[*index].attempt() == attempt)
    }

    fn release(&mut self, id: RequestId, index: usize) {
        self.ongoing.retain(|ongoing| *ongoing != id);
        self.incomplete[index].detach();
    }
}
