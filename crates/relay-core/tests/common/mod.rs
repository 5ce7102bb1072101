#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relay_core::typed::codec;
use relay_core::{
    QueueObserver, Request, RequestContext, RequestDictionary, RequestError, RequestRecord, RequestStatus, Revivable,
};
use serde::{Deserialize, Serialize};

/// What one attempt of a `ScriptedRequest` does.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(RequestError),
    Hang,
    Delay(Duration, Result<(), RequestError>),
    /// Report `fraction`, wait `then`, succeed.
    Partial { fraction: f64, then: Duration },
    /// Heartbeat `count` times, `every` apart, then succeed.
    Heartbeats { every: Duration, count: u32 },
}

/// Request whose attempts follow a script. An exhausted script succeeds.
pub struct ScriptedRequest {
    title: String,
    script: Mutex<VecDeque<Step>>,
    starts: AtomicU32,
    retry: bool,
    dictionary: RequestDictionary,
}

impl ScriptedRequest {
    pub fn new(title: &str, steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
            script: Mutex::new(steps.into_iter().collect()),
            starts: AtomicU32::new(0),
            retry: false,
            dictionary: RequestDictionary::new(),
        })
    }

    pub fn retrying(title: &str, steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
            script: Mutex::new(steps.into_iter().collect()),
            starts: AtomicU32::new(0),
            retry: true,
            dictionary: RequestDictionary::new(),
        })
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn shared(self: &Arc<Self>) -> Arc<dyn Request> {
        self.clone()
    }
}

#[async_trait]
impl Request for ScriptedRequest {
    fn title(&self) -> String {
        self.title.clone()
    }

    async fn perform(&self, ctx: RequestContext) -> Result<(), RequestError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Succeed);
        match step {
            Step::Succeed => Ok(()),
            Step::Fail(error) => Err(error),
            Step::Hang => std::future::pending().await,
            Step::Delay(after, result) => {
                tokio::time::sleep(after).await;
                result
            }
            Step::Partial { fraction, then } => {
                ctx.update_progress(fraction);
                tokio::time::sleep(then).await;
                Ok(())
            }
            Step::Heartbeats { every, count } => {
                for _ in 0..count {
                    tokio::time::sleep(every).await;
                    ctx.heartbeat();
                }
                Ok(())
            }
        }
    }

    fn should_retry(&self, _error: &RequestError) -> bool {
        self.retry
    }

    fn to_dictionary(&self) -> RequestDictionary {
        self.dictionary.clone()
    }
}

/// Revivable request used by the persistence scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
}

impl Revivable for Note {
    const KIND: &'static str = "test.note.v1";
}

#[async_trait]
impl Request for Note {
    fn title(&self) -> String {
        format!("note: {}", self.text)
    }

    async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
        Ok(())
    }

    fn to_dictionary(&self) -> RequestDictionary {
        codec::dictionary_or_empty(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Connectivity(bool),
    Started(String),
    Updated(String, RequestStatus),
    Finished(String),
    Failed(String, RequestError),
}

/// Observer that records every callback (progress is kept separately).
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
    progress: Mutex<Vec<f64>>,
    veto: AtomicBool,
    force_retry: AtomicBool,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_veto(&self, veto: bool) {
        self.veto.store(veto, Ordering::SeqCst);
    }

    pub fn set_force_retry(&self, force: bool) {
        self.force_retry.store(force, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_progress(&self) -> Option<f64> {
        self.progress.lock().unwrap().last().copied()
    }

    pub fn count(&self, pred: impl Fn(&Observed) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn started(&self, title: &str) -> usize {
        self.count(|e| matches!(e, Observed::Started(t) if t == title))
    }

    pub fn updated(&self, title: &str) -> usize {
        self.count(|e| matches!(e, Observed::Updated(t, _) if t == title))
    }

    pub fn finished(&self, title: &str) -> usize {
        self.count(|e| matches!(e, Observed::Finished(t) if t == title))
    }

    pub fn failures(&self, title: &str) -> Vec<RequestError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Failed(t, error) if t == title => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn connectivity(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Connectivity(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Observed) {
        self.events.lock().unwrap().push(event);
    }
}

impl QueueObserver for RecordingObserver {
    fn connectivity_changed(&self, connected: bool) {
        self.push(Observed::Connectivity(connected));
    }

    fn progress_changed(&self, progress: f64) {
        self.progress.lock().unwrap().push(progress);
    }

    fn should_attempt(&self, _request: &RequestRecord) -> bool {
        !self.veto.load(Ordering::SeqCst)
    }

    fn should_reattempt(&self, _request: &RequestRecord, _error: &RequestError) -> bool {
        self.force_retry.load(Ordering::SeqCst)
    }

    fn request_started(&self, request: &RequestRecord) {
        self.push(Observed::Started(request.title().to_string()));
    }

    fn request_updated(&self, request: &RequestRecord) {
        self.push(Observed::Updated(request.title().to_string(), request.status().clone()));
    }

    fn request_finished(&self, request: &RequestRecord) {
        self.push(Observed::Finished(request.title().to_string()));
    }

    fn request_failed(&self, request: &RequestRecord, error: &RequestError) {
        self.push(Observed::Failed(request.title().to_string(), error.clone()));
    }
}

/// Let every ready task run; with paused time this also fires due timers.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
