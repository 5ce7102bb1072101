//! Demo requests: visit records and chunked photo uploads against a fake API.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use relay_core::typed::codec::{self, CodecError};
use relay_core::typed::{RegistryError, RequestRegistry};
use relay_core::{NetworkFailure, Request, RequestContext, RequestDictionary, RequestError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stand-in backend: the first `failures` calls lose the connection, the
/// next `server_errors` calls answer 500, the rest succeed.
#[derive(Debug)]
pub struct FlakyApi {
    remaining_failures: AtomicU32,
    remaining_server_errors: AtomicU32,
    latency: Duration,
}

impl FlakyApi {
    pub fn new(failures: u32, server_errors: u32, latency: Duration) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
            remaining_server_errors: AtomicU32::new(server_errors),
            latency,
        }
    }

    /// Returns the HTTP status the server answered with.
    pub async fn call(&self, what: &str) -> Result<u16, RequestError> {
        tokio::time::sleep(self.latency).await;
        if take_one(&self.remaining_failures) {
            return Err(RequestError::network(
                NetworkFailure::ConnectionLost,
                format!("{what}: connection reset by peer"),
            ));
        }
        if take_one(&self.remaining_server_errors) {
            debug!(what, "api call answered 500");
            return Ok(500);
        }
        debug!(what, "api call ok");
        Ok(200)
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub country: String,
    pub note: String,
}

pub struct VisitRequest {
    visit: Visit,
    api: Arc<FlakyApi>,
}

impl VisitRequest {
    pub const KIND: &'static str = "visits.create.v1";

    pub fn new(visit: Visit, api: Arc<FlakyApi>) -> Self {
        Self { visit, api }
    }
}

#[async_trait]
impl Request for VisitRequest {
    fn title(&self) -> String {
        format!("Visit to {}", self.visit.country)
    }

    async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
        let status = self.api.call("POST /visits").await?;
        visit_outcome(&self.visit, status)
    }

    fn to_dictionary(&self) -> RequestDictionary {
        encode_or_empty(Self::KIND, &self.visit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSpec {
    pub filename: String,
    pub chunks: u32,
}

pub struct PhotoUpload {
    spec: PhotoSpec,
    api: Arc<FlakyApi>,
}

impl PhotoUpload {
    pub const KIND: &'static str = "photos.upload.v1";

    pub fn new(spec: PhotoSpec, api: Arc<FlakyApi>) -> Self {
        Self { spec, api }
    }
}

#[async_trait]
impl Request for PhotoUpload {
    fn title(&self) -> String {
        format!("Upload {}", self.spec.filename)
    }

    async fn perform(&self, ctx: RequestContext) -> Result<(), RequestError> {
        let chunks = self.spec.chunks.max(1);
        for chunk in 0..chunks {
            check_status(self.api.call("PUT /photos").await?)?;
            ctx.update_progress(f64::from(chunk + 1) / f64::from(chunks));
            ctx.heartbeat();
        }
        Ok(())
    }

    /// Server-side errors are worth another try; client errors are not.
    fn should_retry(&self, error: &RequestError) -> bool {
        matches!(error, RequestError::Application { code, .. } if *code >= 500)
    }

    fn to_dictionary(&self) -> RequestDictionary {
        encode_or_empty(Self::KIND, &self.spec)
    }
}

fn visit_outcome(visit: &Visit, status: u16) -> Result<(), RequestError> {
    // the visits endpoint answers 500 for a visit it already stored
    if status == 500 {
        warn!(country = %visit.country, "server reported 500; treating visit as recorded");
        return Ok(());
    }
    check_status(status)
}

fn check_status(status: u16) -> Result<(), RequestError> {
    if (200..=299).contains(&status) {
        Ok(())
    } else {
        Err(RequestError::application(i64::from(status), format!("HTTP {status}")))
    }
}

fn encode_or_empty<T: Serialize>(kind: &str, value: &T) -> RequestDictionary {
    codec::encode_as(kind, value).unwrap_or_else(|error| {
        warn!(kind, %error, "request will not be archived");
        RequestDictionary::new()
    })
}

/// Registry that revives both demo request kinds, sharing `api`.
pub fn registry(api: Arc<FlakyApi>) -> Result<RequestRegistry, RegistryError> {
    let mut registry = RequestRegistry::new();

    let visits_api = Arc::clone(&api);
    registry.register_fn(VisitRequest::KIND, move |dictionary| {
        let visit: Visit = codec::decode_payload(dictionary)?;
        Ok(Arc::new(VisitRequest::new(visit, Arc::clone(&visits_api))) as Arc<dyn Request>)
    })?;

    registry.register_fn(PhotoUpload::KIND, move |dictionary| -> Result<Arc<dyn Request>, CodecError> {
        let spec: PhotoSpec = codec::decode_payload(dictionary)?;
        Ok(Arc::new(PhotoUpload::new(spec, Arc::clone(&api))))
    })?;

    Ok(registry)
}
