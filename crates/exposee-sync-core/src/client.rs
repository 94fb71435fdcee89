//! Exposee service client.
//!
//! [`ExposeeServiceClient::fetch`] retrieves one published batch and runs it
//! through the full pipeline: build the request, perform one exchange, reject
//! non-2xx statuses, check the server clock, resolve the validator cache, and
//! decode. Each step either advances or terminates the call with exactly one
//! [`SyncError`]; nothing is retried.
//!
//! The transport is asynchronous. `fetch` spawns the exchange on the
//! client's runtime and parks the calling thread on a oneshot receiver, so
//! one thread is occupied per in-flight call. Callers that already live in
//! async code use [`ExposeeServiceClient::fetch_async`] instead.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheValidator, InMemoryResponseCache, ResponseCache};
use crate::clock::{check_time_shift, parse_http_date};
use crate::config::{ApplicationDescriptor, ClientOptions};
use crate::decode::{decode, ExposedBatch};
use crate::error::{ClientError, SyncError, TransportError};
use crate::http::{ExposeeTransport, HttpTransport, TransportResponse};
use crate::request::{BatchTimestamp, RequestIdentity};
use crate::telemetry::{NoopTelemetry, SyncTelemetry};

/// Result of one fetch.
///
/// `Ok(None)` means the batch is unchanged since the last decoded response
/// for the same request; `Ok(Some(batch))` with an empty batch means the
/// server published zero records. The two must not be conflated.
pub type SyncOutcome = Result<Option<ExposedBatch>, SyncError>;

/// Runtime driving the asynchronous transport.
struct ClientRuntime {
    handle: Handle,
    /// Set when the client created the runtime itself.
    owned: Option<Runtime>,
}

impl ClientRuntime {
    fn owned(runtime: Runtime) -> Self {
        Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
        }
    }

    fn borrowed(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for ClientRuntime {
    fn drop(&mut self) {
        // A plain runtime drop blocks, which panics when the client is dropped inside async code.
        if let Some(runtime) = self.owned.take() {
            runtime.shutdown_background();
        }
    }
}

/// Client retrieving exposed batches from the backend.
pub struct ExposeeServiceClient {
    transport: Arc<dyn ExposeeTransport>,
    cache: Arc<dyn ResponseCache>,
    telemetry: Arc<dyn SyncTelemetry>,
    time_shift_threshold: Duration,
    runtime: ClientRuntime,
}

impl ExposeeServiceClient {
    /// Builds a client with the HTTP transport, an in-memory cache, and a dedicated runtime.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new(&options)?);
        Self::with_transport(transport, Arc::new(InMemoryResponseCache::new()), &options)
    }

    /// Builds a client around the supplied collaborators and a dedicated runtime.
    ///
    /// The runtime is shut down in the background when the client is dropped,
    /// so the client may be dropped from async code as well.
    pub fn with_transport(
        transport: Arc<dyn ExposeeTransport>,
        cache: Arc<dyn ResponseCache>,
        options: &ClientOptions,
    ) -> Result<Self, ClientError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("exposee-sync")
            .enable_all()
            .build()?;
        Ok(Self::assemble(
            transport,
            cache,
            options,
            ClientRuntime::owned(runtime),
        ))
    }

    /// Builds a client that spawns its exchanges on an embedder-owned runtime.
    ///
    /// [`fetch`](Self::fetch) still blocks the calling thread, so it must not be
    /// called from a task running on `handle`.
    pub fn with_runtime_handle(
        transport: Arc<dyn ExposeeTransport>,
        cache: Arc<dyn ResponseCache>,
        options: &ClientOptions,
        handle: Handle,
    ) -> Self {
        Self::assemble(transport, cache, options, ClientRuntime::borrowed(handle))
    }

    fn assemble(
        transport: Arc<dyn ExposeeTransport>,
        cache: Arc<dyn ResponseCache>,
        options: &ClientOptions,
        runtime: ClientRuntime,
    ) -> Self {
        Self {
            transport,
            cache,
            telemetry: Arc::new(NoopTelemetry),
            time_shift_threshold: options.time_shift_threshold,
            runtime,
        }
    }

    /// Replaces the telemetry sink.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn SyncTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Cache consulted and updated by this client.
    pub fn cache(&self) -> Arc<dyn ResponseCache> {
        Arc::clone(&self.cache)
    }

    /// Retrieves the batch released at `batch`, blocking until the outcome is known.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn fetch(&self, descriptor: &ApplicationDescriptor, batch: BatchTimestamp) -> SyncOutcome {
        let request = RequestIdentity::for_batch(descriptor, batch);
        let response = self.execute_blocking(&request);
        self.complete(&request, response)
    }

    /// Asynchronous variant of [`fetch`](Self::fetch) with identical semantics.
    pub async fn fetch_async(
        &self,
        descriptor: &ApplicationDescriptor,
        batch: BatchTimestamp,
    ) -> SyncOutcome {
        let request = RequestIdentity::for_batch(descriptor, batch);
        let response = self.transport.execute(&request).await;
        self.complete(&request, response)
    }

    /// Runs the exchange on the client runtime and waits for its single result.
    fn execute_blocking(
        &self,
        request: &RequestIdentity,
    ) -> Result<TransportResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        let request = request.clone();
        self.runtime.handle().spawn(async move {
            let result = transport.execute(&request).await;
            // The receiver is gone only if the caller thread unwound.
            let _ = tx.send(result);
        });
        // A dropped sender means the task panicked or the runtime shut down.
        rx.blocking_recv().unwrap_or(Err(TransportError::Interrupted))
    }

    fn complete(
        &self,
        request: &RequestIdentity,
        response: Result<TransportResponse, TransportError>,
    ) -> SyncOutcome {
        let outcome = self.resolve(request, response);
        match &outcome {
            Ok(Some(batch)) => self.telemetry.on_batch_decoded(batch.len()),
            Ok(None) => self.telemetry.on_batch_unchanged(),
            Err(err) => {
                debug!(url = %request, kind = err.kind(), error = %err, "exposee fetch failed");
                self.telemetry.on_sync_error(err);
            }
        }
        outcome
    }

    fn resolve(
        &self,
        request: &RequestIdentity,
        response: Result<TransportResponse, TransportError>,
    ) -> SyncOutcome {
        let response = response?;
        if !response.status.is_success() {
            return Err(SyncError::InvalidResponseCode(response.status.as_u16()));
        }

        self.check_server_time(&response)?;

        let validator = response.validator().map(CacheValidator::new);
        if let Some(cached) = self.cache.lookup(request) {
            if cached.matches(validator.as_ref()) {
                debug!(url = %request, etag = ?validator, "exposed batch unchanged");
                return Ok(None);
            }
        }

        let batch = decode(&response.body)?;
        debug!(url = %request, records = batch.len(), etag = ?validator, "decoded exposed batch");
        self.cache.store(
            request,
            CacheEntry {
                validator,
                batch: batch.clone(),
            },
        );
        Ok(Some(batch))
    }

    /// Rejects responses whose `Date` deviates too far from local time.
    ///
    /// A missing or unparseable `Date` header skips the check.
    fn check_server_time(&self, response: &TransportResponse) -> Result<(), SyncError> {
        let Some(raw) = response.date() else {
            return Ok(());
        };
        let Some(server_time) = parse_http_date(raw) else {
            warn!(date = raw, "ignoring unparseable Date header");
            return Ok(());
        };
        check_time_shift(
            server_time,
            OffsetDateTime::now_utc(),
            self.time_shift_threshold,
        )
        .map_err(|shift| {
            warn!(
                shift_secs = shift.as_secs(),
                threshold_secs = self.time_shift_threshold.as_secs(),
                "server time deviates from local time"
            );
            SyncError::TimeInconsistency { shift }
        })
    }
}
