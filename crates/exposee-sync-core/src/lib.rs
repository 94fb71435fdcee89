//! Backend synchronisation core for published exposee batches.
//!
//! An [`ExposeeServiceClient`] fetches the batch released at a given
//! [`BatchTimestamp`], rejects responses whose server clock deviates too far
//! from local time, answers "unchanged" when the cached `ETag` still matches,
//! and otherwise decodes the protobuf body into an [`ExposedBatch`].
//!
//! Transport and cache are pluggable through [`ExposeeTransport`] and
//! [`ResponseCache`]; outcomes can be observed through [`SyncTelemetry`].

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod request;
pub mod telemetry;

pub use cache::{CacheEntry, CacheValidator, InMemoryResponseCache, NoopResponseCache, ResponseCache};
pub use client::{ExposeeServiceClient, SyncOutcome};
pub use config::{ApplicationDescriptor, ClientOptions};
pub use decode::{decode, ExposedBatch, ExposedRecord};
pub use error::{ClientError, DecodeError, SyncError, TransportError};
pub use http::{ExposeeTransport, HttpTransport, TransportResponse};
pub use request::{BatchTimestamp, RequestIdentity, PROTOBUF_MEDIA_TYPE};
pub use telemetry::{CountingTelemetry, NoopTelemetry, SyncTelemetry, TelemetryCounters, TelemetrySnapshot};
