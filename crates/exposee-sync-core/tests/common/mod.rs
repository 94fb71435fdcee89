//! Shared fixtures for exposee client integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use exposee_sync_core::clock::format_http_date;
use exposee_sync_core::{
    ApplicationDescriptor, ClientOptions, ExposeeServiceClient, ExposeeTransport,
    InMemoryResponseCache, RequestIdentity, ResponseCache, TransportError, TransportResponse,
};
use exposee_sync_proto::{ProtoExposedList, ProtoExposee};
use prost::Message;
use reqwest::header::{HeaderMap, HeaderValue, DATE, ETAG};
use reqwest::{StatusCode, Url};
use time::OffsetDateTime;

/// Diagnosis key published in the single-record fixtures.
pub const SAMPLE_KEY_BASE64: &str = "k6zymVXKbPHBkae6ng2k3H25WrpqxUEluI1w86t+eOI=";

pub fn descriptor(base: &str) -> ApplicationDescriptor {
    ApplicationDescriptor {
        app_id: "ch.xy".to_string(),
        description: "XY".to_string(),
        jwt_public_key: None,
        bucket_base_url: Url::parse(base).unwrap(),
        report_base_url: Url::parse(base).unwrap(),
        contact: "xy".to_string(),
    }
}

pub fn sample_key() -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(SAMPLE_KEY_BASE64)
        .unwrap()
}

/// Encodes a list holding the sample key with the given onset.
pub fn single_record_body(onset: OffsetDateTime) -> Vec<u8> {
    let key_date = i64::try_from(onset.unix_timestamp_nanos() / 1_000_000).unwrap();
    ProtoExposedList {
        exposed: vec![ProtoExposee {
            key: sample_key(),
            key_date,
        }],
    }
    .encode_to_vec()
}

pub fn empty_body() -> Vec<u8> {
    ProtoExposedList::default().encode_to_vec()
}

pub fn http_date(at: OffsetDateTime) -> String {
    format_http_date(at).unwrap()
}

/// Canned response served by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn etag(mut self, value: &str) -> Self {
        self.headers
            .insert(ETAG, HeaderValue::from_str(value).unwrap());
        self
    }

    pub fn date(mut self, at: OffsetDateTime) -> Self {
        self.headers
            .insert(DATE, HeaderValue::from_str(&http_date(at)).unwrap());
        self
    }

    fn build(&self) -> TransportResponse {
        TransportResponse {
            status: StatusCode::from_u16(self.status).unwrap(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// Transport double that records every request and replays one outcome.
pub struct RecordingTransport {
    outcome: Result<ResponseBuilder, ()>,
    requests: Mutex<Vec<RequestIdentity>>,
}

impl RecordingTransport {
    pub fn responding(response: ResponseBuilder) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport that never obtains a response.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RequestIdentity> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.url().to_string())
            .collect()
    }
}

#[async_trait]
impl ExposeeTransport for RecordingTransport {
    async fn execute(
        &self,
        request: &RequestIdentity,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Ok(response) => Ok(response.build()),
            Err(()) => Err(TransportError::Interrupted),
        }
    }
}

pub fn client_with(
    transport: Arc<RecordingTransport>,
    cache: Arc<dyn ResponseCache>,
) -> ExposeeServiceClient {
    ExposeeServiceClient::with_transport(transport, cache, &ClientOptions::default()).unwrap()
}

pub fn client_with_fresh_cache(transport: Arc<RecordingTransport>) -> ExposeeServiceClient {
    client_with(transport, Arc::new(InMemoryResponseCache::new()))
}
