//! Request construction for the exposed-batch endpoint.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use time::OffsetDateTime;

use crate::config::ApplicationDescriptor;

/// Path below the report base URL serving exposed batches.
const EXPOSED_ENDPOINT: &str = "/v1/exposed";
/// Media type negotiated for batch bodies.
pub const PROTOBUF_MEDIA_TYPE: &str = "application/x-protobuf";

/// Identifies one published batch by its release time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchTimestamp(i64);

impl BatchTimestamp {
    /// Wraps an epoch-millisecond value.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Truncates a calendar timestamp to whole milliseconds (floor).
    pub fn from_datetime(at: OffsetDateTime) -> Self {
        let millis = at.unix_timestamp_nanos().div_euclid(1_000_000);
        // i128 -> i64 only overflows far outside the calendar range `time` supports.
        Self(i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    /// Milliseconds since the Unix epoch.
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<OffsetDateTime> for BatchTimestamp {
    fn from(at: OffsetDateTime) -> Self {
        Self::from_datetime(at)
    }
}

impl fmt::Display for BatchTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully constructed request: URL plus negotiated headers. Doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    url: String,
    accept: &'static str,
}

impl RequestIdentity {
    /// Builds the identity for `batch` below the descriptor's report base URL.
    ///
    /// Identical inputs always yield byte-identical output.
    pub fn for_batch(descriptor: &ApplicationDescriptor, batch: BatchTimestamp) -> Self {
        let base = descriptor.report_base_url.as_str().trim_end_matches('/');
        Self {
            url: format!("{base}{EXPOSED_ENDPOINT}/{}", batch.as_millis()),
            accept: PROTOBUF_MEDIA_TYPE,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Value of the `Accept` header, always [`PROTOBUF_MEDIA_TYPE`].
    pub fn accept(&self) -> &str {
        self.accept
    }

    /// Header set sent with the request. The user agent is not part of the identity.
    pub fn headers(&self, user_agent: Option<&HeaderValue>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(self.accept));
        if let Some(agent) = user_agent {
            headers.insert(USER_AGENT, agent.clone());
        }
        headers
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
