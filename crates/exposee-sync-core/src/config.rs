//! Application descriptor and client tunables.
//!
//! [`ApplicationDescriptor`] is supplied by the host application and only
//! read here. [`ClientOptions`] carries the knobs owned by the surrounding
//! system (clock-skew threshold, transport timeout, TLS policy) and can be
//! derived from the process environment.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use reqwest::Url;

/// Environment variable overriding the clock-skew threshold, in seconds.
const ENV_TIME_SHIFT_THRESHOLD: &str = "EXPOSEE_SYNC_TIME_SHIFT_THRESHOLD_SECS";
/// Environment variable overriding the transport timeout, in seconds.
const ENV_REQUEST_TIMEOUT: &str = "EXPOSEE_SYNC_REQUEST_TIMEOUT_SECS";
/// Environment variable allowing plaintext (HTTP) backends.
const ENV_ALLOW_PLAINTEXT: &str = "EXPOSEE_SYNC_ALLOW_PLAINTEXT";
/// Environment variable disabling TLS certificate validation.
const ENV_NO_TLS_VALIDATION: &str = "EXPOSEE_SYNC_NO_TLS_VALIDATION";
/// Environment variable overriding the user agent.
const ENV_USER_AGENT: &str = "EXPOSEE_SYNC_USER_AGENT";

/// Maximum tolerated difference between server and local time.
pub const DEFAULT_TIME_SHIFT_THRESHOLD: Duration = Duration::from_secs(2 * 60 * 60);
/// Timeout applied by the HTTP transport to a single exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint configuration of one exposure-notification application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    /// Application identifier (reverse-DNS style).
    pub app_id: String,
    /// Human-readable description.
    pub description: String,
    /// Public key reserved for future payload verification.
    pub jwt_public_key: Option<Vec<u8>>,
    /// Base URL of the bucket service.
    pub bucket_base_url: Url,
    /// Base URL for reporting; exposed batches are retrieved below it.
    pub report_base_url: Url,
    /// Contact string published by the operator.
    pub contact: String,
}

/// Tunables for [`ExposeeServiceClient`](crate::client::ExposeeServiceClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Responses whose `Date` deviates from local time by more than this are rejected.
    pub time_shift_threshold: Duration,
    /// Timeout enforced by the HTTP transport.
    pub request_timeout: Duration,
    /// Whether plaintext (HTTP) endpoints are allowed.
    pub allow_plaintext: bool,
    /// Whether TLS certificate validation should be skipped.
    pub accept_invalid_certs: bool,
    /// Value of the `User-Agent` request header.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            time_shift_threshold: DEFAULT_TIME_SHIFT_THRESHOLD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            allow_plaintext: false,
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientOptions {
    /// Builds options from the current process environment.
    pub fn from_os_env() -> Self {
        Self::from_env_iter(env::vars())
    }

    /// Builds options from an iterator of key/value pairs (typically for tests).
    pub fn from_env_iter<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let defaults = Self::default();

        let time_shift_threshold = parse_secs(map.get(ENV_TIME_SHIFT_THRESHOLD))
            .unwrap_or(defaults.time_shift_threshold);
        // A zero timeout would fail every exchange immediately.
        let request_timeout = parse_secs(map.get(ENV_REQUEST_TIMEOUT))
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(defaults.request_timeout);
        let allow_plaintext = parse_bool(
            map.get(ENV_ALLOW_PLAINTEXT).map(String::as_str),
            defaults.allow_plaintext,
        );
        let accept_invalid_certs = parse_bool(
            map.get(ENV_NO_TLS_VALIDATION).map(String::as_str),
            defaults.accept_invalid_certs,
        );
        let user_agent = map
            .get(ENV_USER_AGENT)
            .and_then(|value| sanitize_non_empty(value))
            .unwrap_or(defaults.user_agent);

        Self {
            time_shift_threshold,
            request_timeout,
            allow_plaintext,
            accept_invalid_certs,
            user_agent,
        }
    }
}

fn default_user_agent() -> String {
    format!("exposee-sync/{}", env!("CARGO_PKG_VERSION"))
}

/// Parses a whole number of seconds, ignoring blanks and garbage.
fn parse_secs(value: Option<&String>) -> Option<Duration> {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn sanitize_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses boolean values from strings, falling back to the provided default.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|s| s.trim().to_ascii_lowercase()) {
        Some(ref v) if ["1", "true", "t", "yes", "y"].contains(&v.as_str()) => true,
        Some(ref v) if ["0", "false", "f", "no", "n"].contains(&v.as_str()) => false,
        _ => default,
    }
}
