//! HTTP transport for the exposee backend.
//!
//! [`ExposeeTransport`] performs exactly one exchange per call and reports
//! every obtained response, whatever its status. Classifying status codes,
//! checking clocks, and decoding belong to the client. The production
//! implementation wraps a reusable `reqwest::Client`; tests substitute
//! recording doubles behind the same trait.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, DATE, ETAG};
use reqwest::{Client, StatusCode};

use crate::config::ClientOptions;
use crate::error::{ClientError, TransportError};
use crate::request::RequestIdentity;

/// Status, headers, and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Value of the `ETag` header, if present and valid UTF-8.
    pub fn validator(&self) -> Option<&str> {
        header_str(&self.headers, ETAG.as_str())
    }

    /// Raw value of the `Date` header, if present and valid UTF-8.
    pub fn date(&self) -> Option<&str> {
        header_str(&self.headers, DATE.as_str())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Performs a single exchange for a request identity. No retries.
///
/// Implementations own their timeout policy; an exchange that produces no
/// response must surface as [`TransportError`].
#[async_trait]
pub trait ExposeeTransport: Send + Sync {
    async fn execute(&self, request: &RequestIdentity) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by `reqwest` with rustls TLS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: Option<HeaderValue>,
    allow_plaintext: bool,
}

impl HttpTransport {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(options.request_timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;
        // An agent string that is not a valid header value is dropped rather than sent mangled.
        let user_agent = HeaderValue::from_str(&options.user_agent).ok();
        if user_agent.is_none() {
            tracing::warn!(user_agent = %options.user_agent, "ignoring invalid user agent");
        }

        Ok(Self {
            client,
            user_agent,
            allow_plaintext: options.allow_plaintext,
        })
    }
}

#[async_trait]
impl ExposeeTransport for HttpTransport {
    async fn execute(&self, request: &RequestIdentity) -> Result<TransportResponse, TransportError> {
        let url = request.url();
        // Guard against accidentally polling a plaintext backend unless the caller opted in.
        if !self.allow_plaintext && url.starts_with("http://") {
            return Err(TransportError::InsecureUrl(url.to_string()));
        }

        let headers = request.headers(self.user_agent.as_ref());
        tracing::debug!(
            method = "GET",
            url = %url,
            headers = ?headers,
            "exposee HTTP request"
        );

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            method = "GET",
            url = %url,
            status = %status,
            content_length = body.len(),
            etag = header_str(&headers, ETAG.as_str()).unwrap_or("<none>"),
            "exposee HTTP response"
        );

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
