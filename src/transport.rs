/// HTTP transport used by [`LyticsApi`](crate::api::LyticsApi).
///
/// A transport performs exactly one round trip per [`Request`]. Connection
/// pooling, TLS and timeouts belong to the implementation; the API layer adds no
/// retries on top.
use std::future::Future;

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::config::LyticsConfig;
use crate::errors::LyticsError;

/// One outgoing request. Built per call and dropped afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Status and undecoded body of a completed round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a [`Request`] and returns the raw response.
///
/// Only failures to complete the round trip (DNS, TLS, connection, timeout) are
/// errors here; any HTTP status is a valid [`RawResponse`].
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<RawResponse, LyticsError>> + Send;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client honoring the configured timeout.
    pub fn new(config: &LyticsConfig) -> Result<Self, LyticsError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, LyticsError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            "transport.send status={} body_len={}",
            status,
            body.len()
        );
        Ok(RawResponse { status, body })
    }
}
