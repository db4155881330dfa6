use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use std::time::{Duration, Instant};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sse::process_sse;
use crate::transport::{EventStream, Transport};
use crate::types::{Logs, ThinkRequest, ThinkResponse};

/// Where the Atlas development server listens by default.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001/";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the Atlas server.
#[derive(Debug, Clone)]
pub struct AtlasClient {
    client: ReqwestClient,
    base_url: Url,
    request_timeout: Duration,
}

impl AtlasClient {
    /// Create a new client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `request_timeout` bounds a whole `/think` round trip.  Streams are only bounded at
    /// connect time; per-event limits belong to the session.
    pub fn with_options(base_url: &str, request_timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = ReqwestClient::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            request_timeout: request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }

    /// The server this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL of `POST /think`.
    pub fn think_url(&self) -> Result<Url> {
        Ok(self.base_url.join("think")?)
    }

    /// The URL of `GET /chat-stream` for `message`, with the message URL-encoded.
    pub fn stream_url(&self, message: &str) -> Result<Url> {
        let mut url = self.base_url.join("chat-stream")?;
        url.query_pairs_mut().append_pair("message", message);
        Ok(url)
    }

    /// Create and return default headers for requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.request_timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    async fn post_think(&self, url: Url, message: &str) -> Result<ThinkResponse> {
        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .timeout(self.request_timeout)
            .json(&ThinkRequest::new(message))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let raw = response.json::<RawThinkResponse>().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(e)
            } else {
                Error::serialization(
                    format!("Failed to parse response: {e}"),
                    Some(Box::new(e)),
                )
            }
        })?;
        match (raw.answer, raw.error) {
            (_, Some(error)) => Err(Error::application(error)),
            (Some(answer), None) => Ok(ThinkResponse {
                answer,
                logs: raw.logs,
            }),
            (None, None) => Err(Error::serialization(
                "Response carries neither an answer nor an error",
                None,
            )),
        }
    }

    /// Process a non-success response and convert it to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        // The server reports failures as {"error": "..."}
        let error_message = serde_json::from_str::<ErrorBody>(&error_body)
            .map(|body| body.error)
            .unwrap_or(error_body);

        match status_code {
            400 => Error::bad_request(error_message),
            408 => Error::timeout(error_message, None),
            500 => Error::internal_server(error_message),
            _ => Error::api(status_code, error_message),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// A `/think` body: either an answer or an application error.
#[derive(Deserialize)]
struct RawThinkResponse {
    answer: Option<String>,
    #[serde(default)]
    logs: Logs,
    error: Option<String>,
}

#[async_trait::async_trait]
impl Transport for AtlasClient {
    async fn think(&self, message: &str) -> Result<ThinkResponse> {
        let url = self.think_url()?;
        let start = Instant::now();
        CLIENT_REQUESTS.click();

        let result = self.post_think(url, message).await;

        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            tracing::warn!(error = %err, "think request failed");
        }
        result
    }

    async fn open_stream(&self, message: &str) -> Result<EventStream> {
        let url = self.stream_url(message)?;
        CLIENT_REQUESTS.click();

        let mut headers = self.default_headers();
        headers.remove(header::CONTENT_TYPE);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_send_error(e)
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        tracing::debug!(url = %response.url(), "event stream opened");

        // Get the byte stream from the response
        let stream = response.bytes_stream();

        Ok(Box::pin(process_sse(stream)))
    }
}

/// Parse a server URL, making sure relative joins land under it.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::url(
            format!("{base_url} cannot be used as a server URL"),
            None,
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
