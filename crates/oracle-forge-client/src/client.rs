//! HTTP gateway client for the Oracle Forge API.

use crate::envelope::{self, Envelope, ResponseBody};
use crate::error::Error;
use crate::types::{Blob, FilePayload, Query, prune_empty};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};


/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable that selects the backend origin.
pub const BASE_URL_ENV: &str = "ORACLE_FORGE_API_URL";

/// Characters left unescaped in a path segment (RFC 3986 unreserved set).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes one user-supplied path segment.
#[must_use]
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:5000").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra headers attached to every request.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the base URL taken from
    /// `ORACLE_FORGE_API_URL` when set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            ..Default::default()
        }
    }
}

/// Request body after serialization.
#[derive(Debug)]
enum Payload {
    None,
    Json(Value),
    File(FilePayload),
}

/// HTTP gateway client for the Oracle Forge API.
///
/// Stateless between calls: each call builds its own request and the
/// underlying connection pool is shared by clones. A clone made with
/// [`GatewayClient::with_cancellation`] settles every call it issues as
/// [`Error::Cancelled`] once its token fires.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    cancel: Option<CancellationToken>,
}

impl GatewayClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid, a header cannot be encoded,
    /// or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::InvalidRequest(format!("header {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::InvalidRequest(format!("header {name}: {err}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("oracle-forge-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|err| Error::InvalidRequest(format!("HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            cancel: None,
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Creates a client pointed at `ORACLE_FORGE_API_URL`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env())
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a handle whose calls are abandoned once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            cancel: Some(token),
        }
    }

    /// Builds the absolute URL for a backend-relative path.
    #[must_use]
    pub fn url(&self, path: &str, query: Option<&Query>) -> String {
        let mut url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&q.encode());
        }
        url
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Issues a read.
    ///
    /// # Errors
    /// Returns error on transport failure, rate limiting or cancellation.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&Query>,
    ) -> Result<Envelope<T>, Error> {
        self.exchange(Method::GET, path, query, Payload::None).await
    }

    /// Issues a create or action with an optional JSON body.
    ///
    /// # Errors
    /// Returns error if the body cannot be serialized, or on transport
    /// failure, rate limiting or cancellation.
    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<Envelope<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = match body {
            Some(body) => Payload::Json(to_json(body)?),
            None => Payload::None,
        };
        self.exchange(Method::POST, path, None, payload).await
    }

    /// Uploads a file as `multipart/form-data` with a single `file` part.
    ///
    /// # Errors
    /// Returns error if the part cannot be built, or on transport failure,
    /// rate limiting or cancellation.
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file: FilePayload,
    ) -> Result<Envelope<T>, Error> {
        self.exchange(Method::POST, path, None, Payload::File(file))
            .await
    }

    /// Issues a full or partial update with a JSON body.
    ///
    /// # Errors
    /// Returns error if the body cannot be serialized, or on transport
    /// failure, rate limiting or cancellation.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = Payload::Json(to_json(body)?);
        self.exchange(Method::PUT, path, None, payload).await
    }

    /// Issues a deletion.
    ///
    /// # Errors
    /// Returns error on transport failure, rate limiting or cancellation.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, Error> {
        self.exchange(Method::DELETE, path, None, Payload::None)
            .await
    }

    /// Checks whether a resource exists. True iff the server answers 200;
    /// the response body is never read.
    ///
    /// # Errors
    /// Returns error on transport failure, rate limiting or cancellation.
    pub async fn head(&self, path: &str) -> Result<bool, Error> {
        let url = self.url(path, None);
        self.guard(async {
            let resp = self.dispatch(Method::HEAD, &url, Payload::None).await?;
            Ok(resp.status() == StatusCode::OK)
        })
        .await
    }

    /// Downloads a file-serving route as raw bytes.
    ///
    /// # Errors
    /// Returns error on transport failure, rate limiting or cancellation.
    pub async fn get_blob(&self, path: &str) -> Result<Envelope<Blob>, Error> {
        let url = self.url(path, None);
        self.guard(async {
            let resp = self.dispatch(Method::GET, &url, Payload::None).await?;
            let status = resp.status();
            let content_type = content_type(&resp);
            let bytes = resp.bytes().await?;
            debug!(status = status.as_u16(), len = bytes.len(), "blob received");
            Ok(envelope::decode_blob(status, content_type, bytes.to_vec()))
        })
        .await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    async fn exchange<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        payload: Payload,
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(path, query);
        self.guard(async {
            let resp = self.dispatch(method, &url, payload).await?;
            let (status, body) = read_body(resp).await?;
            Ok(envelope::decode(status, body))
        })
        .await
    }

    /// Races a call against the cancellation token, if any.
    async fn guard<R>(&self, call: impl Future<Output = Result<R, Error>>) -> Result<R, Error> {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("request cancelled by caller");
                        Err(Error::Cancelled)
                    }
                    result = call => result,
                }
            }
            None => call.await,
        }
    }

    async fn dispatch(&self, method: Method, url: &str, payload: Payload) -> Result<Response, Error> {
        debug!(method = %method, url, "dispatching request");

        let builder = self.client.request(method.clone(), url);
        let builder = match payload {
            Payload::None => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::File(file) => builder.multipart(file_form(file)?),
        };

        let resp = builder.send().await.map_err(|err| {
            warn!(method = %method, url, error = %err, "transport failure");
            Error::Transport(err)
        })?;

        let status = resp.status();
        debug!(method = %method, url, status = status.as_u16(), "response received");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            warn!(url, retry_after = ?retry_after, "rate limited");
            return Err(Error::RateLimited { retry_after });
        }

        Ok(resp)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, Error> {
    serde_json::to_value(body)
        .map(prune_empty)
        .map_err(|err| Error::InvalidRequest(format!("body serialization failed: {err}")))
}

fn file_form(file: FilePayload) -> Result<Form, Error> {
    let mut part = Part::bytes(file.bytes).file_name(file.file_name);
    if let Some(mime) = file.content_type {
        part = part
            .mime_str(&mime)
            .map_err(|err| Error::InvalidRequest(format!("file content type {mime}: {err}")))?;
    }
    Ok(Form::new().part("file", part))
}

fn content_type(resp: &Response) -> Option<String> {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn read_body(resp: Response) -> Result<(StatusCode, ResponseBody), Error> {
    let status = resp.status();
    let content_type = content_type(&resp);
    let bytes = resp.bytes().await?;
    Ok((status, ResponseBody::parse(content_type.as_deref(), &bytes)))
}
