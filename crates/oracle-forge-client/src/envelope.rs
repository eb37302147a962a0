//! The `{success, data, error, message}` response envelope and the single
//! generic transform that turns any backend response into one.

use crate::error::Error;
use crate::types::Blob;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;


/// Message used when a JSON response could not be parsed.
pub const MALFORMED_JSON: &str = "Malformed JSON in response body";

/// Message used when a payload does not match the type requested by the caller.
pub const UNEXPECTED_PAYLOAD: &str = "Unexpected response payload";

/// Wire-level wrapper every backend response is normalized into.
///
/// Exactly one of `data` / `error` carries the operative content: `data`
/// when `success` is true, `error` when it is false. Branch on `success`
/// before touching `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// True only if the request fully succeeded.
    pub success: bool,
    /// Payload, present when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable failure message, present when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional secondary note, present on either outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code, when the backend sent a structured error.
    #[serde(skip)]
    pub error_code: Option<String>,
    /// HTTP status the envelope arrived with.
    #[serde(skip)]
    pub status: u16,
}

impl<T> Envelope<T> {
    /// Creates a successful envelope.
    #[must_use]
    pub fn success(status: u16, data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            error_code: None,
            status,
        }
    }

    /// Creates a failed envelope.
    #[must_use]
    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            error_code: None,
            status,
        }
    }

    /// Attaches the secondary message.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Returns true if the request fully succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the payload of a successful envelope.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        if self.success { self.data.as_ref() } else { None }
    }

    /// Returns the failure message of a failed envelope.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        if self.success { None } else { self.error.as_deref() }
    }

    /// Maps the payload, keeping the outcome and messages.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            message: self.message,
            error_code: self.error_code,
            status: self.status,
        }
    }

    /// Converts the envelope into a `Result`, turning a failure into
    /// [`Error::Application`].
    ///
    /// # Errors
    /// Returns [`Error::Application`] if `success` is false or no payload is
    /// present.
    pub fn into_result(self) -> Result<T, Error> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Error::Application {
                status: self.status,
                message: "response carried no data".to_string(),
            }),
            (false, _) => Err(Error::Application {
                status: self.status,
                message: self
                    .error
                    .unwrap_or_else(|| fallback_message(self.status)),
            }),
        }
    }
}

// ============================================================================
// Response decoding
// ============================================================================

/// A response body after content-type negotiation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResponseBody {
    /// Zero-length body.
    Empty,
    /// Parsed JSON document.
    Json(Value),
    /// Non-JSON body returned verbatim.
    Text(String),
    /// Claimed `application/json` but failed to parse.
    Malformed(String),
}

impl ResponseBody {
    /// Negotiates a body from its content type: JSON is parsed, anything else
    /// is kept as text.
    pub(crate) fn parse(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        if is_json(content_type) {
            match serde_json::from_slice(bytes) {
                Ok(value) => Self::Json(value),
                Err(err) => Self::Malformed(err.to_string()),
            }
        } else {
            Self::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Returns true if the content type names a JSON body.
pub(crate) fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

/// Turns any response into an envelope of `T`.
///
/// Non-2xx statuses always yield a failed envelope. Bodies without a boolean
/// `success` key are treated as bare payloads.
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: ResponseBody) -> Envelope<T> {
    let code = status.as_u16();
    match body {
        ResponseBody::Empty if status.is_success() => payload(code, Value::Null, None),
        ResponseBody::Json(Value::Object(map)) if is_envelope(&map) => decode_envelope(status, map),
        ResponseBody::Json(value) if status.is_success() => payload(code, value, None),
        ResponseBody::Json(Value::Object(map)) => failure_from(status, map),
        ResponseBody::Text(text) if status.is_success() => payload(code, Value::String(text), None),
        ResponseBody::Malformed(reason) if status.is_success() => {
            debug!(status = code, %reason, "response claimed JSON but failed to parse");
            Envelope::failure(code, MALFORMED_JSON)
        }
        _ => Envelope::failure(code, status_message(status)),
    }
}

/// Turns a file-route response into a blob envelope. Successful bodies are
/// passed through byte for byte.
pub(crate) fn decode_blob(
    status: StatusCode,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> Envelope<Blob> {
    if status.is_success() {
        return Envelope::success(status.as_u16(), Blob::new(content_type, bytes));
    }
    let body = ResponseBody::parse(content_type.as_deref(), &bytes);
    decode::<Value>(status, body).map(|_| Blob::default())
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.get("success").is_some_and(Value::is_boolean)
}

fn decode_envelope<T: DeserializeOwned>(status: StatusCode, mut map: Map<String, Value>) -> Envelope<T> {
    let succeeded = map.get("success").and_then(Value::as_bool).unwrap_or(false);
    if succeeded && status.is_success() {
        let message = map.remove("message").and_then(non_empty);
        let data = map.remove("data").unwrap_or(Value::Null);
        return payload(status.as_u16(), data, message);
    }
    failure_from(status, map)
}

fn payload<T: DeserializeOwned>(status: u16, value: Value, message: Option<String>) -> Envelope<T> {
    match serde_json::from_value(value) {
        Ok(data) => Envelope::success(status, data).with_message(message),
        Err(err) => {
            debug!(status, error = %err, "payload did not match the requested type");
            Envelope::failure(status, format!("{UNEXPECTED_PAYLOAD}: {err}")).with_message(message)
        }
    }
}

fn failure_from<T>(status: StatusCode, mut map: Map<String, Value>) -> Envelope<T> {
    let message = map.remove("message").and_then(non_empty);
    let (error, error_code) = match map.remove("error") {
        Some(Value::String(text)) => (non_empty(Value::String(text)), None),
        Some(Value::Object(mut detail)) => (
            detail.remove("message").and_then(non_empty),
            detail.remove("code").and_then(non_empty),
        ),
        _ => (None, None),
    };
    let error = error
        .or_else(|| message.clone())
        .unwrap_or_else(|| fallback_message(status.as_u16()));

    let mut envelope = Envelope::failure(status.as_u16(), error).with_message(message);
    envelope.error_code = error_code;
    envelope
}

fn non_empty(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

/// Formats the `HTTP <status>: <reason>` fallback message.
pub(crate) fn status_message(status: StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}

fn fallback_message(status: u16) -> String {
    match StatusCode::from_u16(status) {
        Ok(code) if !code.is_success() => status_message(code),
        _ => "Request failed".to_string(),
    }
}
