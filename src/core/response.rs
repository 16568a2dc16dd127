//! Uniform JSON response envelope
//!
//! Every controller operation answers with the same shape:
//!
//! ```json
//! { "status": "Sucesso" | "Erro", "message": "...", ...operation specific fields }
//! ```
//!
//! The status is derived from the HTTP code and the message falls back to a
//! fixed phrase per code when neither the caller nor the data provide one.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

/// Status label for codes in `200..=299`
pub const STATUS_SUCCESS: &str = "Sucesso";

/// Status label for every other code
pub const STATUS_ERROR: &str = "Erro";

/// Message used for validation failures on create/update
pub const MESSAGE_INVALID_PARAMETERS: &str = "invalid parameters";

/// Message used when the store refuses a deletion
pub const MESSAGE_DELETE_FAILED: &str = "problem deleting object";

/// A response envelope: the HTTP code plus the JSON object body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    code: u16,
    body: Map<String, Value>,
}

impl ApiResponse {
    /// Build an envelope from a code, extra data and an optional message
    ///
    /// Message resolution order:
    /// 1. `message` when not empty
    /// 2. `data["message"]` when present and not empty
    /// 3. the default phrase for `code` (empty for unmapped codes)
    ///
    /// `status` and `message` are computed first; data keys with those names
    /// never overwrite them.
    pub fn build(code: u16, data: Map<String, Value>, message: &str) -> Self {
        let status = if is_success_code(code) {
            STATUS_SUCCESS
        } else {
            STATUS_ERROR
        };

        let message = if !message.is_empty() {
            message.to_string()
        } else {
            data.get("message")
                .and_then(message_from_value)
                .unwrap_or_else(|| default_message(code).to_string())
        };

        let mut body = Map::with_capacity(data.len() + 2);
        body.insert("status".to_string(), Value::String(status.to_string()));
        body.insert("message".to_string(), Value::String(message));

        for (key, value) in data {
            if key == "status" || key == "message" {
                continue;
            }
            body.insert(key, value);
        }

        Self { code, body }
    }

    /// Envelope with no extra data and the default message
    pub fn new(code: u16) -> Self {
        Self::build(code, Map::new(), "")
    }

    /// Envelope carrying `data`
    ///
    /// An object is merged into the body; any other value is placed
    /// under the `data` key.
    pub fn with_data(code: u16, data: Value) -> Self {
        Self::build(code, into_object(data), "")
    }

    /// Envelope with an explicit message and no data
    pub fn with_message(code: u16, message: &str) -> Self {
        Self::build(code, Map::new(), message)
    }

    /// The HTTP code of this envelope
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The HTTP status, falling back to 500 for codes axum cannot represent
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        is_success_code(self.code)
    }

    /// The `status` label ("Sucesso" or "Erro")
    pub fn status(&self) -> &str {
        self.body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or(STATUS_ERROR)
    }

    /// The resolved message
    pub fn message(&self) -> &str {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// A field of the body
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The complete JSON body
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consume the envelope and return its JSON body
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // serde_json writes non-ASCII characters verbatim
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => {
                let mut response = (status, bytes).into_response();
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                response
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response envelope");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Whether `code` lies in the success range `200..=299`
pub fn is_success_code(code: u16) -> bool {
    (200..=299).contains(&code)
}

/// The default phrase for an HTTP code, empty when the code is not mapped
pub fn default_message(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Error",
        504 => "Timeout",
        _ => "",
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn into_object(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    }
}
