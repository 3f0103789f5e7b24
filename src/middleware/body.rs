//! Body decode stage.
//!
//! Buffers the request body under a hard size limit and parses it when the
//! content type says JSON. Nothing that fails here reaches a route.
//!
//! Rejections are client errors and deliberately answer 413 or 400, never
//! the generic 500 of the terminal error handler.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde_json::{Value, json};

use crate::response::Response;

/// Largest accepted request body: 256 KiB.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a body was refused.
#[derive(Debug)]
pub enum Rejection {
    /// Declared or actual length above the limit.
    TooLarge,
    /// JSON content type, but the bytes are not a JSON object or array.
    InvalidJson(String),
    /// The body stream itself failed (client reset, protocol error).
    Read(String),
}

impl Rejection {
    pub(crate) fn into_response(self) -> Response {
        let (status, tag) = match self {
            Self::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Self::InvalidJson(_) => (StatusCode::BAD_REQUEST, "invalid_json"),
            Self::Read(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        Response::value(status, &json!({ "error": tag }))
    }
}

/// Buffers the whole body and returns its JSON value when the content type is
/// JSON and the body is not empty. Other bodies are read and discarded.
pub(crate) async fn decode<B>(headers: &HeaderMap, body: B, limit: usize) -> Result<Option<Value>, Rejection>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if declared_length(headers).is_some_and(|len| len > limit as u64) {
        return Err(Rejection::TooLarge);
    }

    let bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                Rejection::TooLarge
            } else {
                Rejection::Read(e.to_string())
            }
        })?
        .to_bytes();

    if is_json(headers) && !bytes.is_empty() {
        parse_strict(&bytes).map(Some)
    } else {
        Ok(None)
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

/// `application/json`, any parameters, any case.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// Only objects and arrays are accepted at the top level.
fn parse_strict(bytes: &[u8]) -> Result<Value, Rejection> {
    let first = bytes.iter().find(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    if !matches!(first, Some(b'{' | b'[')) {
        return Err(Rejection::InvalidJson("top-level value must be an object or array".to_owned()));
    }
    serde_json::from_slice(bytes).map_err(|e| Rejection::InvalidJson(e.to_string()))
}
