//! Incoming HTTP request type, as handlers see it.

use std::sync::Arc;

use http::{HeaderMap, Method, Uri};
use serde_json::Value;

use crate::config::Config;

/// A request that has passed the body-decode stage.
///
/// A JSON body is already parsed; other bodies have been read and dropped.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) json: Option<Value>,
    pub(crate) config: Arc<Config>,
}

impl Request {
    pub(crate) fn new(
        parts: http::request::Parts,
        json: Option<Value>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            json,
            config,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The request target as the client sent it: path plus query string.
    pub fn original_url(&self) -> &str {
        original_url(&self.uri)
    }

    /// Parsed JSON body, if the request carried one.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Process configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

pub(crate) fn original_url(uri: &Uri) -> &str {
    uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
}
