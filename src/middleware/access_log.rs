//! Structured access log.
//!
//! [`AccessLog`] is a guard: create it when the request arrives, record the
//! final status once the response exists, and the line is written when the
//! guard drops. A request whose future is dropped before a status was
//! recorded (client went away mid-flight) writes nothing.

use std::time::Instant;

use http::header::USER_AGENT;
use http::{Method, StatusCode};
use tracing::info;

use crate::request::original_url;

pub(crate) struct AccessLog {
    method: Method,
    path: String,
    user_agent: String,
    started: Instant,
    status: Option<StatusCode>,
}

impl AccessLog {
    pub(crate) fn start<B>(req: &http::Request<B>) -> Self {
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        Self {
            method: req.method().clone(),
            path: original_url(req.uri()).to_owned(),
            user_agent,
            started: Instant::now(),
            status: None,
        }
    }

    pub(crate) fn record(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for AccessLog {
    fn drop(&mut self) {
        let Some(status) = self.status else { return };
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            duration_ms,
            user_agent = %self.user_agent,
            "http_request"
        );
    }
}
