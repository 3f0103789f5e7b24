//! CORS stage.
//!
//! Adds allow-origin headers; never refuses a request. An origin that does
//! not match the configured one just doesn't get a header it could use, and
//! the browser does the rest.
//!
//! `OPTIONS` requests are preflights and are answered here with
//! `204 No Content` without reaching the router.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, HeaderValue, ORIGIN, VARY,
};
use http::{HeaderMap, StatusCode};
use tracing::warn;

use crate::config::CorsOrigin;
use crate::response::Response;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Resolved CORS policy.
pub struct Cors {
    policy: Policy,
}

enum Policy {
    Reflect,
    Fixed(Option<HeaderValue>),
}

impl Cors {
    pub fn new(origin: &CorsOrigin) -> Self {
        let policy = match origin {
            CorsOrigin::Any => Policy::Reflect,
            CorsOrigin::Exact(value) => {
                let header = HeaderValue::from_str(value).ok();
                if header.is_none() {
                    warn!(origin = %value, "CORS_ORIGIN is not a valid header value, allow-origin will be omitted");
                }
                Policy::Fixed(header)
            }
        };
        Self { policy }
    }

    /// Whether this request is a preflight the CORS stage answers itself.
    pub(crate) fn is_preflight(method: &http::Method) -> bool {
        *method == http::Method::OPTIONS
    }

    /// The complete response to a preflight request.
    pub(crate) fn preflight(&self, request_headers: &HeaderMap) -> Response {
        let mut res = Response::builder().status(StatusCode::NO_CONTENT).no_body();
        self.apply(request_headers.get(ORIGIN), &mut res);

        let headers = res.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
        }
        res
    }

    /// Adds the allow-origin header (when there is one to add) and
    /// `Vary: Origin`.
    pub(crate) fn apply(&self, origin: Option<&HeaderValue>, res: &mut Response) {
        let allow = match &self.policy {
            Policy::Reflect => origin.cloned(),
            Policy::Fixed(value) => value.clone(),
        };
        let headers = res.headers_mut();
        if let Some(allow) = allow {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow);
        }
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}
