//! The request pipeline.
//!
//! ```text
//! request ─► access log guard ─┬─► body decode ──(reject)──► 413 / 400
//!                              ├─► CORS ──────(OPTIONS)───► 204 preflight
//!                              ├─► router ──(no match)────► 404 not_found
//!                              ├─► handler ─(Err / panic)─► 500 internal_error
//!                              └─► handler response
//! ```
//!
//! The access log guard wraps every branch, so each response the pipeline
//! produces is logged exactly once. CORS headers go on every response that
//! got past body decode.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::poll_fn;
use http::StatusCode;
use http::header::ORIGIN;
use http_body_util::Full;
use hyper::body::Body;
use serde_json::json;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::Fault;
use crate::middleware::access_log::AccessLog;
use crate::middleware::body::{self, BoxError, MAX_BODY_BYTES};
use crate::middleware::cors::Cors;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::unwind;

/// A route table bound to its configuration and middleware.
pub struct App {
    router: Router,
    config: Arc<Config>,
    cors: Cors,
}

impl App {
    pub fn new(config: Config, router: Router) -> Self {
        let cors = Cors::new(&config.cors_origin);
        Self { router, config: Arc::new(config), cors }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turns one request into exactly one response.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let mut log = AccessLog::start(&req);
        let response = self.process(req).await;
        log.record(response.status_code());
        response.into_inner()
    }

    async fn process<B>(&self, req: http::Request<B>) -> Response
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();

        let json = match body::decode(&parts.headers, body, MAX_BODY_BYTES).await {
            Ok(json) => json,
            Err(rejection) => {
                debug!(?rejection, path = %parts.uri, "request body rejected");
                return rejection.into_response();
            }
        };

        if Cors::is_preflight(&parts.method) {
            return self.cors.preflight(&parts.headers);
        }
        let origin = parts.headers.get(ORIGIN).cloned();

        let req = Request::new(parts, json, Arc::clone(&self.config));
        let mut response = self.route(req).await;
        self.cors.apply(origin.as_ref(), &mut response);
        response
    }

    async fn route(&self, req: Request) -> Response {
        let Some(handler) = self.router.lookup(req.method(), req.path()) else {
            return not_found(req.original_url());
        };

        // Capture is on only while the handler itself is being polled; other
        // tasks sharing this thread keep the normal panic hook.
        let mut call = handler.call(req);
        let outcome = AssertUnwindSafe(poll_fn(move |cx| unwind::capturing(|| call.as_mut().poll(cx))))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(fault)) => internal_error(&fault),
            Err(panic) => internal_error(&Fault::from_panic(panic)),
        }
    }
}

fn not_found(path: &str) -> Response {
    Response::value(StatusCode::NOT_FOUND, &json!({ "error": "not_found", "path": path }))
}

fn internal_error(fault: &Fault) -> Response {
    error!(error = %fault.message(), stack = %fault.stack(), "unhandled_error");
    Response::value(StatusCode::INTERNAL_SERVER_ERROR, &json!({ "error": "internal_error" }))
}
