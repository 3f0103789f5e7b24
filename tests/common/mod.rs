//! Shared helpers for the pipeline and server tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use cicd_backend::{App, Config, routes, telemetry};
use http_body_util::{BodyExt, Full};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink; one JSON value per written line.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| serde_json::from_str(l).expect("log line is JSON"))
            .collect()
    }

    /// Lines whose `message` is `tag`.
    pub fn tagged(&self, tag: &str) -> Vec<Value> {
        self.lines().into_iter().filter(|l| l["message"] == tag).collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer { self.clone() }
}

/// Stdout / stderr captures plus the guard keeping them installed on this
/// thread. `#[tokio::test]` runs on a current-thread runtime, so every
/// spawned task logs through them too.
pub struct Logs {
    pub out: Captured,
    pub err: Captured,
    _guard: tracing::subscriber::DefaultGuard,
}

pub fn capture_logs() -> Logs {
    let (out, err) = (Captured::default(), Captured::default());
    let subscriber = telemetry::subscriber(EnvFilter::new("info"), out.clone(), err.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    Logs { out, err, _guard: guard }
}

pub fn app_with(config: Config) -> App {
    let router = routes::router(&config).unwrap();
    App::new(config, router)
}

pub fn get(target: &str) -> http::Request<Full<Bytes>> {
    http::Request::get(target).body(Full::new(Bytes::new())).unwrap()
}

/// Runs one request through the pipeline; returns status, headers, JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &App, req: http::Request<Full<Bytes>>) -> (http::StatusCode, http::HeaderMap, Value) {
    let res = app.handle(req).await;
    let (parts, body) = res.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (parts.status, parts.headers, json)
}
