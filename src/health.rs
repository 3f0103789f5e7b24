//! Health-check handler.
//!
//! `GET /health` has no dependencies to consult: if the process can answer
//! HTTP at all, it reports `"ok"`. Load balancers and the CI smoke test poll
//! it after each deploy.
//!
//! ```json
//! {"status":"ok","service":"backend","env":"local","time":"2026-10-18T09:30:00.000Z"}
//! ```

use serde::Serialize;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

#[derive(Serialize)]
struct Health<'a> {
    status: &'static str,
    service: &'static str,
    env: &'a str,
    time: String,
}

/// Liveness handler. Always `200 OK`.
pub async fn health(req: Request) -> Result<Response, Error> {
    Response::json(&Health {
        status: "ok",
        service: "backend",
        env: &req.config().env,
        time: crate::timestamp(),
    })
}
