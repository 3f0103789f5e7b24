//! # cicd-training-backend
//!
//! The demo backend for a CI/CD course: a health check, a build-info
//! endpoint and a random-quote endpoint, served as JSON over HTTP.
//!
//! There is no database and no shared mutable state. The interesting part is
//! the request pipeline in [`App`]: body decode with a size limit, CORS,
//! a structured access log, exact-match routing, a JSON 404 and a terminal
//! error handler that turns handler errors and panics into a generic 500.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cicd_backend::{App, Config, Server, routes, telemetry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cicd_backend::Error> {
//!     telemetry::init();
//!
//!     let config = Config::from_env()?;
//!     let router = routes::router(&config)?;
//!     let server = Server::bind(config.addr()).await?;
//!
//!     server.serve(App::new(config, router)).await
//! }
//! ```

mod app;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod unwind;

pub mod config;
pub mod health;
pub mod middleware;
pub mod quote;
pub mod routes;
pub mod telemetry;

pub use app::App;
pub use config::{Config, CorsOrigin};
pub use error::{Error, Fault};
pub use handler::{Handler, IntoOutcome};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

/// Current UTC time as RFC 3339 with milliseconds and a `Z` suffix, e.g.
/// `2026-10-18T09:30:00.000Z`.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
