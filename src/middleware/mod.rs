//! Cross-cutting request stages.
//!
//! [`App::handle`](crate::App::handle) runs them in this order:
//!
//! 1. [`body`] — buffer under a 256 KiB limit, parse JSON
//! 2. [`cors`] — allow-origin headers, preflight short-circuit
//! 3. `access_log` — one `http_request` line per completed request
//!
//! then routing, the 404 fallback and the terminal error handler.

pub(crate) mod access_log;
pub mod body;
pub mod cors;
