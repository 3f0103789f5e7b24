//! Structured logging setup.
//!
//! Every event is one JSON line with its fields flattened to the top level:
//!
//! ```json
//! {"timestamp":"…","level":"INFO","message":"http_request","method":"GET","path":"/health","status":200,"duration_ms":0,"user_agent":"curl/8.5.0","target":"cicd_backend::middleware::access_log"}
//! ```
//!
//! `ERROR` events go to stderr, everything else to stdout. The filter comes
//! from `RUST_LOG` and defaults to `info`.
//!
//! A panic inside a route handler is reported only through the JSON
//! `unhandled_error` line, with the panic location and backtrace in `stack`.

use tracing::{Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the process-wide subscriber writing to stdout / stderr, and the
/// panic hook.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(subscriber(filter, std::io::stdout, std::io::stderr))
        .unwrap_or_else(|e| eprintln!("logging already initialised: {e}"));
    install_panic_hook();
}

/// Silences the panic hook for panics raised by route handlers and keeps
/// their location and backtrace for the error log. Other panics reach the
/// previously installed hook. Idempotent.
pub fn install_panic_hook() {
    crate::unwind::install_hook();
}

/// JSON subscriber with `ERROR` events routed to `err` and the rest to `out`.
pub fn subscriber<O, E>(filter: EnvFilter, out: O, err: E) -> impl Subscriber + Send + Sync + 'static
where
    O: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_env_filter(filter)
        .with_writer(err.with_max_level(Level::ERROR).or_else(out))
        .finish()
}
