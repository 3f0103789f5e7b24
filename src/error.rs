//! Error types.
//!
//! [`Error`] covers infrastructure failures: binding a socket, reading the
//! environment, registering a route, serialising a body. [`Fault`] is what the
//! terminal error handler sees when a route handler fails at request time.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::{self, Write as _};

use crate::unwind;

/// The error type returned by the backend's fallible operations.
///
/// Request-level outcomes (404, 413, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value {value:?} for {var}")]
    Config { var: &'static str, value: String },

    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// An unhandled failure raised inside a route handler.
///
/// Anything implementing [`std::error::Error`] converts into a `Fault` with
/// `?`, so handlers can return `Result<Response, E>` for their own error
/// types. Panics are caught by the pipeline and converted as well.
///
/// `Fault` must not implement `std::error::Error`: the blanket `From` impl
/// would overlap with the reflexive `From<T> for T`.
pub struct Fault {
    message: String,
    stack: String,
}

impl Fault {
    /// A fault with a plain message. Captures a backtrace when
    /// `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE` enable it.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack: captured_backtrace() }
    }

    /// A fault for a caught panic. The stack is the location and backtrace
    /// the panic hook stashed on this thread, or empty when the hook is not
    /// installed.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match unwind::payload_message(&*payload) {
            Some(s) => format!("handler panicked: {s}"),
            None => "handler panicked".to_owned(),
        };
        Self { message, stack: unwind::take_captured().unwrap_or_default() }
    }

    pub fn message(&self) -> &str { &self.message }

    /// Error source chain followed by the backtrace, if any. May be empty.
    pub fn stack(&self) -> &str { &self.stack }
}

impl<E> From<E> for Fault
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let mut stack = String::new();
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stack, "caused by: {cause}");
            source = cause.source();
        }
        stack.push_str(&captured_backtrace());
        Self { message: err.to_string(), stack }
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault").field("message", &self.message).finish_non_exhaustive()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn captured_backtrace() -> String {
    let bt = Backtrace::capture();
    match bt.status() {
        BacktraceStatus::Captured => bt.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn fault_from_error_keeps_message_and_sources() {
        let inner = std::io::Error::other("disk on fire");
        let fault = Fault::from(Outer(inner));
        assert_eq!(fault.message(), "outer");
        assert!(fault.stack().starts_with("caused by: disk on fire"));
    }

    #[test]
    fn fault_from_panic_payloads() {
        let fault = Fault::from_panic(Box::new("boom"));
        assert_eq!(fault.message(), "handler panicked: boom");

        let fault = Fault::from_panic(Box::new(String::from("kaboom")));
        assert_eq!(fault.message(), "handler panicked: kaboom");

        let fault = Fault::from_panic(Box::new(42_u8));
        assert_eq!(fault.message(), "handler panicked");
    }

    #[test]
    fn fault_from_panic_takes_the_captured_stack() {
        unwind::install_hook();

        let payload = unwind::capturing(|| std::panic::catch_unwind(|| panic!("boom"))).unwrap_err();
        let fault = Fault::from_panic(payload);

        assert_eq!(fault.message(), "handler panicked: boom");
        assert!(fault.stack().starts_with("at "), "{}", fault.stack());
        assert!(fault.stack().contains("error.rs"), "{}", fault.stack());
    }

    #[test]
    fn config_error_names_the_variable() {
        let err = Error::Config { var: "PORT", value: "abc".into() };
        assert_eq!(err.to_string(), r#"invalid value "abc" for PORT"#);
    }
}
