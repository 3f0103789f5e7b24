//! Panic capture for route handlers.
//!
//! While a handler future is being polled inside [`capturing`], the process
//! panic hook writes nothing: it stashes the panic location and backtrace in
//! a thread-local instead, and the terminal error handler puts them in the
//! `stack` field of its single `unhandled_error` line. Panics anywhere else
//! go to whichever hook was installed before.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Installs the capturing hook. Later calls are no-ops.
pub(crate) fn install_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if CAPTURING.get() {
                CAPTURED.set(Some(stack_of(info)));
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs `f` with panic capture enabled on this thread. The flag is reset on
/// every exit, unwinding included.
pub(crate) fn capturing<R>(f: impl FnOnce() -> R) -> R {
    struct Reset(bool);

    impl Drop for Reset {
        fn drop(&mut self) {
            CAPTURING.set(self.0);
        }
    }

    let _reset = Reset(CAPTURING.replace(true));
    f()
}

/// The stack recorded by the most recent captured panic on this thread.
pub(crate) fn take_captured() -> Option<String> {
    CAPTURED.take()
}

/// Message of a panic payload when it is a string.
pub(crate) fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

fn stack_of(info: &PanicHookInfo<'_>) -> String {
    let mut stack = match info.location() {
        Some(location) => format!("at {location}\n"),
        None => String::new(),
    };
    let bt = Backtrace::capture();
    if bt.status() == BacktraceStatus::Captured {
        stack.push_str(&bt.to_string());
    }
    stack
}
