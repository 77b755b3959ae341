//! Internal diagnostics channel
//!
//! Reports problems inside the logging machinery itself (appending to a
//! closed appender, unsupported encodings, failed closes) on stderr. It is
//! always available, never panics and never hands an error back to the
//! caller, so it is safe to use from any append path.
//!
//! Debug output is disabled unless [`set_internal_debugging`] is called or the
//! [`DEBUG_ENV`] environment variable is set to `true`. Quiet mode silences
//! everything.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Environment variable enabling internal debug output.
pub const DEBUG_ENV: &str = "RUST_LOG_HIERARCHY_DEBUG";

const DEBUG_UNSET: u8 = 0;
const DEBUG_OFF: u8 = 1;
const DEBUG_ON: u8 = 2;

static DEBUG_STATE: AtomicU8 = AtomicU8::new(DEBUG_UNSET);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_internal_debugging(enabled: bool) {
    DEBUG_STATE.store(if enabled { DEBUG_ON } else { DEBUG_OFF }, Ordering::Relaxed);
}

pub fn set_quiet_mode(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    match DEBUG_STATE.load(Ordering::Relaxed) {
        DEBUG_ON => true,
        DEBUG_OFF => false,
        _ => {
            let enabled = std::env::var(DEBUG_ENV)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false);
            // Lose the race gracefully if an explicit setting landed meanwhile.
            let _ = DEBUG_STATE.compare_exchange(
                DEBUG_UNSET,
                if enabled { DEBUG_ON } else { DEBUG_OFF },
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
            DEBUG_STATE.load(Ordering::Relaxed) == DEBUG_ON
        }
    }
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Writes one line to stderr. A closed or broken stderr is ignored.
fn emit(prefix: &str, args: fmt::Arguments<'_>) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{prefix} {args}");
}

pub fn debug(message: impl AsRef<str>) {
    if is_debug_enabled() && !is_quiet() {
        emit("[LOGGER DEBUG]", format_args!("{}", message.as_ref()));
    }
}

pub fn warn(message: impl AsRef<str>) {
    if !is_quiet() {
        emit("[LOGGER WARNING]", format_args!("{}", message.as_ref()));
    }
}

pub fn error(message: impl AsRef<str>) {
    if !is_quiet() {
        emit("[LOGGER ERROR]", format_args!("{}", message.as_ref()));
    }
}

pub fn error_with(message: impl AsRef<str>, cause: &dyn std::error::Error) {
    if !is_quiet() {
        emit("[LOGGER ERROR]", format_args!("{}: {}", message.as_ref(), cause));
    }
}
