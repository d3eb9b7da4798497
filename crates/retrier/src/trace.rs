//! Diagnostic trace hook.
//!
//! A [`Tracer`] receives a message *producer* rather than a message, so the
//! formatting cost is only paid when a tracer is attached. [`TraceHook`] is
//! the optional slot that the retrier and the limit handlers hold; it isolates
//! the retry loop from misbehaving tracers by catching panics.
//!
//! Panic containment relies on unwinding. A binary built with
//! `panic = "abort"` terminates on a tracer panic instead.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::TRACE_TARGET;

/// Sink for lazily-formatted diagnostic messages
///
/// Implementations should not panic. [`TraceHook`] catches panics only when
/// the final binary uses `panic = "unwind"`.
pub trait Tracer: Send + Sync {
    /// Receive a message; call `message()` to render it
    fn trace(&self, message: &dyn Fn() -> String);
}

/// Tracer that forwards messages to the `tracing` subscriber at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&self, message: &dyn Fn() -> String) {
        debug!(target: TRACE_TARGET, "{}", message());
    }
}

/// Tracer backed by a closure receiving the rendered message
pub struct FnTracer<F>(F);

impl<F> FnTracer<F>
where
    F: Fn(String) + Send + Sync,
{
    /// Wrap a closure as a tracer
    pub fn new(sink: F) -> Self {
        Self(sink)
    }
}

impl<F> Tracer for FnTracer<F>
where
    F: Fn(String) + Send + Sync,
{
    fn trace(&self, message: &dyn Fn() -> String) {
        (self.0)(message());
    }
}

impl<F> fmt::Debug for FnTracer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTracer(<function>)")
    }
}

/// Optional tracer slot shared by the retrier and its limit handlers
#[derive(Clone, Default)]
pub struct TraceHook {
    tracer: Option<Arc<dyn Tracer>>,
}

impl TraceHook {
    /// A hook with no tracer attached
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A hook forwarding to `tracer`
    pub fn new(tracer: Arc<dyn Tracer>) -> Self {
        Self { tracer: Some(tracer) }
    }

    /// Build from an optional tracer
    pub fn from_option(tracer: Option<Arc<dyn Tracer>>) -> Self {
        Self { tracer }
    }

    /// Whether a tracer is attached
    pub fn is_enabled(&self) -> bool {
        self.tracer.is_some()
    }

    /// Emit a message; `message` is never called when no tracer is attached
    ///
    /// A panicking tracer is logged and otherwise ignored, provided the
    /// binary unwinds on panic.
    pub fn trace<F>(&self, message: F)
    where
        F: Fn() -> String,
    {
        let Some(tracer) = self.tracer.as_ref() else {
            return;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tracer.trace(&message)));
        if outcome.is_err() {
            warn!("Tracer panicked while handling a retry trace message; ignoring");
        }
    }
}

impl fmt::Debug for TraceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceHook").field("enabled", &self.is_enabled()).finish()
    }
}
