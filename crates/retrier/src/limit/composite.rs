// Composite limit handler (logical AND of its children)
use std::fmt;
use std::sync::Arc;

use crate::limit::{LimitDecision, LimitHandler};

/// Ordered chain of limit handlers that must all allow another attempt
///
/// `pre_exec` reaches every child. `handle_failure` stops at the first child
/// that aborts, so ordering only affects which limit is reported. An empty
/// composite never aborts.
#[derive(Debug, Clone, Default)]
pub struct CompositeLimitHandler {
    handlers: Vec<Arc<dyn LimitHandler>>,
}

impl CompositeLimitHandler {
    /// Combine handlers in evaluation order
    pub fn new(handlers: Vec<Arc<dyn LimitHandler>>) -> Self {
        Self { handlers }
    }

    /// Append a handler to the end of the chain
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn LimitHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of child handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain has no handlers
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl LimitHandler for CompositeLimitHandler {
    fn pre_exec(&self) {
        for handler in &self.handlers {
            handler.pre_exec();
        }
    }

    fn handle_failure(&self, error: &dyn fmt::Debug) -> LimitDecision {
        self.handlers
            .iter()
            .map(|handler| handler.handle_failure(error))
            .find(LimitDecision::is_abort)
            .unwrap_or(LimitDecision::Continue)
    }

    fn fresh(&self) -> Arc<dyn LimitHandler> {
        Arc::new(Self { handlers: self.handlers.iter().map(|handler| handler.fresh()).collect() })
    }
}

impl FromIterator<Arc<dyn LimitHandler>> for CompositeLimitHandler {
    fn from_iter<I: IntoIterator<Item = Arc<dyn LimitHandler>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
