//! Span-based middleware.

use plugboard_core::{BoxError, Middleware, Next};
use std::fmt::Debug;

/// Runs the rest of the chain inside an `info` span.
///
/// The data is logged at debug level on the way in and on the way out; an
/// error from later middleware is logged at warn level and passed on.
#[derive(Debug, Clone)]
pub struct TracingMiddleware {
    name: String,
}

impl TracingMiddleware {
    /// Create a tracing middleware whose span is tagged with `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<T: Debug + 'static> Middleware<T> for TracingMiddleware {
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        let span = tracing::info_span!(
            "middleware",
            name = %self.name,
            remaining = next.remaining()
        );
        let _enter = span.enter();

        tracing::debug!(?data, "pipeline input");
        let result = next.run(data);
        match &result {
            Ok(data) => tracing::debug!(?data, "pipeline output"),
            Err(err) => tracing::warn!(%err, "pipeline failed"),
        }
        result
    }
}
