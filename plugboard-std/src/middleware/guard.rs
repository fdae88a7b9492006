//! Short-circuiting guard middleware.

use plugboard_core::{BoxError, Middleware, Next};

/// Continues the chain only while a predicate holds.
///
/// When the predicate fails, the rest of the chain is skipped and the data is
/// returned as it arrived.
pub struct GuardMiddleware<P> {
    predicate: P,
}

impl<P> GuardMiddleware<P> {
    /// Create a guard that lets data through while `predicate` returns `true`.
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<T, P> Middleware<T> for GuardMiddleware<P>
where
    T: 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        if (self.predicate)(&data) {
            next.run(data)
        } else {
            tracing::debug!(skipped = next.remaining(), "guard stopped pipeline");
            Ok(data)
        }
    }
}
