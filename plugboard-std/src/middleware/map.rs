//! Map and tap middleware.

use plugboard_core::{BoxError, Middleware, Next};

/// Transforms the data before handing it to the rest of the chain.
pub struct MapMiddleware<F> {
    mapper: F,
}

impl<F> MapMiddleware<F> {
    /// Create a new map middleware.
    pub fn new(mapper: F) -> Self {
        Self { mapper }
    }
}

impl<T, F> Middleware<T> for MapMiddleware<F>
where
    T: 'static,
    F: Fn(T) -> T + Send + Sync + 'static,
{
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        next.run((self.mapper)(data))
    }
}

/// Observes the data without changing it.
pub struct TapMiddleware<F> {
    observer: F,
}

impl<F> TapMiddleware<F> {
    /// Create a new tap middleware.
    pub fn new(observer: F) -> Self {
        Self { observer }
    }
}

impl<T, F> Middleware<T> for TapMiddleware<F>
where
    T: 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        (self.observer)(&data);
        next.run(data)
    }
}
