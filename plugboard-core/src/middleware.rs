//! # Middleware Pipeline
//!
//! Middleware are continuation-passing transforms: each one receives the
//! current data and a [`Next`] continuation, and decides whether, when and with
//! what value to continue the chain.
//!
//! - **Ordered**: execution order equals registration order
//! - **Short-circuiting**: a middleware that never calls `next` ends the chain,
//!   and its own return value becomes the result
//! - **Snapshotted**: an execution runs over the chain as it was when the
//!   execution started; later registrations only affect later executions
//!
//! Pipelines are keyed by the data type flowing through them, so middleware
//! for `Request` and middleware for `Response` live in separate, independently
//! ordered chains.

use crate::error::BoxError;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

/// A continuation-passing transform over values of type `T`.
///
/// Closures of the shape `Fn(T, Next<'_, T>) -> Result<T, BoxError>`
/// implement this trait automatically.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Middleware` over `{T}`",
    label = "missing `Middleware<{T}>` implementation",
    note = "Middleware must implement `handle(data, next)` or be a closure `Fn({T}, Next<'_, {T}>) -> Result<{T}, BoxError>`."
)]
pub trait Middleware<T>: Send + Sync + 'static {
    /// Process `data`, optionally continuing the chain through `next`.
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError>;
}

impl<T, F> Middleware<T> for F
where
    F: for<'a> Fn(T, Next<'a, T>) -> Result<T, BoxError> + Send + Sync + 'static,
{
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        (self)(data, next)
    }
}

/// A shared, type-erased middleware.
pub type DynMiddleware<T> = Arc<dyn Middleware<T>>;

/// The continuation handed to a middleware.
///
/// Calling [`Next::run`] dispatches to the middleware after the current one;
/// past the end of the chain it returns the data unchanged.
pub struct Next<'a, T> {
    rest: &'a [DynMiddleware<T>],
}

impl<T> Clone for Next<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Next<'_, T> {}

impl<'a, T: 'static> Next<'a, T> {
    /// Create a continuation over `chain`.
    pub fn new(chain: &'a [DynMiddleware<T>]) -> Self {
        Self { rest: chain }
    }

    /// Continue the chain with `data`.
    pub fn run(self, data: T) -> Result<T, BoxError> {
        match self.rest.split_first() {
            Some((head, rest)) => head.handle(data, Next { rest }),
            None => Ok(data),
        }
    }

    /// Number of middleware still to run after this point.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

/// Runs `data` through `chain` from the start.
pub fn run_chain<T: 'static>(chain: &[DynMiddleware<T>], data: T) -> Result<T, BoxError> {
    Next::new(chain).run(data)
}

/// Ordered middleware chains, one per data type.
#[derive(Default)]
pub struct MiddlewareStack {
    chains: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `middleware` to the chain for `T`.
    pub fn push<T, M>(&mut self, middleware: M)
    where
        T: 'static,
        M: Middleware<T>,
    {
        self.push_dyn::<T>(Arc::new(middleware));
    }

    /// Append a closure to the chain for `T`.
    pub fn push_fn<T, F>(&mut self, middleware: F)
    where
        T: 'static,
        F: for<'a> Fn(T, Next<'a, T>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.push::<T, F>(middleware);
    }

    /// Append an already shared middleware to the chain for `T`.
    pub fn push_dyn<T: 'static>(&mut self, middleware: DynMiddleware<T>) {
        let chain = self
            .chains
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                Box::new(Vec::<DynMiddleware<T>>::new()) as Box<dyn Any + Send + Sync>
            });
        if let Some(chain) = chain.downcast_mut::<Vec<DynMiddleware<T>>>() {
            chain.push(middleware);
        }
    }

    /// Borrow the chain for `T`.
    pub fn chain<T: 'static>(&self) -> &[DynMiddleware<T>] {
        self.chains
            .get(&TypeId::of::<T>())
            .and_then(|chain| chain.downcast_ref::<Vec<DynMiddleware<T>>>())
            .map_or(&[][..], Vec::as_slice)
    }

    /// Copy the chain for `T`, detaching it from later registrations.
    pub fn snapshot<T: 'static>(&self) -> Vec<DynMiddleware<T>> {
        self.chain::<T>().to_vec()
    }

    /// Get the number of middleware registered for `T`.
    pub fn len<T: 'static>(&self) -> usize {
        self.chain::<T>().len()
    }

    /// Check if no middleware is registered for any type.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    struct AddMiddleware(i32);

    impl Middleware<i32> for AddMiddleware {
        fn handle(&self, data: i32, next: Next<'_, i32>) -> Result<i32, BoxError> {
            next.run(data + self.0)
        }
    }

    struct Tag(&'static str);

    impl Middleware<Vec<String>> for Tag {
        fn handle(
            &self,
            mut data: Vec<String>,
            next: Next<'_, Vec<String>>,
        ) -> Result<Vec<String>, BoxError> {
            data.push(self.0.to_owned());
            next.run(data)
        }
    }

    #[test]
    fn test_owned_data_through_struct_middleware() {
        let mut stack = MiddlewareStack::new();
        stack.push::<Vec<String>, _>(Tag("a"));
        stack.push::<Vec<String>, _>(Tag("b"));

        let out = run_chain(stack.chain::<Vec<String>>(), vec!["start".to_owned()]).unwrap();
        assert_eq!(out, ["start", "a", "b"]);
    }

    #[test]
    fn test_empty_chain_returns_input() {
        let stack = MiddlewareStack::new();
        assert!(stack.is_empty());
        assert_eq!(run_chain(stack.chain::<i32>(), 7).unwrap(), 7);
    }

    #[test]
    fn test_chain_runs_in_registration_order() {
        let mut stack = MiddlewareStack::new();
        stack.push_fn(|s: String, next: Next<'_, String>| next.run(s + "a"));
        stack.push_fn(|s: String, next: Next<'_, String>| next.run(s + "b"));
        stack.push_fn(|s: String, next: Next<'_, String>| next.run(s + "c"));

        let out = run_chain(stack.chain::<String>(), String::new()).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_short_circuit_skips_rest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut stack = MiddlewareStack::new();
        stack.push(AddMiddleware(1));
        stack.push_fn(|data: i32, _next: Next<'_, i32>| Ok(data * 100));
        let counter = calls.clone();
        stack.push_fn(move |data: i32, next: Next<'_, i32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(data)
        });

        assert_eq!(run_chain(stack.chain::<i32>(), 1).unwrap(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_post_processing_after_next() {
        let mut stack = MiddlewareStack::new();
        stack.push_fn(|data: i32, next: Next<'_, i32>| Ok(next.run(data)? * 10));
        stack.push(AddMiddleware(2));

        assert_eq!(run_chain(stack.chain::<i32>(), 1).unwrap(), 30);
    }

    #[test]
    fn test_error_propagates() {
        let mut stack = MiddlewareStack::new();
        stack.push(AddMiddleware(1));
        stack.push_fn(|_data: i32, _next: Next<'_, i32>| Err(Boom.into()));

        let err = run_chain(stack.chain::<i32>(), 1).unwrap_err();
        assert!(err.is::<Boom>());
    }

    #[test]
    fn test_chains_are_separated_by_type() {
        let mut stack = MiddlewareStack::new();
        stack.push(AddMiddleware(5));
        stack.push_fn(|s: String, next: Next<'_, String>| next.run(s.to_uppercase()));

        assert_eq!(stack.len::<i32>(), 1);
        assert_eq!(stack.len::<String>(), 1);
        assert_eq!(stack.len::<u8>(), 0);
        assert_eq!(run_chain(stack.chain::<i32>(), 0).unwrap(), 5);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut stack = MiddlewareStack::new();
        stack.push(AddMiddleware(1));
        let snapshot = stack.snapshot::<i32>();
        stack.push(AddMiddleware(10));

        assert_eq!(run_chain(&snapshot, 0).unwrap(), 1);
        assert_eq!(run_chain(stack.chain::<i32>(), 0).unwrap(), 11);
    }

    #[test]
    fn test_next_remaining() {
        let mut stack = MiddlewareStack::new();
        stack.push_fn(|data: usize, next: Next<'_, usize>| next.run(data + next.remaining()));
        stack.push_fn(|data: usize, next: Next<'_, usize>| next.run(data + next.remaining()));

        assert_eq!(run_chain(stack.chain::<usize>(), 0).unwrap(), 1);
    }
}
