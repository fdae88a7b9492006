#![allow(dead_code)]

use plugboard::{BoxError, Context, FnPlugin, Next, Plugin};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Data Types
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub logged: bool,
    pub headers: Vec<String>,
}

impl Request {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Boom(pub &'static str);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom: {}", self.0)
    }
}

impl std::error::Error for Boom {}

// ============================================================================
// Test Plugins and Middleware
// ============================================================================

/// The `logger` plugin: marks every request passing through the `before` hook.
pub fn logger_plugin() -> impl Plugin {
    FnPlugin::new("logger", |ctx: &mut Context, ()| {
        ctx.hook("before", |req: Request| {
            Ok(Request {
                logged: true,
                ..req
            })
        })?;
        Ok(())
    })
}

/// A middleware that counts its invocations and appends `header` before continuing.
pub fn header_middleware(
    header: &'static str,
    calls: Arc<AtomicUsize>,
) -> impl for<'a> Fn(Request, Next<'a, Request>) -> Result<Request, BoxError> + Send + Sync + 'static
{
    move |mut req: Request, next: Next<'_, Request>| {
        calls.fetch_add(1, Ordering::SeqCst);
        req.headers.push(header.to_string());
        next.run(req)
    }
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
