//! Testing utilities for plugboard.
//!
//! This module provides doubles that make assertions about hooks, middleware
//! and plugins easier.
//!
//! # Features
//!
//! - [`RecordingHook`]: A pass-through hook that records every argument it receives
//! - [`CountingMiddleware`]: A pass-through middleware that counts invocations
//! - [`RecordingPlugin`]: A plugin that counts installs and can be told to fail
//!
//! All doubles share their state between clones, so keep a clone for
//! assertions and hand the other to the system.

use parking_lot::Mutex;
use plugboard_core::{BoxError, Context, Hook, Middleware, Next, Plugin};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Hook
// ============================================================================

/// A hook that records all arguments it receives and returns them unchanged.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHook::<u32>::new();
/// system.hook_with::<u32, _>("tick", recorder.clone())?;
///
/// system.call_hook::<u32, u32>("tick", 7)?;
/// assert_eq!(recorder.calls(), vec![7]);
/// ```
pub struct RecordingHook<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> RecordingHook<T> {
    /// Create a new recording hook.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded arguments.
    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl<T: Clone> Default for RecordingHook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RecordingHook<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Hook<T> for RecordingHook<T> {
    type Output = T;

    fn call(&self, args: T) -> Result<T, BoxError> {
        self.calls.lock().push(args.clone());
        Ok(args)
    }
}

// ============================================================================
// Counting Middleware
// ============================================================================

/// A middleware that counts invocations and always continues the chain.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingMiddleware::new();
/// system.use_middleware_with::<Request, _>(counter.clone());
///
/// system.apply_middlewares(request)?;
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountingMiddleware {
    count: Arc<AtomicUsize>,
}

impl CountingMiddleware {
    /// Create a new counting middleware.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the invocation count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<T: 'static> Middleware<T> for CountingMiddleware {
    fn handle(&self, data: T, next: Next<'_, T>) -> Result<T, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        next.run(data)
    }
}

// ============================================================================
// Recording Plugin
// ============================================================================

/// A plugin that counts how often its install routine runs.
///
/// Accepts any options type. A plugin built with [`RecordingPlugin::failing`]
/// returns an error from every install.
#[derive(Debug, Clone)]
pub struct RecordingPlugin {
    name: String,
    installs: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingPlugin {
    /// Create a recording plugin named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installs: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    /// Create a recording plugin whose install always fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Get the number of times install ran.
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl<Opts> Plugin<Opts> for RecordingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn install(&self, _ctx: &mut Context, _options: Opts) -> Result<(), BoxError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(format!("plugin `{}` refused to install", self.name).into());
        }
        Ok(())
    }
}
