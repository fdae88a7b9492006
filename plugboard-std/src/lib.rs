//! # plugboard-std
//!
//! Standard implementations for the plugboard plugin runtime.
//!
//! This crate provides:
//! - **Middleware**: [`TracingMiddleware`](middleware::TracingMiddleware),
//!   [`MapMiddleware`](middleware::MapMiddleware),
//!   [`TapMiddleware`](middleware::TapMiddleware),
//!   [`GuardMiddleware`](middleware::GuardMiddleware)
//! - **Hooks**: [`LoggingHook`](hooks::LoggingHook)
//! - **Plugins**: [`LoggingPlugin`](plugins::LoggingPlugin), which publishes a
//!   shared [`Logger`](plugins::Logger)
//! - **Testing utilities**: recording and counting doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use plugboard_core;

// Modules
pub mod hooks;
pub mod middleware;
pub mod plugins;
pub mod testing;
