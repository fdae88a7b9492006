//! # plugboard-core
//!
//! Core types for the plugboard plugin runtime.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins that only need to talk to a [`Context`] or a [`PluginSystem`].
//!
//! # Building Blocks
//!
//! ## Plugins ([`Plugin`])
//!
//! A named unit of installable behavior. Installing a plugin runs its install
//! routine once against the shared [`Context`]. Names are unique; a second
//! plugin under a known name is ignored and recorded as a [`Diagnostic`].
//!
//! ## Middleware ([`Middleware`])
//!
//! Continuation-passing transforms, run in registration order. Each one
//! receives the data and a [`Next`] continuation and may:
//!
//! - transform the data before continuing,
//! - post-process the result after `next` returns,
//! - skip `next` entirely, which ends the chain with its own value.
//!
//! ## Hooks ([`Hook`])
//!
//! Named, multi-subscriber callbacks with two invocation modes: fan-out
//! (every hook gets the same arguments, all outputs are collected) and serial
//! reduce (each hook gets its predecessor's output).
//!
//! ## Extensions ([`Extensions`])
//!
//! Typed capability slots plugins publish for each other, such as a shared
//! logger.
//!
//! ## Composition ([`pipe`], [`compose`])
//!
//! Helpers for chaining unary functions, plus the [`pipe!`] and [`compose!`]
//! macros for heterogeneous chains.
//!
//! # Error Types
//!
//! - [`PluginError`] - Top-level error type
//! - [`BoxError`] - Error type returned by user code

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod compose;
mod context;
mod diagnostics;
mod error;
mod extension;
mod hook;
mod middleware;
mod options;
mod plugin;
mod system;

// Re-exports
pub use compose::{BoxFn, compose, compose2, identity, pipe, pipe2};
pub use context::Context;
pub use diagnostics::Diagnostic;
pub use error::{BoxError, PluginError};
pub use extension::Extensions;
pub use hook::{DynHook, Hook, HookRegistry, call_all, call_serial};
pub use middleware::{DynMiddleware, Middleware, MiddlewareStack, Next, run_chain};
pub use options::Options;
pub use plugin::{FnPlugin, Plugin, PluginRef, PluginRegistry};
pub use system::PluginSystem;
