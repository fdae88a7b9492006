//! # plugboard - Plugin, Middleware and Hook Runtime
//!
//! `plugboard` gives an application one shared [`Context`] that plugins
//! install into. Installed plugins extend the application three ways:
//!
//! - **Middleware**: ordered, continuation-passing transforms over a data
//!   type, run with [`PluginSystem::apply_middlewares`]
//! - **Hooks**: named callbacks, invoked fan-out with
//!   [`PluginSystem::call_hook`] or as a serial reduce with
//!   [`PluginSystem::call_hook_serial`]
//! - **Extensions**: typed capabilities published with
//!   [`PluginSystem::extend`] for later plugins to use
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plugboard::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Request {
//!     url: String,
//!     logged: bool,
//! }
//!
//! let system = PluginSystem::new();
//! system.use_plugin(FnPlugin::new("logger", |ctx: &mut Context, ()| {
//!     ctx.hook("before", |req: Request| Ok(Request { logged: true, ..req }))?;
//!     Ok(())
//! }))?;
//!
//! let req = system.call_hook_serial("before", Request { url: "/a".into(), logged: false })?;
//! assert!(req.logged);
//! ```
//!
//! ## Soft Failures
//!
//! Installing a second plugin under a known name, or overwriting an extension
//! slot, never fails. Both are logged through `tracing` and recorded as a
//! [`Diagnostic`], readable with [`PluginSystem::diagnostics`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use plugboard_core::{
    // Composition (functions and the `pipe!`/`compose!` macros)
    BoxFn,
    // Errors
    BoxError,
    // Context
    Context,
    Diagnostic,
    // Hooks
    DynHook,
    // Middleware
    DynMiddleware,
    Extensions,
    // Plugins
    FnPlugin,
    Hook,
    HookRegistry,
    Middleware,
    MiddlewareStack,
    Next,
    Options,
    Plugin,
    PluginError,
    PluginRef,
    PluginRegistry,
    PluginSystem,
    call_all,
    call_serial,
    compose,
    compose2,
    identity,
    pipe,
    pipe2,
    run_chain,
};

/// Standard middleware implementations.
pub mod middleware {
    pub use plugboard_std::middleware::{
        GuardMiddleware, MapMiddleware, TapMiddleware, TracingMiddleware,
    };
}

/// Standard hook implementations.
pub mod hooks {
    pub use plugboard_std::hooks::LoggingHook;
}

/// Standard plugins.
pub mod plugins {
    pub use plugboard_std::plugins::{Logger, LoggingConfig, LoggingPlugin};
}

/// Testing utilities.
pub mod testing {
    pub use plugboard_std::testing::{CountingMiddleware, RecordingHook, RecordingPlugin};
}

/// Prelude module - common imports for plugboard.
///
/// # Usage
///
/// ```rust,ignore
/// use plugboard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Core types
        Context,
        FnPlugin,
        Hook,
        Middleware,
        Next,
        Options,
        Plugin,
        PluginError,
        PluginSystem,
    };

    #[cfg(feature = "macros")]
    pub use crate::plugin;
}

#[cfg(feature = "macros")]
pub use plugboard_macros::plugin;
