//! # Plugins
//!
//! A plugin is a named unit of installable behavior. Installing a plugin runs
//! its [`Plugin::install`] routine once, synchronously, against the shared
//! [`Context`]; the routine typically registers hooks and middleware or
//! publishes extensions for later plugins to use.
//!
//! Plugin names are unique per context. Installing a second plugin under a
//! known name is a no-op that records a
//! [`Diagnostic::DuplicatePlugin`](crate::Diagnostic::DuplicatePlugin).
//!
//! # Example
//!
//! ```rust,ignore
//! struct Greeter;
//!
//! impl Plugin<String> for Greeter {
//!     fn name(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn install(&self, ctx: &mut Context, greeting: String) -> Result<(), BoxError> {
//!         ctx.hook("greet", move |who: String| Ok(format!("{greeting}, {who}")))?;
//!         Ok(())
//!     }
//! }
//!
//! system.use_with(Greeter, "Hello".to_string())?;
//! ```

use crate::{context::Context, error::BoxError};
use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// A named unit of installable behavior.
///
/// `Opts` is whatever the plugin needs at install time; use a tuple when a
/// plugin takes several values and `()` (the default) when it takes none.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Plugin` accepting `{Opts}`",
    label = "missing `Plugin<{Opts}>` implementation",
    note = "Plugins must implement `name()` and `install(ctx, options)`."
)]
pub trait Plugin<Opts = ()>: Send + Sync + 'static {
    /// The unique name this plugin is registered under.
    fn name(&self) -> &str;

    /// Install the plugin into `ctx`. Runs exactly once per context.
    ///
    /// # Deadlocks
    ///
    /// When installed through a [`PluginSystem`](crate::PluginSystem), this
    /// runs while the system's write lock is held. Work through `ctx` only:
    /// calling any method of a `PluginSystem` handle from here, directly or
    /// from a hook or middleware invoked via `ctx.call_hook` /
    /// `ctx.apply_middlewares`, blocks forever.
    fn install(&self, ctx: &mut Context, options: Opts) -> Result<(), BoxError>;
}

/// A plugin built from a name and an install closure.
pub struct FnPlugin<F> {
    name: String,
    install: F,
}

impl<F> FnPlugin<F> {
    /// Create a plugin named `name` that runs `install` when installed.
    pub fn new<Opts>(name: impl Into<String>, install: F) -> Self
    where
        F: Fn(&mut Context, Opts) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            install,
        }
    }
}

impl<F, Opts> Plugin<Opts> for FnPlugin<F>
where
    F: Fn(&mut Context, Opts) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn install(&self, ctx: &mut Context, options: Opts) -> Result<(), BoxError> {
        (self.install)(ctx, options)
    }
}

impl<F> fmt::Debug for FnPlugin<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPlugin").field("name", &self.name).finish()
    }
}

/// A handle to an installed plugin.
///
/// Returned by `get_plugin`; holding it never re-runs the install routine.
#[derive(Clone)]
pub struct PluginRef {
    name: Arc<str>,
    type_name: &'static str,
    plugin: Arc<dyn Any + Send + Sync>,
}

impl PluginRef {
    pub(crate) fn new<P: Send + Sync + 'static>(name: &str, plugin: Arc<P>) -> Self {
        Self {
            name: Arc::from(name),
            type_name: type_name::<P>(),
            plugin,
        }
    }

    /// The name the plugin is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Rust type name of the plugin.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the plugin is a `P`.
    pub fn is<P: Send + Sync + 'static>(&self) -> bool {
        self.plugin.is::<P>()
    }

    /// Get the plugin as its concrete type.
    pub fn downcast<P: Send + Sync + 'static>(&self) -> Option<Arc<P>> {
        Arc::clone(&self.plugin).downcast::<P>().ok()
    }

    /// Check whether two handles refer to the same installed plugin.
    pub fn ptr_eq(&self, other: &PluginRef) -> bool {
        Arc::ptr_eq(&self.plugin, &other.plugin)
    }
}

impl fmt::Debug for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRef")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Installed plugins, keyed by name.
#[derive(Default, Debug)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginRef>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `plugin` under `name`.
    ///
    /// Returns `false` and leaves the registry untouched if `name` is taken.
    pub fn insert<P: Send + Sync + 'static>(&mut self, name: &str, plugin: Arc<P>) -> bool {
        if self.plugins.contains_key(name) {
            return false;
        }
        self.plugins
            .insert(name.to_owned(), PluginRef::new(name, plugin));
        true
    }

    /// Look up a plugin by name.
    pub fn get(&self, name: &str) -> Option<&PluginRef> {
        self.plugins.get(name)
    }

    /// Check whether a plugin is installed under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Iterate over installed plugin names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Get the number of installed plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if no plugins are installed.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
