//! # Context
//!
//! The single shared, mutable record every plugin installs into. It owns:
//!
//! - the [`PluginRegistry`] of installed plugins,
//! - the [`MiddlewareStack`] of continuation-passing transforms,
//! - the [`HookRegistry`] of named callbacks,
//! - the [`Options`] the system was created with,
//! - the [`Extensions`] plugins publish for each other,
//! - the [`Diagnostic`]s recorded for soft failures.
//!
//! All plugins get equal, unguarded write access. Anything a plugin adds is
//! visible to every plugin installed after it and to the caller as soon as
//! installation returns.

use crate::{
    diagnostics::Diagnostic,
    error::{BoxError, PluginError},
    extension::Extensions,
    hook::{self, Hook, HookRegistry},
    middleware::{self, Middleware, MiddlewareStack, Next},
    options::Options,
    plugin::{Plugin, PluginRef, PluginRegistry},
};
use std::{fmt, sync::Arc};

/// The shared execution context.
#[derive(Default)]
pub struct Context {
    plugins: PluginRegistry,
    middleware: MiddlewareStack,
    hooks: HookRegistry,
    options: Options,
    extensions: Extensions,
    diagnostics: Vec<Diagnostic>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying `options`.
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------

    /// Install a plugin that takes no options.
    pub fn use_plugin<P>(&mut self, plugin: P) -> Result<&mut Self, PluginError>
    where
        P: Plugin,
    {
        self.use_with(plugin, ())
    }

    /// Install a plugin, forwarding `options` to its install routine.
    ///
    /// A plugin whose name is already installed is discarded without running
    /// its install routine, and a [`Diagnostic::DuplicatePlugin`] is recorded.
    /// If install fails the plugin stays registered and the error is returned.
    pub fn use_with<P, Opts>(&mut self, plugin: P, options: Opts) -> Result<&mut Self, PluginError>
    where
        P: Plugin<Opts>,
    {
        let plugin = Arc::new(plugin);
        let name = plugin.name().to_owned();

        if !self.plugins.insert(&name, Arc::clone(&plugin)) {
            tracing::warn!(plugin = %name, "plugin already installed; ignoring");
            self.diagnostics.push(Diagnostic::DuplicatePlugin { name });
            return Ok(self);
        }

        tracing::debug!(plugin = %name, "installing plugin");
        plugin
            .install(self, options)
            .map_err(|source| PluginError::Install {
                plugin: name,
                source,
            })?;
        Ok(self)
    }

    /// Look up an installed plugin.
    pub fn get_plugin(&self, name: &str) -> Option<PluginRef> {
        self.plugins.get(name).cloned()
    }

    /// Check whether a plugin is installed under `name`.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }

    /// The installed plugins.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    // ------------------------------------------------------------------
    // Middleware
    // ------------------------------------------------------------------

    /// Append a middleware closure to the pipeline for `T`.
    pub fn use_middleware<T, F>(&mut self, middleware: F) -> &mut Self
    where
        T: 'static,
        F: for<'a> Fn(T, Next<'a, T>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.use_middleware_with::<T, F>(middleware)
    }

    /// Append a [`Middleware`] implementation to the pipeline for `T`.
    pub fn use_middleware_with<T, M>(&mut self, middleware: M) -> &mut Self
    where
        T: 'static,
        M: Middleware<T>,
    {
        self.middleware.push::<T, M>(middleware);
        tracing::debug!(
            data = std::any::type_name::<T>(),
            len = self.middleware.len::<T>(),
            "middleware registered"
        );
        self
    }

    /// Run `data` through the pipeline for `T`.
    ///
    /// The chain is snapshotted before it starts, so the result only depends
    /// on the middleware registered at call time.
    pub fn apply_middlewares<T: 'static>(&self, data: T) -> Result<T, PluginError> {
        let chain = self.middleware.snapshot::<T>();
        middleware::run_chain(&chain, data).map_err(PluginError::Middleware)
    }

    /// The registered middleware.
    pub fn middleware(&self) -> &MiddlewareStack {
        &self.middleware
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Register a hook closure under `name`.
    pub fn hook<Args, Out, F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&mut Self, PluginError>
    where
        Args: 'static,
        Out: 'static,
        F: Fn(Args) -> Result<Out, BoxError> + Send + Sync + 'static,
    {
        self.hook_with::<Args, F>(name, hook)
    }

    /// Register a [`Hook`] implementation under `name`.
    pub fn hook_with<Args, H>(
        &mut self,
        name: impl Into<String>,
        hook: H,
    ) -> Result<&mut Self, PluginError>
    where
        Args: 'static,
        H: Hook<Args>,
        H::Output: 'static,
    {
        let name = name.into();
        self.hooks.register::<Args, H>(name.as_str(), hook)?;
        tracing::debug!(hook = %name, len = self.hooks.len(&name), "hook registered");
        Ok(self)
    }

    /// Fan-out invocation of the hooks under `name`.
    pub fn call_hook<Args, Out>(&self, name: &str, args: Args) -> Result<Vec<Out>, PluginError>
    where
        Args: Clone + 'static,
        Out: 'static,
    {
        let hooks = self.hooks.snapshot::<Args, Out>(name)?;
        hook::call_all(name, &hooks, args)
    }

    /// Serial-reduce invocation of the hooks under `name`.
    pub fn call_hook_serial<T: 'static>(&self, name: &str, initial: T) -> Result<T, PluginError> {
        let hooks = self.hooks.snapshot::<T, T>(name)?;
        hook::call_serial(name, &hooks, initial)
    }

    /// The registered hooks.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    // ------------------------------------------------------------------
    // Extensions
    // ------------------------------------------------------------------

    /// Publish `value` in the extension slot `name`.
    ///
    /// Overwriting an existing slot replaces it and records a
    /// [`Diagnostic::ExtensionOverwritten`].
    pub fn extend<T>(&mut self, name: impl Into<String>, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        let name = name.into();
        if self.extensions.insert(name.as_str(), value) {
            tracing::warn!(extension = %name, "extension overwritten");
            self.diagnostics
                .push(Diagnostic::ExtensionOverwritten { name });
        } else {
            tracing::debug!(extension = %name, "extension added");
        }
        self
    }

    /// Read the extension slot `name` as a `T`.
    pub fn extension<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.extensions.get(name)
    }

    /// The published extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    // ------------------------------------------------------------------
    // Options & diagnostics
    // ------------------------------------------------------------------

    /// The options the context was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable access to the options.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Soft failures recorded so far, oldest first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded soft failures.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("plugins", &self.plugins)
            .field("hooks", &self.hooks.names().collect::<Vec<_>>())
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::FnPlugin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_install_runs_once_and_mutates_context() {
        let installs = Arc::new(AtomicUsize::new(0));
        let counter = installs.clone();
        let plugin = FnPlugin::new("adder", move |ctx: &mut Context, amount: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.use_middleware(move |x: i32, next: Next<'_, i32>| next.run(x + amount));
            Ok(())
        });

        let mut ctx = Context::new();
        ctx.use_with(plugin, 5).unwrap();

        assert_eq!(installs.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.apply_middlewares(1).unwrap(), 6);
        assert!(ctx.has_plugin("adder"));
    }

    #[test]
    fn test_duplicate_plugin_is_ignored() {
        let second_ran = Arc::new(AtomicUsize::new(0));
        let counter = second_ran.clone();

        let mut ctx = Context::new();
        ctx.use_plugin(FnPlugin::new("p", |_ctx, ()| Ok(()))).unwrap();
        let first = ctx.get_plugin("p").unwrap();
        ctx.use_plugin(FnPlugin::new("p", move |_ctx, ()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();

        assert_eq!(second_ran.load(Ordering::SeqCst), 0);
        assert!(ctx.get_plugin("p").unwrap().ptr_eq(&first));
        assert_eq!(
            ctx.diagnostics(),
            &[Diagnostic::DuplicatePlugin { name: "p".into() }]
        );
    }

    #[test]
    fn test_failed_install_stays_registered() {
        let mut ctx = Context::new();
        let err = ctx
            .use_plugin(FnPlugin::new("broken", |ctx: &mut Context, ()| {
                ctx.extend("half", true);
                Err(Boom.into())
            }))
            .unwrap_err();

        assert!(matches!(err, PluginError::Install { ref plugin, .. } if plugin == "broken"));
        assert!(ctx.has_plugin("broken"));
        assert_eq!(ctx.extension::<bool>("half").as_deref(), Some(&true));
    }

    #[test]
    fn test_nested_install() {
        let outer = FnPlugin::new("outer", |ctx: &mut Context, ()| {
            ctx.use_plugin(FnPlugin::new("inner", |ctx: &mut Context, ()| {
                ctx.extend("inner", 1u8);
                Ok(())
            }))?;
            Ok(())
        });
        let inner_again = FnPlugin::new("inner", |ctx: &mut Context, ()| {
            ctx.extend("inner", 2u8);
            Ok(())
        });

        let mut ctx = Context::new();
        ctx.use_plugin(outer).unwrap().use_plugin(inner_again).unwrap();

        assert!(ctx.has_plugin("outer"));
        assert!(ctx.has_plugin("inner"));
        assert_eq!(ctx.plugins().len(), 2);
        assert_eq!(ctx.extension::<u8>("inner").as_deref(), Some(&1));
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn test_extend_overwrites_with_diagnostic() {
        let mut ctx = Context::new();
        ctx.extend("x", 1i32).extend("x", 2i32);

        assert_eq!(ctx.extension::<i32>("x").as_deref(), Some(&2));
        assert_eq!(
            ctx.take_diagnostics(),
            vec![Diagnostic::ExtensionOverwritten { name: "x".into() }]
        );
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_hooks_through_context() {
        let mut ctx = Context::new();
        ctx.hook("e", |x: i32| Ok(x + 1))
            .unwrap()
            .hook("e", |x: i32| Ok(x * 2))
            .unwrap();

        assert_eq!(ctx.call_hook::<i32, i32>("e", 3).unwrap(), vec![4, 6]);
        assert_eq!(ctx.call_hook_serial("e", 3).unwrap(), 8);
    }

    #[test]
    fn test_options_are_visible_to_plugins() {
        let options = Options::new().with("prefix", "api");
        let mut ctx = Context::with_options(options);
        ctx.use_plugin(FnPlugin::new("reader", |ctx: &mut Context, ()| {
            let prefix: String = ctx.options().get_as("prefix")?.unwrap_or_default();
            ctx.extend("prefix", prefix);
            Ok(())
        }))
        .unwrap();

        assert_eq!(ctx.extension::<String>("prefix").unwrap().as_str(), "api");
    }
}
