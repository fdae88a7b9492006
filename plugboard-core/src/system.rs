//! # Plugin System
//!
//! [`PluginSystem`] is the handle applications hold. It wraps one shared
//! [`Context`] and exposes every operation of the runtime through `&self`, so
//! the handle can be cloned freely and used from middleware, hooks or other
//! threads.
//!
//! # Locking
//!
//! - Registration (`use_plugin`, `use_middleware`, `hook`, `extend`) takes
//!   the write lock for the duration of the change. Install routines run
//!   under it with direct `&mut Context` access, so they must not call back
//!   into the system handle.
//! - Invocation (`apply_middlewares`, `call_hook`, `call_hook_serial`) copies
//!   the relevant chain under the read lock, releases it, then runs user
//!   code. A middleware or hook may therefore register more middleware or
//!   hooks through a cloned handle; the change only affects later
//!   invocations.

use crate::{
    compose::{self, BoxFn},
    context::Context,
    diagnostics::Diagnostic,
    error::{BoxError, PluginError},
    hook::{self, Hook},
    middleware::{self, Middleware, Next},
    options::Options,
    plugin::{Plugin, PluginRef},
};
use parking_lot::RwLock;
use std::{fmt, sync::Arc};

/// A shareable handle to a plugin runtime.
///
/// Cloning is cheap and every clone sees the same context.
#[derive(Clone, Default)]
pub struct PluginSystem {
    inner: Arc<RwLock<Context>>,
}

impl PluginSystem {
    /// Create a system with empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system carrying `options`.
    pub fn with_options(options: Options) -> Self {
        Self::from_context(Context::with_options(options))
    }

    /// Wrap an existing context.
    pub fn from_context(ctx: Context) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ctx)),
        }
    }

    // ==================================================================
    // Plugins
    // ==================================================================

    /// Install a plugin that takes no options.
    pub fn use_plugin<P>(&self, plugin: P) -> Result<&Self, PluginError>
    where
        P: Plugin,
    {
        self.use_with(plugin, ())
    }

    /// Install a plugin, forwarding `options` to its install routine.
    ///
    /// The install routine runs under the write lock; see [`Plugin::install`].
    pub fn use_with<P, Opts>(&self, plugin: P, options: Opts) -> Result<&Self, PluginError>
    where
        P: Plugin<Opts>,
    {
        self.inner.write().use_with(plugin, options)?;
        Ok(self)
    }

    /// Look up an installed plugin.
    pub fn get_plugin(&self, name: &str) -> Option<PluginRef> {
        self.inner.read().get_plugin(name)
    }

    /// Check whether a plugin is installed under `name`.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.inner.read().has_plugin(name)
    }

    // ==================================================================
    // Middleware
    // ==================================================================

    /// Append a middleware closure to the pipeline for `T`.
    pub fn use_middleware<T, F>(&self, middleware: F) -> &Self
    where
        T: 'static,
        F: for<'a> Fn(T, Next<'a, T>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.use_middleware_with::<T, F>(middleware)
    }

    /// Append a [`Middleware`] implementation to the pipeline for `T`.
    pub fn use_middleware_with<T, M>(&self, middleware: M) -> &Self
    where
        T: 'static,
        M: Middleware<T>,
    {
        self.inner.write().use_middleware_with::<T, M>(middleware);
        self
    }

    /// Run `data` through the pipeline for `T` as registered right now.
    pub fn apply_middlewares<T: 'static>(&self, data: T) -> Result<T, PluginError> {
        let chain = self.inner.read().middleware().snapshot::<T>();
        middleware::run_chain(&chain, data).map_err(PluginError::Middleware)
    }

    // ==================================================================
    // Hooks
    // ==================================================================

    /// Register a hook closure under `name`.
    pub fn hook<Args, Out, F>(&self, name: impl Into<String>, hook: F) -> Result<&Self, PluginError>
    where
        Args: 'static,
        Out: 'static,
        F: Fn(Args) -> Result<Out, BoxError> + Send + Sync + 'static,
    {
        self.hook_with::<Args, F>(name, hook)
    }

    /// Register a [`Hook`] implementation under `name`.
    pub fn hook_with<Args, H>(&self, name: impl Into<String>, hook: H) -> Result<&Self, PluginError>
    where
        Args: 'static,
        H: Hook<Args>,
        H::Output: 'static,
    {
        self.inner.write().hook_with::<Args, H>(name, hook)?;
        Ok(self)
    }

    /// Fan-out invocation of the hooks under `name`.
    pub fn call_hook<Args, Out>(&self, name: &str, args: Args) -> Result<Vec<Out>, PluginError>
    where
        Args: Clone + 'static,
        Out: 'static,
    {
        let hooks = self.inner.read().hooks().snapshot::<Args, Out>(name)?;
        hook::call_all(name, &hooks, args)
    }

    /// Serial-reduce invocation of the hooks under `name`.
    pub fn call_hook_serial<T: 'static>(&self, name: &str, initial: T) -> Result<T, PluginError> {
        let hooks = self.inner.read().hooks().snapshot::<T, T>(name)?;
        hook::call_serial(name, &hooks, initial)
    }

    // ==================================================================
    // Extensions, options & diagnostics
    // ==================================================================

    /// Publish `value` in the extension slot `name`, replacing any previous value.
    pub fn extend<T>(&self, name: impl Into<String>, value: T) -> &Self
    where
        T: Send + Sync + 'static,
    {
        self.inner.write().extend(name, value);
        self
    }

    /// Read the extension slot `name` as a `T`.
    pub fn extension<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.inner.read().extension(name)
    }

    /// A copy of the options the system was created with.
    pub fn options(&self) -> Options {
        self.inner.read().options().clone()
    }

    /// A copy of the soft failures recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.read().diagnostics().to_vec()
    }

    /// Drain the recorded soft failures.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.write().take_diagnostics()
    }

    /// Run `f` with shared access to the context.
    ///
    /// The read lock is held while `f` runs.
    pub fn with_context<R>(&self, f: impl FnOnce(&Context) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the context.
    ///
    /// The write lock is held while `f` runs.
    pub fn with_context_mut<R>(&self, f: impl FnOnce(&mut Context) -> R) -> R {
        f(&mut self.inner.write())
    }

    // ==================================================================
    // Composition
    // ==================================================================

    /// Right-to-left composition of `fns`. See [`compose::compose`].
    pub fn compose<T, I>(fns: I) -> BoxFn<T>
    where
        T: 'static,
        I: IntoIterator<Item = BoxFn<T>>,
    {
        compose::compose(fns)
    }

    /// Left-to-right composition of `fns`. See [`compose::pipe`].
    pub fn pipe<T, I>(fns: I) -> BoxFn<T>
    where
        T: 'static,
        I: IntoIterator<Item = BoxFn<T>>,
    {
        compose::pipe(fns)
    }
}

impl fmt::Debug for PluginSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PluginSystem").field(&*self.inner.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::FnPlugin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_clones_share_state() {
        let system = PluginSystem::new();
        let other = system.clone();
        other.extend("answer", 42u32);

        assert_eq!(system.extension::<u32>("answer").as_deref(), Some(&42));
    }

    #[test]
    fn test_registration_during_middleware_affects_next_run_only() {
        let system = PluginSystem::new();
        let handle = system.clone();
        let registered = Arc::new(AtomicUsize::new(0));
        let counter = registered.clone();

        system.use_middleware(move |x: i32, next: Next<'_, i32>| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                handle.use_middleware(|x: i32, next: Next<'_, i32>| next.run(x * 10));
            }
            next.run(x + 1)
        });

        assert_eq!(system.apply_middlewares(1).unwrap(), 2);
        assert_eq!(system.apply_middlewares(1).unwrap(), 20);
        assert_eq!(registered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_registration_during_hook_affects_next_call_only() {
        let system = PluginSystem::new();
        let handle = system.clone();
        system
            .hook("grow", move |x: u32| {
                if x == 0 {
                    handle.hook("grow", |x: u32| Ok(x + 100))?;
                }
                Ok(x + 1)
            })
            .unwrap();

        assert_eq!(system.call_hook_serial("grow", 0u32).unwrap(), 1);
        assert_eq!(system.call_hook_serial("grow", 1u32).unwrap(), 102);
        assert_eq!(system.call_hook::<u32, u32>("grow", 1).unwrap(), vec![2, 101]);
    }

    #[test]
    fn test_plugins_through_handle() {
        let system = PluginSystem::with_options(Options::new().with("scale", 3));
        system
            .use_plugin(FnPlugin::new("scaler", |ctx: &mut Context, ()| {
                let scale: i64 = ctx.options().get_as("scale")?.unwrap_or(1);
                ctx.use_middleware(move |x: i64, next: Next<'_, i64>| next.run(x * scale));
                Ok(())
            }))
            .unwrap()
            .use_plugin(FnPlugin::new("scaler", |_ctx: &mut Context, ()| Ok(())))
            .unwrap();

        assert!(system.has_plugin("scaler"));
        assert_eq!(system.apply_middlewares(5i64).unwrap(), 15);
        assert_eq!(
            system.take_diagnostics(),
            vec![Diagnostic::DuplicatePlugin {
                name: "scaler".into()
            }]
        );
        assert!(system.diagnostics().is_empty());
    }

    #[test]
    fn test_install_holds_write_lock() {
        let system = PluginSystem::new();
        let lock_handle = system.clone();
        system
            .hook("locked", move |(): ()| Ok(lock_handle.inner.try_read().is_none()))
            .unwrap();

        system
            .use_plugin(FnPlugin::new("checker", |ctx: &mut Context, ()| {
                let locked = ctx.call_hook::<(), bool>("locked", ())?;
                ctx.extend("locked during install", locked == [true]);
                Ok(())
            }))
            .unwrap();

        assert_eq!(
            system.extension::<bool>("locked during install").as_deref(),
            Some(&true)
        );
        assert_eq!(system.call_hook::<(), bool>("locked", ()).unwrap(), vec![false]);
    }

    #[test]
    fn test_shared_across_threads() {
        let system = PluginSystem::new();
        system.hook("sum", |x: usize| Ok(x)).unwrap();

        std::thread::scope(|scope| {
            for i in 0..4 {
                let system = system.clone();
                scope.spawn(move || {
                    system.hook("sum", move |x: usize| Ok(x + i)).unwrap();
                });
            }
        });

        assert_eq!(system.with_context(|ctx| ctx.hooks().len("sum")), 5);
        let outputs = system.call_hook::<usize, usize>("sum", 0).unwrap();
        assert_eq!(outputs.iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_composition_helpers() {
        let piped = PluginSystem::pipe::<i32, _>([
            Box::new(|x: i32| x + 1) as BoxFn<i32>,
            Box::new(|x: i32| x * 2),
        ]);
        let composed = PluginSystem::compose::<i32, _>([
            Box::new(|x: i32| x + 1) as BoxFn<i32>,
            Box::new(|x: i32| x * 2),
        ]);

        assert_eq!(piped(3), 8);
        assert_eq!(composed(3), 7);
    }
}
