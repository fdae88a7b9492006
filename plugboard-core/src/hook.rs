//! # Hook Registry
//!
//! Hooks are named, multi-subscriber callbacks. Any number of hooks may be
//! registered under the same name; they are invoked in registration order in
//! one of two ways:
//!
//! - **Fan-out** ([`HookRegistry::call`]): every hook receives the same
//!   arguments and all outputs are collected, in order.
//! - **Serial reduce** ([`HookRegistry::call_serial`]): the first hook receives
//!   the initial value, each later hook receives its predecessor's output, and
//!   the last output is the result.
//!
//! Unlike middleware, hooks never see a continuation and cannot stop the
//! chain early (other than by failing).
//!
//! All hooks under one name share a single signature `Fn(Args) -> Output`.
//! Multiple arguments are passed as a tuple.

use crate::error::{BoxError, PluginError};
use std::{
    any::{Any, type_name},
    collections::HashMap,
    sync::Arc,
};

/// A named callback taking `Args`.
///
/// Closures of the shape `Fn(Args) -> Result<Out, BoxError>` implement this
/// trait automatically.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Hook` taking `{Args}`",
    label = "missing `Hook<{Args}>` implementation",
    note = "Hooks must implement `call(args)` or be a closure `Fn({Args}) -> Result<_, BoxError>`."
)]
pub trait Hook<Args>: Send + Sync + 'static {
    /// The value this hook produces.
    type Output;

    /// Invoke the hook.
    fn call(&self, args: Args) -> Result<Self::Output, BoxError>;
}

impl<F, Args, Out> Hook<Args> for F
where
    F: Fn(Args) -> Result<Out, BoxError> + Send + Sync + 'static,
{
    type Output = Out;

    fn call(&self, args: Args) -> Result<Out, BoxError> {
        (self)(args)
    }
}

/// A shared, type-erased hook.
pub type DynHook<Args, Out> = Arc<dyn Hook<Args, Output = Out>>;

fn signature<Args, Out>() -> &'static str {
    type_name::<fn(Args) -> Out>()
}

struct Bucket {
    hooks: Box<dyn Any + Send + Sync>,
    signature: &'static str,
    len: usize,
}

impl Bucket {
    fn new<Args: 'static, Out: 'static>() -> Self {
        Self {
            hooks: Box::new(Vec::<DynHook<Args, Out>>::new()),
            signature: signature::<Args, Out>(),
            len: 0,
        }
    }

    fn mismatch<Args, Out>(&self, name: &str) -> PluginError {
        PluginError::HookSignature {
            name: name.to_owned(),
            expected: self.signature,
            found: signature::<Args, Out>(),
        }
    }
}

/// Named, ordered hook lists.
#[derive(Default)]
pub struct HookRegistry {
    buckets: HashMap<String, Bucket>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook` to the list for `name`, creating the list if absent.
    ///
    /// Fails if `name` already holds hooks of a different signature.
    pub fn register<Args, H>(
        &mut self,
        name: impl Into<String>,
        hook: H,
    ) -> Result<(), PluginError>
    where
        Args: 'static,
        H: Hook<Args>,
        H::Output: 'static,
    {
        self.register_dyn(name, Arc::new(hook) as DynHook<Args, H::Output>)
    }

    /// Append a closure to the list for `name`.
    pub fn register_fn<Args, Out, F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<(), PluginError>
    where
        Args: 'static,
        Out: 'static,
        F: Fn(Args) -> Result<Out, BoxError> + Send + Sync + 'static,
    {
        self.register::<Args, F>(name, hook)
    }

    /// Append an already shared hook to the list for `name`.
    pub fn register_dyn<Args: 'static, Out: 'static>(
        &mut self,
        name: impl Into<String>,
        hook: DynHook<Args, Out>,
    ) -> Result<(), PluginError> {
        let name = name.into();
        let bucket = self
            .buckets
            .entry(name.clone())
            .or_insert_with(Bucket::new::<Args, Out>);
        match bucket.hooks.downcast_mut::<Vec<DynHook<Args, Out>>>() {
            Some(hooks) => {
                hooks.push(hook);
                bucket.len += 1;
                Ok(())
            }
            None => Err(bucket.mismatch::<Args, Out>(&name)),
        }
    }

    /// Copy the hook list for `name`, detaching it from later registrations.
    ///
    /// An unknown name yields an empty list.
    pub fn snapshot<Args: 'static, Out: 'static>(
        &self,
        name: &str,
    ) -> Result<Vec<DynHook<Args, Out>>, PluginError> {
        let Some(bucket) = self.buckets.get(name) else {
            return Ok(Vec::new());
        };
        bucket
            .hooks
            .downcast_ref::<Vec<DynHook<Args, Out>>>()
            .cloned()
            .ok_or_else(|| bucket.mismatch::<Args, Out>(name))
    }

    /// Fan-out invocation: call every hook under `name` with a clone of `args`.
    pub fn call<Args, Out>(&self, name: &str, args: Args) -> Result<Vec<Out>, PluginError>
    where
        Args: Clone + 'static,
        Out: 'static,
    {
        let hooks = self.snapshot::<Args, Out>(name)?;
        call_all(name, &hooks, args)
    }

    /// Serial-reduce invocation: thread `initial` through every hook under `name`.
    pub fn call_serial<T: 'static>(&self, name: &str, initial: T) -> Result<T, PluginError> {
        let hooks = self.snapshot::<T, T>(name)?;
        call_serial(name, &hooks, initial)
    }

    /// Get the number of hooks registered under `name`.
    pub fn len(&self, name: &str) -> usize {
        self.buckets.get(name).map_or(0, |bucket| bucket.len)
    }

    /// Check whether any hook is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.len(name) > 0
    }

    /// Signature of the hooks registered under `name`.
    pub fn signature_of(&self, name: &str) -> Option<&'static str> {
        self.buckets.get(name).map(|bucket| bucket.signature)
    }

    /// Iterate over the names that have hooks.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Call every hook in `hooks` with a clone of `args`, collecting outputs in order.
pub fn call_all<Args: Clone + 'static, Out: 'static>(
    name: &str,
    hooks: &[DynHook<Args, Out>],
    args: Args,
) -> Result<Vec<Out>, PluginError> {
    hooks
        .iter()
        .map(|hook| {
            hook.call(args.clone()).map_err(|source| PluginError::Hook {
                name: name.to_owned(),
                source,
            })
        })
        .collect()
}

/// Thread `initial` through `hooks` left to right.
pub fn call_serial<T: 'static>(
    name: &str,
    hooks: &[DynHook<T, T>],
    initial: T,
) -> Result<T, PluginError> {
    hooks.iter().try_fold(initial, |value, hook| {
        hook.call(value).map_err(|source| PluginError::Hook {
            name: name.to_owned(),
            source,
        })
    })
}
