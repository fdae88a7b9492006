//! Error types for plugboard.
//!
//! Hard failures are modelled with `thiserror`:
//!
//! - [`PluginError`] - Top-level error type returned by every fallible operation
//! - [`BoxError`] - The error type user code (installs, middleware, hooks) returns
//!
//! Soft failures (duplicate plugin names, overwritten extensions) never surface
//! here; they are recorded as [`Diagnostic`](crate::Diagnostic)s instead.

use thiserror::Error;

/// A boxed error type for errors raised by user code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all plugboard operations.
#[derive(Error, Debug)]
pub enum PluginError {
    /// A plugin's `install` routine failed.
    ///
    /// The plugin stays registered under its name.
    #[error("plugin `{plugin}` failed to install")]
    Install {
        /// Name of the plugin whose install failed.
        plugin: String,
        /// The error returned by `install`.
        #[source]
        source: BoxError,
    },

    /// A middleware in the pipeline returned an error.
    #[error(transparent)]
    Middleware(BoxError),

    /// A hook returned an error; hooks after it were not run.
    #[error("hook `{name}` failed")]
    Hook {
        /// Name of the hook bucket being invoked.
        name: String,
        /// The error returned by the hook.
        #[source]
        source: BoxError,
    },

    /// A hook was registered or invoked with a signature that differs from the
    /// one its bucket was created with.
    #[error("hook `{name}` has signature `{expected}`, got `{found}`")]
    HookSignature {
        /// Name of the hook bucket.
        name: String,
        /// Signature the bucket was created with.
        expected: &'static str,
        /// Signature used by the offending call.
        found: &'static str,
    },

    /// Options were not a JSON object.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// An option value could not be converted to the requested type.
    #[error("option conversion failed: {0}")]
    Options(#[from] serde_json::Error),
}

impl PluginError {
    /// Returns the error raised by user code, if this error wraps one.
    pub fn user_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            PluginError::Install { source, .. } | PluginError::Hook { source, .. } => {
                Some(source.as_ref())
            }
            PluginError::Middleware(source) => Some(source.as_ref()),
            PluginError::HookSignature { .. }
            | PluginError::InvalidOptions(_)
            | PluginError::Options(_) => None,
        }
    }
}
