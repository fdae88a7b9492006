//! Logging hook for hook observation.

use plugboard_core::{BoxError, Hook};
use std::fmt::Debug;

/// A pass-through hook that logs its argument at debug level.
///
/// Returns its argument unchanged, so it can sit anywhere in a serial chain.
#[derive(Debug, Clone)]
pub struct LoggingHook {
    label: String,
}

impl LoggingHook {
    /// Create a logging hook that tags its events with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The label attached to every logged event.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: Debug + 'static> Hook<T> for LoggingHook {
    type Output = T;

    fn call(&self, args: T) -> Result<T, BoxError> {
        tracing::debug!(hook = %self.label, ?args, "hook invoked");
        Ok(args)
    }
}
