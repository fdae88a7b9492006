//! Soft-failure channel.
//!
//! Duplicate registrations are not errors: the runtime applies a defined
//! fallback and records a [`Diagnostic`] so callers can observe the event
//! without relying on log output.

use std::fmt;

/// A non-fatal event recorded by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A plugin with this name was already installed; the new one was discarded.
    DuplicatePlugin {
        /// The colliding plugin name.
        name: String,
    },
    /// An extension slot was overwritten; the new value replaced the old one.
    ExtensionOverwritten {
        /// The overwritten slot.
        name: String,
    },
}

impl Diagnostic {
    /// The plugin or extension name the diagnostic refers to.
    pub fn name(&self) -> &str {
        match self {
            Diagnostic::DuplicatePlugin { name } | Diagnostic::ExtensionOverwritten { name } => {
                name
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicatePlugin { name } => {
                write!(f, "plugin `{}` is already installed", name)
            }
            Diagnostic::ExtensionOverwritten { name } => {
                write!(f, "extension `{}` was overwritten", name)
            }
        }
    }
}
