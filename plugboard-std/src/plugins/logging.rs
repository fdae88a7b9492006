//! Logger capability plugin.
//!
//! [`LoggingPlugin`] publishes a shared [`Logger`] in the extension slot
//! [`LoggingPlugin::EXTENSION`]. Plugins installed after it can look the
//! logger up and write through it instead of calling `tracing` directly,
//! which keeps the logger's target consistent across plugins.
//!
//! # Configuration
//!
//! The plugin reads its [`LoggingConfig`] either from the install options
//! (`use_with(LoggingPlugin, config)`) or, when installed without options,
//! from the system options under the `"logging"` key.
//!
//! ```rust,ignore
//! let system = PluginSystem::with_options(
//!     Options::new().with("logging", json!({ "target": "api" })),
//! );
//! system.use_plugin(LoggingPlugin)?;
//!
//! let logger = system.extension::<Logger>(LoggingPlugin::EXTENSION).unwrap();
//! logger.info("ready");
//! ```

use plugboard_core::{BoxError, Context, Plugin};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Settings for the [`Logger`] capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Name recorded with every message.
    pub target: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            target: "plugboard".to_owned(),
        }
    }
}

/// A shared logger published by [`LoggingPlugin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    target: String,
}

impl Logger {
    /// Create a logger from `config`.
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            target: config.target,
        }
    }

    /// The name recorded with every message.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Log `message` at debug level.
    pub fn debug(&self, message: impl Display) {
        tracing::debug!(logger = %self.target, "{message}");
    }

    /// Log `message` at info level.
    pub fn info(&self, message: impl Display) {
        tracing::info!(logger = %self.target, "{message}");
    }

    /// Log `message` at warn level.
    pub fn warn(&self, message: impl Display) {
        tracing::warn!(logger = %self.target, "{message}");
    }

    /// Log `message` at error level.
    pub fn error(&self, message: impl Display) {
        tracing::error!(logger = %self.target, "{message}");
    }
}

/// Publishes a [`Logger`] capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPlugin;

impl LoggingPlugin {
    /// Name the plugin is registered under.
    pub const NAME: &'static str = "logger";
    /// Extension slot the [`Logger`] is published in.
    pub const EXTENSION: &'static str = "logger";
    /// Key of the system options read when no install options are given.
    pub const OPTIONS_KEY: &'static str = "logging";

    fn publish(ctx: &mut Context, config: LoggingConfig) {
        let logger = Logger::new(config);
        logger.debug("logger installed");
        ctx.extend(Self::EXTENSION, logger);
    }
}

impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn install(&self, ctx: &mut Context, _: ()) -> Result<(), BoxError> {
        let config = ctx
            .options()
            .get_as::<LoggingConfig>(Self::OPTIONS_KEY)?
            .unwrap_or_default();
        Self::publish(ctx, config);
        Ok(())
    }
}

impl Plugin<LoggingConfig> for LoggingPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn install(&self, ctx: &mut Context, config: LoggingConfig) -> Result<(), BoxError> {
        Self::publish(ctx, config);
        Ok(())
    }
}
