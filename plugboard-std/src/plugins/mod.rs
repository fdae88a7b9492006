//! Standard plugins.

mod logging;

pub use logging::{Logger, LoggingConfig, LoggingPlugin};
