//! Standard middleware implementations.

mod guard;
mod map;
mod trace;

pub use guard::GuardMiddleware;
pub use map::{MapMiddleware, TapMiddleware};
pub use trace::TracingMiddleware;
