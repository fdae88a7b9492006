//! Procedural macros for plugboard.
//!
//! - `#[plugin]` - Attribute macro turning an install function into a [`Plugin`] type
//!
//! [`Plugin`]: https://docs.rs/plugboard/latest/plugboard/trait.Plugin.html

use proc_macro::TokenStream;

mod plugin;

/// Turns an install function into a unit struct implementing `Plugin`.
///
/// The function takes the context and, optionally, one options argument:
///
/// ```rust,ignore
/// #[plugin]
/// fn cors(ctx: &mut Context) -> Result<(), BoxError> {
///     ctx.use_middleware(|req: Request, next: Next<'_, Request>| next.run(req.allow_any_origin()));
///     Ok(())
/// }
///
/// #[plugin(name = "rate-limit")]
/// fn rate_limit(ctx: &mut Context, per_second: u32) -> Result<(), BoxError> {
///     ctx.extend("rate-limit", per_second);
///     Ok(())
/// }
///
/// system.use_plugin(cors)?;
/// system.use_with(rate_limit, 20)?;
/// assert!(system.has_plugin(rate_limit::NAME));
/// ```
///
/// The registered name defaults to the function name. The function may
/// return any `Result<(), E>` whose error converts into `BoxError`.
#[proc_macro_attribute]
pub fn plugin(attr: TokenStream, item: TokenStream) -> TokenStream {
    plugin::plugin_impl(attr, item)
}
