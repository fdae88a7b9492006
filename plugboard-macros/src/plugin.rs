//! Plugin-related macros.
//!
//! This module contains:
//! - `#[plugin]` - Attribute macro for creating Plugin implementations from functions

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, FnArg, Ident, ItemFn, LitStr, ReturnType, Token, Type, parse::Parse,
    parse_macro_input,
};

type TokenStream2 = proc_macro2::TokenStream;

/// Arguments for the `#[plugin]` macro.
pub(crate) struct PluginArgs {
    pub name: Option<String>,
}

impl Parse for PluginArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(PluginArgs { name })
    }
}

/// Implementation of the `#[plugin]` macro.
pub fn plugin_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as PluginArgs);
    let input = parse_macro_input!(item as ItemFn);

    expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Expands an install function into a plugin type.
pub(crate) fn expand(args: PluginArgs, input: ItemFn) -> syn::Result<TokenStream2> {
    let fn_name = &input.sig.ident;
    let fn_vis = &input.vis;

    // `doc` and `cfg` go on the struct, everything else on the install fn.
    let (type_attrs, fn_attrs): (Vec<&Attribute>, Vec<&Attribute>) = input
        .attrs
        .iter()
        .partition(|attr| attr.path().is_ident("doc") || attr.path().is_ident("cfg"));
    let cfg_attrs: Vec<&Attribute> = type_attrs
        .iter()
        .copied()
        .filter(|attr| attr.path().is_ident("cfg"))
        .collect();

    if let Some(asyncness) = &input.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "Plugin install function must not be async",
        ));
    }

    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.sig.generics,
            "Plugin install function must not be generic",
        ));
    }

    if let ReturnType::Default = input.sig.output {
        return Err(syn::Error::new_spanned(
            input.sig.fn_token,
            "Plugin install function must return Result<(), E>",
        ));
    }

    let inputs = &input.sig.inputs;
    for arg in inputs {
        if let FnArg::Receiver(receiver) = arg {
            return Err(syn::Error::new_spanned(
                receiver,
                "Plugin install function cannot take self",
            ));
        }
    }

    match inputs.first() {
        Some(FnArg::Typed(pat_type)) => match &*pat_type.ty {
            Type::Reference(type_ref) if type_ref.mutability.is_some() => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "Plugin context argument must be a mutable reference (&mut Context)",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.sig.ident,
                "Plugin install function must take a context argument: fn(ctx: &mut Context)",
            ));
        }
    }

    let options_type: TokenStream2 = match (inputs.len(), inputs.iter().nth(1)) {
        (1, _) => quote! { () },
        (2, Some(FnArg::Typed(pat_type))) => {
            let ty = &pat_type.ty;
            if let Type::ImplTrait(_) | Type::Infer(_) = &**ty {
                return Err(syn::Error::new_spanned(
                    ty,
                    "Plugin options argument must have a concrete type, not `impl Trait` or `_`",
                ));
            }
            quote! { #ty }
        }
        _ => {
            return Err(syn::Error::new_spanned(
                inputs,
                "Plugin install function must take fn(ctx: &mut Context) or fn(ctx: &mut Context, options: T)",
            ));
        }
    };

    let call = if inputs.len() == 1 {
        quote! { __install(ctx) }
    } else {
        quote! { __install(ctx, options) }
    };
    let options_pat = if inputs.len() == 1 {
        quote! { _options }
    } else {
        quote! { options }
    };

    let plugin_name = args.name.unwrap_or_else(|| fn_name.to_string());
    let sig_inputs = inputs;
    let sig_output = &input.sig.output;
    let fn_block = &input.block;

    Ok(quote! {
        #(#type_attrs)*
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #fn_vis struct #fn_name;

        #(#cfg_attrs)*
        impl #fn_name {
            /// The name this plugin is registered under.
            pub const NAME: &'static str = #plugin_name;
        }

        #(#cfg_attrs)*
        impl ::plugboard::Plugin<#options_type> for #fn_name {
            fn name(&self) -> &str {
                Self::NAME
            }

            fn install(
                &self,
                ctx: &mut ::plugboard::Context,
                #options_pat: #options_type,
            ) -> ::core::result::Result<(), ::plugboard::BoxError> {
                #(#fn_attrs)*
                fn __install(#sig_inputs) #sig_output #fn_block

                ::core::result::Result::map_err(#call, ::core::convert::Into::into)
            }
        }
    })
}
