//! Procedural macros for eywa-autoroute.
//!
//! - `#[derive(Controller)]` describes a controller's fields (`#[mount]`,
//!   `#[mount(embed)]` mark sub-controllers).
//! - `#[controller]` on an inherent `impl` block classifies its methods.
//! - `#[derive(Introspect)]` describes a request or response model
//!   (`#[tag(...)]` annotates fields).

use proc_macro::TokenStream;

mod controller_derive;
mod controller_impl;
mod error;
mod introspect_derive;
mod method;

#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller_impl::process_controller_attribute(attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Controller, attributes(mount))]
pub fn derive_controller(input: TokenStream) -> TokenStream {
    controller_derive::derive_controller(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Describes a request or response model for binding and documentation.
///
/// Fields accept `#[tag(key = "value", ...)]` with the keys `query`, `path`,
/// `body`, `title`, `format` and `desc` (`form`, `uri` and `json` alias the
/// first three).
///
/// `#[serde(rename)]` and `rename_all` are not read. Path and query values
/// are bound under the Rust field name unless the field carries
/// `#[tag(body = "...")]`, so a renamed field must repeat its serialized name
/// there. The `body` key also names the OpenAPI property.
#[proc_macro_derive(Introspect, attributes(tag))]
pub fn derive_introspect(input: TokenStream) -> TokenStream {
    introspect_derive::derive_introspect(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
