//! Span-carrying errors for the macro expansions.
//!
//! Every expansion returns [`MacroResult`]; the entry points in `lib.rs` turn
//! an error into a `compile_error!` at the reported span.

use proc_macro2::Span;
use quote::ToTokens;
use syn::Error;

/// Result type for all macro operations.
pub type MacroResult<T> = Result<T, Error>;

/// Create an error at the call site.
#[inline]
pub fn err_call_site<M: std::fmt::Display>(message: M) -> Error {
    Error::new(Span::call_site(), message)
}

/// Create an error spanning `tokens`.
#[inline]
pub fn err_spanned<T: ToTokens, M: std::fmt::Display>(tokens: T, message: M) -> Error {
    Error::new_spanned(tokens, message)
}
