//! `#[controller]` attribute on an inherent `impl` block.
//!
//! The block is emitted unchanged, followed by an implementation of
//! `Controller` that lists one descriptor per `pub` method with a receiver:
//!
//! - `fn(&self) -> Handler` becomes a pass-through factory;
//! - `[async] fn(&self, RequestContext, Req) -> Result<..>` becomes a callback;
//! - anything else is listed as not routable, so the resolver can log it.
//!
//! `base_path`, `middlewares` and `method_middlewares`, of any visibility,
//! feed `Controller::capabilities` instead.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, Visibility, ext::IdentExt};

use crate::{
    error::{MacroResult, err_call_site, err_spanned},
    method::{CAPABILITY_METHODS, Shape, classify_signature, to_upper_camel},
};

pub fn process_controller_attribute(
    attr: TokenStream,
    item: TokenStream,
) -> MacroResult<TokenStream> {
    if !attr.is_empty() {
        return Err(err_call_site("#[controller] takes no arguments"));
    }
    let item_impl: ItemImpl = syn::parse2(item).map_err(|e| {
        syn::Error::new(e.span(), "#[controller] can only be applied to an impl block")
    })?;
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(err_spanned(
            path,
            "#[controller] must be applied to an inherent impl block, not a trait impl",
        ));
    }

    let methods: Vec<&ImplItemFn> = item_impl
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(method) => Some(method),
            _ => None,
        })
        .collect();

    let descriptors = methods
        .iter()
        .filter(|method| !is_capability(method))
        .filter(|method| matches!(method.vis, Visibility::Public(_)))
        .filter_map(|method| descriptor(method));
    let capabilities = methods
        .iter()
        .filter(|method| is_capability(method))
        .map(|method| {
            let ident = &method.sig.ident;
            quote! { .#ident(self.#ident()) }
        });

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    Ok(quote! {
        #item_impl

        #[automatically_derived]
        impl #impl_generics ::eywa_autoroute::Controller for #self_ty #where_clause {
            fn methods(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<::eywa_autoroute::MethodDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn capabilities(&self) -> ::eywa_autoroute::Capabilities {
                ::eywa_autoroute::Capabilities::default() #(#capabilities)*
            }
        }
    })
}

/// A capability provider takes `&self` and nothing else.
fn is_capability(method: &ImplItemFn) -> bool {
    let name = method.sig.ident.unraw().to_string();
    CAPABILITY_METHODS.contains(&name.as_str())
        && method.sig.inputs.len() == 1
        && matches!(method.sig.inputs.first(), Some(FnArg::Receiver(_)))
}

fn descriptor(method: &ImplItemFn) -> Option<TokenStream> {
    let ident = &method.sig.ident;
    let name = to_upper_camel(&ident.unraw().to_string());

    let tokens = match classify_signature(&method.sig) {
        Shape::Associated => return None,
        Shape::PassThrough => quote! {
            ::eywa_autoroute::MethodDescriptor::pass_through(#name, {
                let this = ::std::sync::Arc::clone(&self);
                move || this.#ident()
            })
        },
        Shape::Callback { request, is_async } => {
            let call = if is_async {
                quote! { async move { this.#ident(ctx, req).await } }
            } else {
                quote! {{
                    let output = this.#ident(ctx, req);
                    async move { output }
                }}
            };
            quote! {
                ::eywa_autoroute::MethodDescriptor::callback(
                    #name,
                    ::std::sync::Arc::clone(&self),
                    |this: ::std::sync::Arc<Self>, ctx: ::eywa_autoroute::RequestContext, req: #request| #call,
                )
            }
        }
        Shape::NotRoutable => quote! {
            ::eywa_autoroute::MethodDescriptor::not_routable(#name)
        },
    };
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn expand(item: TokenStream) -> String {
        process_controller_attribute(TokenStream::new(), item)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_callback_and_pass_through() {
        let out = expand(quote! {
            impl Widget {
                pub async fn get_detail(&self, ctx: RequestContext, req: DetailRequest) -> Result<Detail> {
                    todo!()
                }
                pub fn get_status(&self) -> Handler {
                    todo!()
                }
            }
        });

        assert!(out.contains("impl :: eywa_autoroute :: Controller for Widget"));
        assert!(out.contains("callback (\"GetDetail\""));
        assert!(out.contains("req : DetailRequest"));
        assert!(out.contains(". await"));
        assert!(out.contains("pass_through (\"GetStatus\""));
    }

    #[test]
    fn test_hidden_and_unroutable_methods() {
        let out = expand(quote! {
            impl Widget {
                fn get_secret(&self) -> Handler { todo!() }
                pub fn new() -> Self { Widget }
                pub fn helper(&self, x: u32) -> u32 { x }
                pub fn _get_draft(&self) -> Handler { todo!() }
            }
        });

        assert!(!out.contains("GetSecret"));
        assert!(!out.contains("\"New\""));
        assert!(out.contains("not_routable (\"Helper\")"));
        assert!(out.contains("pass_through (\"_GetDraft\""));
    }

    #[test]
    fn test_capabilities() {
        let out = expand(quote! {
            impl Widget {
                fn base_path(&self) -> &str { "widgets" }
                pub fn middlewares(&self) -> Vec<Middleware> { vec![] }
            }
        });

        assert!(out.contains(". base_path (self . base_path ())"));
        assert!(out.contains(". middlewares (self . middlewares ())"));
        assert!(!out.contains("\"BasePath\""));
        assert!(!out.contains("\"Middlewares\""));
    }

    #[test]
    fn test_sync_callback_wraps_output() {
        let out = expand(quote! {
            impl Widget {
                pub fn post_item(&self, _ctx: RequestContext, req: Item) -> Result<Item> { Ok(req) }
            }
        });
        assert!(out.contains("let output = this . post_item (ctx , req)"));
    }

    #[test]
    fn test_rejects_trait_impl() {
        let err = process_controller_attribute(
            TokenStream::new(),
            quote! { impl Default for Widget { fn default() -> Self { Widget } } },
        )
        .unwrap_err();
        assert!(err.to_string().contains("inherent impl block"));
    }

    #[test]
    fn test_rejects_arguments() {
        let err = process_controller_attribute(quote!(prefix = "x"), quote! { impl Widget {} })
            .unwrap_err();
        assert!(err.to_string().contains("no arguments"));
    }
}
