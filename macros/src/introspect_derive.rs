//! `#[derive(Introspect)]` for request and response models.
//!
//! Structs describe themselves as composites, field by field, with the
//! annotations given through `#[tag(key = "value", ...)]`. Enums describe
//! themselves as scalars.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericParam, LitStr, ext::IdentExt, parse_quote};

use crate::error::{MacroResult, err_spanned};

/// Accepted `#[tag]` keys; `form`, `uri` and `json` alias `query`, `path`
/// and `body`.
const TAG_KEYS: &[&str] = &[
    "query", "path", "body", "title", "format", "desc", "form", "uri", "json",
];

pub fn derive_introspect(input: TokenStream) -> MacroResult<TokenStream> {
    let mut input: DeriveInput = syn::parse2(input)?;
    let ident = input.ident.clone();

    let type_params: Vec<syn::Ident> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(param) = param {
            param.bounds.push(parse_quote!(::eywa_autoroute::Introspect));
        }
    }

    let bare = ident.unraw().to_string();
    let name = if type_params.is_empty() {
        quote! { #bare }
    } else {
        quote! {
            ::std::format!(
                "{}<{}>",
                #bare,
                [#(<#type_params as ::eywa_autoroute::Introspect>::describe().name),*].join(", ")
            )
        }
    };

    let body = match &input.data {
        Data::Struct(data) => {
            let fields = data
                .fields
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    let field_name = match &field.ident {
                        Some(ident) => ident.unraw().to_string(),
                        None => index.to_string(),
                    };
                    let ty = &field.ty;
                    let tags = tags(field)?;
                    let tags = tags.iter().map(|(key, value)| quote! { (#key, #value) });
                    Ok(quote! {
                        ::eywa_autoroute::StructField::new(
                            #field_name,
                            <#ty as ::eywa_autoroute::Introspect>::describe,
                            &[#(#tags),*],
                        )
                    })
                })
                .collect::<MacroResult<Vec<_>>>()?;
            if matches!(data.fields, Fields::Unit) {
                quote! { ::eywa_autoroute::TypeDesc::composite(#name, ::std::vec::Vec::new) }
            } else {
                quote! {
                    ::eywa_autoroute::TypeDesc::composite(#name, || ::std::vec![#(#fields),*])
                }
            }
        }
        Data::Enum(_) => quote! { ::eywa_autoroute::TypeDesc::scalar(#name) },
        Data::Union(_) => {
            return Err(err_spanned(
                &input.ident,
                "#[derive(Introspect)] is not supported on unions",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::eywa_autoroute::Introspect for #ident #ty_generics #where_clause {
            fn describe() -> ::eywa_autoroute::TypeDesc {
                #body
            }
        }
    })
}

/// Collects every `#[tag(key = "value")]` pair of a field, in order.
fn tags(field: &syn::Field) -> MacroResult<Vec<(String, String)>> {
    let mut tags = Vec::new();
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("tag")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|ident| ident.to_string())
                .filter(|key| TAG_KEYS.contains(&key.as_str()))
                .ok_or_else(|| {
                    meta.error(format!(
                        "unknown tag key, expected one of: {}",
                        TAG_KEYS.join(", ")
                    ))
                })?;
            let value: LitStr = meta.value()?.parse()?;
            tags.push((key, value.value()));
            Ok(())
        })?;
    }
    Ok(tags)
}
