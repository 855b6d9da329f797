//! `#[derive(Controller)]`: the structural side of a controller.
//!
//! Named fields are recorded UpperCamelCase when `pub` and verbatim
//! otherwise. Tuple fields are named after their type and always embedded.
//! Only fields marked `#[mount]` or `#[mount(embed)]` lead to
//! sub-controllers; the type of such a field must implement `Controller`
//! and `Default`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Type, Visibility, ext::IdentExt};

use crate::{
    error::{MacroResult, err_spanned},
    method::to_upper_camel,
};

pub fn derive_controller(input: TokenStream) -> MacroResult<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let Data::Struct(data) = &input.data else {
        return Err(err_spanned(
            &input.ident,
            "#[derive(Controller)] is only supported on structs",
        ));
    };

    let fields = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| {
                let ident = field.ident.as_ref().map(|i| i.unraw().to_string());
                let ident = ident.unwrap_or_default();
                let name = match field.vis {
                    Visibility::Public(_) => to_upper_camel(&ident),
                    _ => ident,
                };
                field_descriptor(field, name, false)
            })
            .collect::<MacroResult<Vec<_>>>()?,
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let name = type_ident(&field.ty).unwrap_or_else(|| index.to_string());
                field_descriptor(field, name, true)
            })
            .collect::<MacroResult<Vec<_>>>()?,
        Fields::Unit => Vec::new(),
    };

    let ident = &input.ident;
    let type_name = ident.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::eywa_autoroute::ControllerFields for #ident #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> ::std::vec::Vec<::eywa_autoroute::FieldDescriptor> {
                ::std::vec![#(#fields),*]
            }
        }
    })
}

/// Parses `#[mount]` / `#[mount(embed)]`.
fn mount(field: &Field) -> MacroResult<Option<bool>> {
    let mut mounted = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("mount")) {
        let mut embed = false;
        if !matches!(attr.meta, syn::Meta::Path(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    embed = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown mount option, expected `embed`"))
                }
            })?;
        }
        mounted = Some(embed);
    }
    Ok(mounted)
}

fn field_descriptor(field: &Field, name: String, tuple: bool) -> MacroResult<TokenStream> {
    let Some(embed) = mount(field)? else {
        return Ok(quote! { ::eywa_autoroute::FieldDescriptor::plain(#name) });
    };
    let ty = &field.ty;
    let embedded = embed || tuple;
    Ok(quote! {
        ::eywa_autoroute::FieldDescriptor::controller::<#ty>(#name, #embedded)
    })
}

fn type_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string()),
        _ => None,
    }
}
