//! Compile-time classification of controller method signatures.

use syn::{FnArg, GenericArgument, PathArguments, ReturnType, Signature, Type};

/// Inherent methods that provide controller capabilities instead of routes.
pub const CAPABILITY_METHODS: &[&str] = &["base_path", "middlewares", "method_middlewares"];

/// Routing shape of one method signature.
#[derive(Debug, PartialEq)]
pub enum Shape<'a> {
    /// No receiver: an associated function, invisible to routing.
    Associated,
    /// `fn(&self) -> Handler`.
    PassThrough,
    /// `[async] fn(&self, ctx: RequestContext, req: Req) -> Result<..>`.
    Callback { request: &'a Type, is_async: bool },
    NotRoutable,
}

/// Classifies `sig` by receiver, parameters and return type.
pub fn classify_signature(sig: &Signature) -> Shape<'_> {
    let mut inputs = sig.inputs.iter();
    let Some(FnArg::Receiver(receiver)) = inputs.next() else {
        return Shape::Associated;
    };
    let shared_ref = receiver.reference.is_some()
        && receiver.mutability.is_none()
        && receiver.colon_token.is_none();
    if !shared_ref || !sig.generics.params.is_empty() || sig.variadic.is_some() {
        return Shape::NotRoutable;
    }

    let params: Vec<&Type> = inputs
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(pat.ty.as_ref()),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let ReturnType::Type(_, output) = &sig.output else {
        return Shape::NotRoutable;
    };

    match params.as_slice() {
        [] if sig.asyncness.is_none() && last_ident(output).is_some_and(|id| id == "Handler") => {
            Shape::PassThrough
        }
        [ctx, request]
            if last_ident(ctx).is_some_and(|id| id == "RequestContext")
                && !matches!(request, Type::ImplTrait(_))
                && is_result(output) =>
        {
            Shape::Callback {
                request: *request,
                is_async: sig.asyncness.is_some(),
            }
        }
        _ => Shape::NotRoutable,
    }
}

/// `get_detail` -> `GetDetail`. Leading underscores are kept, so `_get_x`
/// stays unexported as `_GetX`.
pub fn to_upper_camel(identifier: &str) -> String {
    let rest = identifier.trim_start_matches('_');
    let leading = &identifier[..identifier.len() - rest.len()];
    let camel: String = rest
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("{leading}{camel}")
}

fn last_ident(ty: &Type) -> Option<&syn::Ident> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|seg| &seg.ident),
        Type::Paren(inner) => last_ident(&inner.elem),
        Type::Group(inner) => last_ident(&inner.elem),
        _ => None,
    }
}

/// `Result<T>` or `Result<T, E>`, under any path.
fn is_result(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Result" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    let types = args
        .args
        .iter()
        .filter(|arg| matches!(arg, GenericArgument::Type(_)))
        .count();
    (1..=2).contains(&types)
}
