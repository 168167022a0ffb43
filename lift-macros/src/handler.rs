//! The `#[handler]` macro: classifies a function against the six handler
//! shapes (§4.4) at compile time and rewrites it into a zero-argument
//! function returning the `Handler` built by the matching
//! `handler_adapter::from_*` constructor.

use proc_macro::TokenStream;
use quote::quote;
use syn::{FnArg, GenericArgument, ItemFn, Pat, PathArguments, ReturnType, Type};

/// Implementation of the `#[handler]` macro.
pub fn handler_impl(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(&input.sig.fn_token, "handler function must be async")
            .to_compile_error()
            .into();
    }

    let shape = match classify(&input.sig) {
        Ok(shape) => shape,
        Err(err) => return err.to_compile_error().into(),
    };

    let fn_name = &input.sig.ident;
    let fn_vis = &input.vis;
    let fn_block = &input.block;

    let constructor = quote::format_ident!(
        "{}",
        match (&shape.base, shape.returns_unit) {
            (Base::Noop, true) => "from_noop",
            (Base::Noop, false) => "from_noop_result",
            (Base::Context(..), true) => "from_context",
            (Base::Context(..), false) => "from_context_result",
            (Base::Input(..), true) => "from_input",
            (Base::Input(..), false) => "from_input_result",
        }
    );

    let closure = match &shape.base {
        Base::Noop => quote! { || async move #fn_block },
        Base::Context(pat, ty) | Base::Input(pat, ty) => quote! { |#pat: #ty| async move #fn_block },
    };

    let expanded = quote! {
        #[doc = concat!("Generated by `#[lift::handler]` on `", stringify!(#fn_name), "`.")]
        #fn_vis fn #fn_name() -> ::std::sync::Arc<dyn ::lift::Handler + Send + Sync> {
            ::lift::handler_adapter::#constructor(#closure)
        }
    };

    TokenStream::from(expanded)
}

struct ClassifiedShape {
    base: Base,
    returns_unit: bool,
}

enum Base {
    Noop,
    Context(Box<Pat>, Box<Type>),
    Input(Box<Pat>, Box<Type>),
}

fn classify(sig: &syn::Signature) -> syn::Result<ClassifiedShape> {
    let returns_unit = match &sig.output {
        ReturnType::Type(_, ty) => result_ok_is_unit(ty)?,
        ReturnType::Default => {
            return Err(syn::Error::new_spanned(
                sig,
                "handler function must return Result<(), E> or Result<R, E>",
            ))
        }
    };

    let inputs: Vec<_> = sig.inputs.iter().collect();
    let base = match inputs.len() {
        0 => Base::Noop,
        1 => match inputs[0] {
            FnArg::Typed(pat_type) => {
                if is_mut_context_ref(&pat_type.ty) {
                    Base::Context(pat_type.pat.clone(), pat_type.ty.clone())
                } else {
                    Base::Input(pat_type.pat.clone(), pat_type.ty.clone())
                }
            }
            FnArg::Receiver(_) => {
                return Err(syn::Error::new_spanned(&inputs[0], "handler function must not take `self`"))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.inputs,
                "handler function must take zero arguments or exactly one (either `&mut Context` or an input value)",
            ))
        }
    };

    Ok(ClassifiedShape { base, returns_unit })
}

fn is_mut_context_ref(ty: &Type) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    if reference.mutability.is_none() {
        return false;
    }
    matches!(&*reference.elem, Type::Path(path) if path.path.segments.last().map(|s| s.ident == "Context").unwrap_or(false))
}

/// Returns whether a `Result<T, E>` return type's `T` is `()`.
fn result_ok_is_unit(ty: &Type) -> syn::Result<bool> {
    let Type::Path(path) = ty else {
        return Err(syn::Error::new_spanned(ty, "handler function must return Result<(), E> or Result<R, E>"));
    };
    let segment = path
        .path
        .segments
        .last()
        .ok_or_else(|| syn::Error::new_spanned(ty, "handler function must return Result<(), E> or Result<R, E>"))?;
    if segment.ident != "Result" {
        return Err(syn::Error::new_spanned(ty, "handler function must return Result<(), E> or Result<R, E>"));
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Err(syn::Error::new_spanned(ty, "Result must carry an Ok type argument"));
    };
    let ok_arg = args
        .args
        .first()
        .ok_or_else(|| syn::Error::new_spanned(ty, "Result must carry an Ok type argument"))?;
    let GenericArgument::Type(ok_ty) = ok_arg else {
        return Err(syn::Error::new_spanned(ok_arg, "Result's first argument must be a type"));
    };
    Ok(matches!(ok_ty, Type::Tuple(tuple) if tuple.elems.is_empty()))
}
