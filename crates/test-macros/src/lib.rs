//! `#[store_test]`: async integration tests on one shared Tokio runtime.
//!
//! The attribute rewrites an `async fn` into a plain `#[test]` whose body is
//! driven by `crate::common::run_test`, so every test in a binary shares the
//! runtime that owns the store handles.
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, ItemFn, Meta};

fn reject(span: proc_macro2::Span, message: &str) -> TokenStream {
    syn::Error::new(span, message).to_compile_error().into()
}

/// Runs an argument-free, non-generic `async fn` as a test on the shared runtime.
#[proc_macro_attribute]
pub fn store_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    parse_macro_input!(attr as syn::parse::Nothing);

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(item as ItemFn);

    if sig.asyncness.is_none() {
        return reject(sig.span(), "store_test expects an async fn");
    }
    if !sig.inputs.is_empty() {
        return reject(sig.inputs.span(), "store_test functions take no arguments");
    }
    if !sig.generics.params.is_empty() {
        return reject(sig.generics.span(), "store_test functions cannot be generic");
    }

    let name = sig.ident;
    let output = sig.output;
    let attrs = attrs
        .into_iter()
        .filter(|attr| !matches!(attr.meta, Meta::Path(ref path) if path.is_ident("store_test")));

    TokenStream::from(quote! {
        #(#attrs)*
        #[test]
        #vis fn #name() #output {
            crate::common::run_test(async #block)
        }
    })
}
