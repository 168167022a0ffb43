//! Main function macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Implementation of the `#[main]` macro: wraps the function with
/// `#[tokio::main]` so a Lambda binary's entry point doesn't have to spell
/// it out itself.
pub fn main_impl(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let expanded = quote! {
        #[::tokio::main]
        #input
    };
    TokenStream::from(expanded)
}
