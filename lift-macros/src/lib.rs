//! Procedural macros for the Lift serverless handler runtime.
//!
//! - `#[main]` -- wraps a `main` function with `#[tokio::main]`
//! - `#[handler]` -- classifies a function's shape against the six
//!   supported handler shapes at compile time and emits a `register` stub
//!   that builds the right `handler_adapter::from_*` wrapper

mod handler;
mod main_fn;

use proc_macro::TokenStream;

/// Wraps the function with `#[tokio::main]` for async runtime support.
///
/// ```rust,ignore
/// #[lift::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     lift::run(app).await
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    main_fn::main_impl(attr, item)
}

/// Classifies the decorated function against the six handler shapes (§4.4)
/// and rewrites it into a zero-argument function of the same name that
/// returns the matching `Arc<dyn Handler + Send + Sync>`. An unsupported
/// shape -- wrong argument count, a return type that isn't a `Result` -- is
/// a compile error here rather than a runtime panic at first invocation.
///
/// ```rust,ignore
/// #[lift::handler]
/// async fn create_user(input: CreateUser) -> Result<UserCreated, lift::LiftError> {
///     Ok(UserCreated { id: "u_1".into() })
/// }
///
/// app.route("POST", "/users", create_user());
/// ```
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    handler::handler_impl(attr, item)
}
