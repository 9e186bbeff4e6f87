//! Procedural macros for Emissary.
//!
//! - `#[derive(Request)]` - implements `emissary::Request`

use proc_macro::TokenStream;

mod request;

/// Derive macro for implementing the `Request` trait.
///
/// The response type is given with `#[request(response = Type)]` and
/// defaults to `()` when the attribute is omitted.
///
/// ```rust,ignore
/// #[derive(Request)]
/// #[request(response = User)]
/// struct GetUser {
///     id: u64,
/// }
/// ```
#[proc_macro_derive(Request, attributes(request))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    request::derive_request_impl(input)
}
