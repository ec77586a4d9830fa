mod common;
mod flags;
mod main_func;
mod value;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

fn expand(result: syn::Result<TokenStream2>) -> TokenStream {
    match result {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `flagship::Flags` for a struct with named fields. Each field is
/// a parameter, described by its doc comment and `#[flag(...)]` attributes.
#[proc_macro_derive(Flags, attributes(flag, flags))]
pub fn derive_flags(item: TokenStream) -> TokenStream {
    expand(flags::derive_flags_result(item.into()))
}

/// Derive `flagship::parameter::Value` for an enum of unit variants (a
/// choice between the variant names) or a newtype struct.
#[proc_macro_derive(Value)]
pub fn derive_value(item: TokenStream) -> TokenStream {
    expand(value::derive_value_result(item.into()))
}

/// Turn the parameters of `main` into command-line parameters.
#[proc_macro_attribute]
pub fn main(attrs: TokenStream, function: TokenStream) -> TokenStream {
    expand(main_func::decorate_fn_main(attrs.into(), function.into()))
}
