use heck::ToKebabCase as _;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, spanned::Spanned as _};

use crate::common::{ContainerInfo, FieldDefault, OptionTag, ParameterInfo, reject_generics};

fn position_tokens(tags: Option<&OptionTag>) -> TokenStream2 {
    let Some(tags) = tags else {
        return quote! { ::flagship::flag::Position::Positional };
    };

    let long = match tags.long() {
        Some(long) => {
            let long = *long;
            quote! {
                ::core::option::Option::Some(::std::borrow::Cow::Borrowed(#long))
            }
        }
        None => quote! { ::core::option::Option::None },
    };

    let short = match tags.short() {
        Some(short) => {
            let short = *short;
            quote! { ::core::option::Option::Some(#short) }
        }
        None => quote! { ::core::option::Option::None },
    };

    quote! {
        ::flagship::flag::Position::Named {
            long: #long,
            short: #short,
        }
    }
}

fn default_expr(param: &ParameterInfo<'_>) -> Option<TokenStream2> {
    let ty = param.ty;

    match param.default {
        FieldDefault::None => None,
        FieldDefault::Trait => Some(quote! { <#ty as ::core::default::Default>::default() }),
        FieldDefault::Expr(ref expr) => Some(quote! { #expr }),
    }
}

/// The expression that builds the `FlagSpec` for one parameter
fn flag_spec(param: &ParameterInfo<'_>) -> TokenStream2 {
    let ty = param.ty;
    let id = param.ident.as_str();
    let help = param.help.as_str();
    let position = position_tokens(param.tags.as_ref());

    // Mixed-site so that user-provided defaults can't see it
    let spec = Ident::new("spec", Span::mixed_site());

    let default = default_expr(param).map(|default| {
        quote! {
            let #spec = #spec.with_default::<#ty>(&(#default));
        }
    });

    let choices = param.choices.as_ref().map(|choices| {
        quote! {
            let #spec = #spec.with_choices(&[#(#choices,)*]);
        }
    });

    let placeholder = param.placeholder.as_ref().map(|placeholder| {
        let placeholder = placeholder.as_str();
        quote! {
            let #spec = #spec.with_placeholder(#placeholder);
        }
    });

    quote! {
        {
            let #spec = ::flagship::flag::FlagSpec::of::<#ty>(#id, #position, #help);
            #default
            #choices
            #placeholder
            #spec
        }
    }
}

/// The expression that extracts one parameter from `matches`
fn extraction(param: &ParameterInfo<'_>, matches: &Ident) -> TokenStream2 {
    let ty = param.ty;
    let id = param.ident.as_str();

    let default = match default_expr(param) {
        Some(default) => quote! { ::core::option::Option::Some(|| -> #ty { #default }) },
        None => quote! { ::core::option::Option::None::<fn() -> #ty> },
    };

    quote! {
        ::flagship::command::extract::<#ty, _>(#matches, #id, #default)?
    }
}

/// Generate the `Flags` implementation for `ident`, a struct with named
/// fields described by `params`.
pub fn flags_impl(
    ident: &Ident,
    container: &ContainerInfo,
    params: &[ParameterInfo<'_>],
) -> TokenStream2 {
    let name = ident.to_string();
    let description = container.docs.as_str();

    let command_name = match container.name {
        Some(ref name) => quote! { #name },
        None => {
            let name = name.to_kebab_case();
            quote! { #name }
        }
    };

    let matches = Ident::new("matches", ident.span());

    let specs = params.iter().map(flag_spec);

    let fields = params.iter().map(|param| {
        let field = &param.ident;
        let value = extraction(param, &matches);

        quote! { #field: #value }
    });

    quote! {
        impl ::flagship::Flags for #ident {
            const NAME: &'static str = #name;
            const COMMAND_NAME: &'static str = #command_name;
            const DESCRIPTION: &'static str = #description;

            fn flags() -> ::std::vec::Vec<::flagship::flag::FlagSpec> {
                ::std::vec![#(#specs,)*]
            }

            fn from_matches(
                #matches: &::flagship::clap::ArgMatches,
            ) -> ::core::result::Result<Self, ::flagship::Error> {
                ::core::result::Result::Ok(Self {
                    #(#fields,)*
                })
            }
        }
    }
}

pub fn derive_flags_result(item: TokenStream2) -> syn::Result<TokenStream2> {
    let input: DeriveInput = syn::parse2(item)?;
    reject_generics(&input.generics, "types")?;

    let fields = match input.data {
        Data::Struct(ref data) => match data.fields {
            Fields::Named(ref fields) => &fields.named,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(syn::Error::new(
                    input.span(),
                    "`derive(Flags)` requires a struct with named fields",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "can't derive `Flags` on an enum",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "can't derive `Flags` on a union",
            ));
        }
    };

    let container = ContainerInfo::new(&input.attrs)?;

    let params = fields
        .iter()
        .map(|field| {
            let ident = field.ident.as_ref().ok_or_else(|| {
                syn::Error::new(field.span(), "`derive(Flags)` fields must be named")
            })?;

            ParameterInfo::new(ident, &field.ty, &field.attrs)
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(flags_impl(&input.ident, &container, &params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(item: TokenStream2) -> syn::ItemImpl {
        let tokens = derive_flags_result(item).unwrap();
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn derives_an_impl() {
        let item = expand(quote! {
            /// The model
            struct Model {
                /// Number of layers
                #[flag(default = 4)]
                layers: u32,
                path: ::std::path::PathBuf,
            }
        });

        let trait_path = item.trait_.unwrap().1;
        assert!(trait_path.segments.last().unwrap().ident == "Flags");

        let items = &item.items;
        let rendered = quote! { #(#items)* }.to_string();
        assert!(rendered.contains("\"Number of layers\""));
        assert!(rendered.contains("\"The model\""));
        assert!(rendered.contains("\"model\""));
        assert!(rendered.contains("Position :: Named"));
        assert!(rendered.contains("Position :: Positional"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let err = derive_flags_result(quote! {
            struct Model(u32);
        })
        .unwrap_err();

        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn rejects_generics() {
        assert!(
            derive_flags_result(quote! {
                struct Model<T> { layers: T }
            })
            .is_err()
        );
    }

    #[test]
    fn rejects_bad_long() {
        let err = derive_flags_result(quote! {
            struct Model {
                #[flag(long = "--layers")]
                layers: u32,
            }
        })
        .unwrap_err();

        assert!(err.to_string().contains("don't need to start with --"));
    }
}
