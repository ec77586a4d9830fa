use heck::ToKebabCase as _;
use itertools::Itertools as _;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, Ident, Token, Variant, punctuated::Punctuated, spanned::Spanned,
};

use crate::common::reject_generics;

/// The unit variants of an enum, paired with their command-line names
pub struct AnalyzedEnum<'a> {
    pub variants: Vec<(String, &'a Ident)>,
}

impl<'a> AnalyzedEnum<'a> {
    pub fn from_variants(variants: impl IntoIterator<Item = &'a Variant>) -> syn::Result<Self> {
        let variants = variants
            .into_iter()
            .map(|variant| match variant.fields {
                Fields::Unit => Ok((variant.ident.to_string().to_kebab_case(), &variant.ident)),
                Fields::Named(_) | Fields::Unnamed(_) => Err(syn::Error::new(
                    variant.span(),
                    "`derive(Value)` enums can only have unit variants",
                )),
            })
            .collect::<syn::Result<Vec<_>>>()?;

        if let Some((name, variant)) = variants.iter().duplicates_by(|(name, _)| name.clone()).next() {
            return Err(syn::Error::new(
                variant.span(),
                format!("more than one variant is named {name:?} on the command line"),
            ));
        }

        Ok(AnalyzedEnum { variants })
    }
}

fn derive_value_enum(
    ident: &Ident,
    variants: &Punctuated<Variant, Token![,]>,
) -> syn::Result<TokenStream2> {
    let analyzed = AnalyzedEnum::from_variants(variants)?;

    if analyzed.variants.is_empty() {
        return Err(syn::Error::new(
            ident.span(),
            "can't derive `Value` on an enum with no variants",
        ));
    }

    let type_name = ident.to_string();
    let names = analyzed.variants.iter().map(|(name, _)| name.as_str());

    let parse_arms = analyzed.variants.iter().map(|(name, variant)| {
        quote! {
            #name => ::core::result::Result::Ok(Self::#variant),
        }
    });

    let render_arms = analyzed.variants.iter().map(|(name, variant)| {
        quote! {
            Self::#variant => ::std::string::String::from(#name),
        }
    });

    Ok(quote! {
        impl ::flagship::parameter::Value for #ident {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#type_name)
            }

            fn choices() -> ::core::option::Option<&'static [&'static str]> {
                ::core::option::Option::Some(&[#(#names,)*])
            }

            fn from_arg(
                argument: &str,
            ) -> ::core::result::Result<Self, ::flagship::ParameterError> {
                match argument {
                    #(#parse_arms)*
                    _ => ::core::result::Result::Err(::flagship::ParameterError::ShouldBe {
                        arg: ::std::string::String::from(argument),
                        expected: <Self as ::flagship::parameter::Value>::choices()
                            .unwrap_or(&[]),
                    }),
                }
            }

            fn render(&self) -> ::std::string::String {
                match *self {
                    #(#render_arms)*
                }
            }
        }
    })
}

fn derive_value_newtype(ident: &Ident, field: Option<&Ident>, ty: &syn::Type) -> TokenStream2 {
    let (struct_body, access) = match field {
        Some(field) => (quote! { { #field: value } }, quote! { #field }),
        None => (quote! { ( value ) }, quote! { 0 }),
    };

    quote! {
        impl ::flagship::parameter::Value for #ident {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                <#ty as ::flagship::parameter::Value>::type_name()
            }

            fn choices() -> ::core::option::Option<&'static [&'static str]> {
                <#ty as ::flagship::parameter::Value>::choices()
            }

            fn from_arg(
                argument: &str,
            ) -> ::core::result::Result<Self, ::flagship::ParameterError> {
                match <#ty as ::flagship::parameter::Value>::from_arg(argument) {
                    ::core::result::Result::Ok(value) => ::core::result::Result::Ok(
                        Self #struct_body
                    ),
                    ::core::result::Result::Err(err) => ::core::result::Result::Err(err),
                }
            }

            fn render(&self) -> ::std::string::String {
                <#ty as ::flagship::parameter::Value>::render(&self.#access)
            }
        }
    }
}

pub fn derive_value_result(item: TokenStream2) -> syn::Result<TokenStream2> {
    let input: DeriveInput = syn::parse2(item)?;
    reject_generics(&input.generics, "types")?;

    match input.data {
        Data::Struct(ref data) => {
            let field = data.fields.iter().exactly_one().map_err(|_| {
                syn::Error::new(
                    input.span(),
                    "can only derive `Value` on structs with exactly one field",
                )
            })?;

            Ok(derive_value_newtype(
                &input.ident,
                field.ident.as_ref(),
                &field.ty,
            ))
        }
        Data::Enum(ref data) => derive_value_enum(&input.ident, &data.variants),
        Data::Union(_) => Err(syn::Error::new(
            input.span(),
            "can't derive `Value` on a union",
        )),
    }
}
