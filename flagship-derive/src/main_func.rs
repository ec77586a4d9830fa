use std::mem;

use darling::{FromMeta, ast::NestedMeta};
use itertools::Itertools as _;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{ToTokens, quote};
use syn::{Attribute, FnArg, Ident, ItemFn, Pat, PatType, parse_quote, spanned::Spanned};

use crate::common::{
    ContainerInfo, IdentString, ParameterInfo, VerbatimExpr, compute_docs, darling_error,
    is_flag_attr, reject_generics,
};
use crate::flags::flags_impl;

enum LazyPair<T, F> {
    First(T, F),
    Second(F),
    Done,
}

impl<T, F: FnOnce() -> Option<T>> LazyPair<T, F> {
    pub fn new(first: T, second: F) -> Self {
        Self::First(first, second)
    }
}

impl<T, F: FnOnce() -> Option<T>> Iterator for LazyPair<T, F> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        match mem::replace(self, LazyPair::Done) {
            LazyPair::First(item, func) => {
                *self = LazyPair::Second(func);
                Some(item)
            }
            LazyPair::Second(func) => func(),
            LazyPair::Done => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match *self {
            Self::First(..) => (1, Some(2)),
            Self::Second(..) => (0, Some(1)),
            Self::Done => (0, Some(0)),
        }
    }
}

/// Arguments to the `#[flagship::main]` attribute itself
#[derive(FromMeta)]
struct MainArgs {
    /// The program name; defaults to the package name
    name: Option<VerbatimExpr>,

    /// A `clap::Command` to add the parameters to
    command: Option<VerbatimExpr>,

    /// The arguments to parse, in place of the process's arguments
    args: Option<VerbatimExpr>,
}

fn is_doc_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("doc")
}

/// Check if an identifer is lowercase (defined as it does NOT contain
/// any uppercase, since punctuation is fine and it doesn't have a case)
fn ident_is_lowercase(ident: &IdentString<'_>) -> bool {
    ident.as_str().chars().all(|c| !c.is_uppercase())
}

/// Given a list of identifiers, find the best one. This is the first one
/// that is all lowercase, or else just the first one in the list.
fn find_best_ident<'a>(
    options: impl IntoIterator<Item = IdentString<'a>>,
) -> Option<IdentString<'a>> {
    let mut options = options.into_iter();
    let first = options.next()?;

    Some(match ident_is_lowercase(&first) {
        true => first,
        false => options
            .find(|ident| ident_is_lowercase(ident))
            .unwrap_or(first),
    })
}

fn find_best_ident_from_pattern_list<'a>(
    option: impl IntoIterator<Item = &'a Pat>,
) -> Option<IdentString<'a>> {
    find_best_ident(option.into_iter().filter_map(get_useful_ident))
}

/// Get an ident from the pattern, which names the parameter on the command
/// line. We prefer lowercase names.
fn get_useful_ident(pattern: &Pat) -> Option<IdentString<'_>> {
    match pattern {
        Pat::Ident(pat) => match pat.subpat {
            None => Some(IdentString::new(&pat.ident)),
            Some((_, ref subpat)) => {
                find_best_ident(LazyPair::new(IdentString::new(&pat.ident), || {
                    get_useful_ident(subpat)
                }))
            }
        },
        Pat::Or(pat) => find_best_ident_from_pattern_list(&pat.cases),
        Pat::Paren(inner) => get_useful_ident(&inner.pat),
        Pat::Reference(pat) => get_useful_ident(&pat.pat),
        Pat::Slice(pat) => find_best_ident_from_pattern_list(&pat.elems),
        Pat::Struct(pat) => {
            find_best_ident_from_pattern_list(pat.fields.iter().map(|field| &*field.pat))
        }
        Pat::Tuple(pat) => find_best_ident_from_pattern_list(&pat.elems),
        Pat::TupleStruct(pat) => find_best_ident_from_pattern_list(&pat.elems),
        Pat::Type(typed) => get_useful_ident(&typed.pat),
        _ => None,
    }
}

/// Take the typed parameters out of the function signature, leaving it
/// with none.
fn take_parameters(function: &mut ItemFn) -> syn::Result<Vec<PatType>> {
    mem::take(&mut function.sig.inputs)
        .into_iter()
        .map(|arg| match arg {
            FnArg::Typed(arg) => Ok(arg),
            FnArg::Receiver(receiver) => Err(syn::Error::new(
                receiver.span(),
                "#[flagship::main] can't be used on methods",
            )),
        })
        .collect()
}

pub fn decorate_fn_main(attrs: TokenStream2, function: TokenStream2) -> syn::Result<TokenStream2> {
    let args = NestedMeta::parse_meta_list(attrs)?;
    let args = MainArgs::from_list(&args).map_err(darling_error)?;

    let mut function: ItemFn = syn::parse2(function)?;
    reject_generics(&function.sig.generics, "functions")?;

    let inputs = take_parameters(&mut function)?;

    if let Some(weird) = inputs
        .iter()
        .flat_map(|input| &input.attrs)
        .find(|attr| !is_flag_attr(attr) && !is_doc_attr(attr))
    {
        return Err(syn::Error::new(
            weird.span(),
            "unrecognized attribute on a #[flagship::main] parameter",
        ));
    }

    let idents = inputs
        .iter()
        .map(|input| {
            get_useful_ident(&input.pat).ok_or_else(|| {
                syn::Error::new(
                    input.pat.span(),
                    "this parameter needs a name to be used on the command line",
                )
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    if let Some(duplicate) = idents
        .iter()
        .duplicates_by(|ident| ident.as_str().to_owned())
        .next()
    {
        return Err(syn::Error::new(
            duplicate.span(),
            format!(
                "more than one parameter is named `{}`",
                duplicate.as_str()
            ),
        ));
    }

    let params = idents
        .iter()
        .zip(&inputs)
        .map(|(ident, input)| ParameterInfo::new(ident.raw(), &input.ty, &input.attrs))
        .collect::<syn::Result<Vec<_>>>()?;

    let container = ContainerInfo {
        name: Some(match args.name {
            Some(name) => name.0,
            None => parse_quote! { ::core::env!("CARGO_PKG_NAME") },
        }),
        docs: compute_docs(&function.attrs)?,
    };

    let arguments = Ident::new("__FlagshipArguments", Span::mixed_site());
    let parsed = Ident::new("parsed", Span::mixed_site());

    let implementation = flags_impl(&arguments, &container, &params);

    let fields = idents.iter().map(|ident| ident.raw()).collect_vec();
    let types = inputs.iter().map(|input| &input.ty);
    let patterns = inputs.iter().map(|input| &input.pat);

    let base = match args.command {
        Some(command) => command.into_token_stream(),
        None => quote! { <#arguments as ::flagship::Flags>::base_command() },
    };

    let parse = match args.args {
        Some(args) => quote! {
            <#arguments as ::flagship::Flags>::parse_with_from(#base, #args)
        },
        None => quote! {
            <#arguments as ::flagship::Flags>::parse_with(#base)
        },
    };

    let stmts = mem::take(&mut function.block.stmts);

    *function.block = parse_quote! {{
        struct #arguments {
            #(#fields: #types,)*
        }

        #implementation

        let (#(#patterns,)*) = {
            let #parsed = #parse;
            (#(#parsed.#fields,)*)
        };

        #(#stmts)*
    }};

    Ok(function.into_token_stream())
}

#[cfg(test)]
mod tests {
    use syn::parse::Parser as _;

    use super::*;

    fn decorate(attrs: TokenStream2, function: TokenStream2) -> syn::Result<ItemFn> {
        decorate_fn_main(attrs, function).and_then(syn::parse2)
    }

    #[test]
    fn removes_parameters() {
        let function = decorate(
            quote! {},
            quote! {
                /// Does a thing
                fn main(#[flag(help = "the first")] p1: i32, mut p2: Vec<f32>) {
                    p2.push(p1 as f32);
                }
            },
        )
        .unwrap();

        assert!(function.sig.inputs.is_empty());

        let body = function.block.to_token_stream().to_string();
        assert!(body.contains("struct __FlagshipArguments"));
        assert!(body.contains("\"the first\""));
        assert!(body.contains("\"Does a thing\""));
        assert!(body.contains("CARGO_PKG_NAME"));
        assert!(body.contains("parse_with ("));
    }

    #[test]
    fn macro_arguments() {
        let function = decorate(
            quote! { name = "demo", args = ["demo", "3"] },
            quote! {
                fn main(count: u32) {}
            },
        )
        .unwrap();

        let body = function.block.to_token_stream().to_string();
        assert!(body.contains("parse_with_from"));
        assert!(body.contains("\"demo\""));
        assert!(!body.contains("CARGO_PKG_NAME"));
    }

    #[test]
    fn keeps_async_and_return_type() {
        let function = decorate(
            quote! {},
            quote! {
                async fn main(count: u32) -> Result<(), ()> { Ok(()) }
            },
        )
        .unwrap();

        assert!(function.sig.asyncness.is_some());
        assert!(matches!(function.sig.output, syn::ReturnType::Type(..)));
    }

    #[test]
    fn names_come_from_patterns() {
        let pattern: Pat = Pat::parse_single.parse2(quote! { (Big, small) }).unwrap();
        assert_eq!(get_useful_ident(&pattern).unwrap().as_str(), "small");

        let pattern: Pat = Pat::parse_single.parse2(quote! { r#type }).unwrap();
        assert_eq!(get_useful_ident(&pattern).unwrap().as_str(), "type");
    }

    #[test]
    fn rejects_wildcards() {
        let err = decorate(quote! {}, quote! { fn main(_: u32) {} }).unwrap_err();
        assert!(err.to_string().contains("needs a name"));
    }

    #[test]
    fn rejects_receivers() {
        assert!(decorate(quote! {}, quote! { fn main(&self) {} }).is_err());
    }

    #[test]
    fn rejects_generics() {
        assert!(decorate(quote! {}, quote! { fn main<T>(value: T) {} }).is_err());
    }

    #[test]
    fn rejects_unknown_attributes() {
        let err = decorate(quote! {}, quote! { fn main(#[arg] value: u32) {} }).unwrap_err();
        assert!(err.to_string().contains("unrecognized attribute"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = decorate(
            quote! {},
            quote! { fn main(value: u32, (value, other): (u32, u32)) {} },
        )
        .unwrap_err();

        assert!(err.to_string().contains("`value`"));
    }

    #[test]
    fn rejects_unknown_macro_arguments() {
        assert!(decorate(quote! { leak }, quote! { fn main(value: u32) {} }).is_err());
    }
}
