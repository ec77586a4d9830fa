use darling::{
    FromAttributes as _, FromMeta,
    util::{Override, SpannedValue},
};
use heck::ToKebabCase as _;
use itertools::Itertools as _;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::ToTokens;
use syn::{Attribute, Expr, Generics, Ident, LitStr, Type, ext::IdentExt as _, spanned::Spanned as _};

pub struct IdentString<'a> {
    raw: &'a Ident,
    string: String,
}

impl<'a> IdentString<'a> {
    pub fn new(ident: &'a Ident) -> Self {
        Self {
            string: ident.unraw().to_string(),
            raw: ident,
        }
    }

    pub fn as_str(&self) -> &str {
        self.string.as_str()
    }

    pub fn raw(&self) -> &'a Ident {
        self.raw
    }

    pub fn span(&self) -> Span {
        self.raw.span()
    }
}

impl ToTokens for IdentString<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        self.raw.to_tokens(tokens);
    }
}

/// An expression taken from an attribute exactly as written. darling would
/// otherwise parse the contents of string literals as expressions, which
/// breaks `default = "text"`.
#[derive(Debug, Clone)]
pub struct VerbatimExpr(pub Expr);

impl FromMeta for VerbatimExpr {
    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        Ok(Self(expr.clone()))
    }
}

impl ToTokens for VerbatimExpr {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        self.0.to_tokens(tokens);
    }
}

pub fn darling_error(error: darling::Error) -> syn::Error {
    syn::Error::new(error.span(), error)
}

#[derive(darling::FromAttributes, Debug)]
#[darling(attributes(flag))]
struct RawParsedAttr {
    long: Option<SpannedValue<Override<String>>>,
    short: Option<SpannedValue<Override<char>>>,
    default: Option<FieldDefault>,
    help: Option<String>,
    placeholder: Option<SpannedValue<String>>,
    choices: Option<VerbatimExpr>,
}

#[derive(darling::FromAttributes, Debug, Default)]
#[darling(attributes(flags))]
struct RawContainerAttr {
    name: Option<VerbatimExpr>,
}

/// The explicit value of a `long = ".."` or `short = '.'` tag, if it has one
fn explicit<T: Clone>(tag: SpannedValue<Override<T>>) -> Option<SpannedValue<T>> {
    match *tag {
        Override::Inherit => None,
        Override::Explicit(ref value) => Some(SpannedValue::new(value.clone(), tag.span())),
    }
}

/// `#[flag(default)]` uses the `Default` trait; `#[flag(default = expr)]`
/// uses `expr`, exactly as written.
#[derive(Debug)]
pub enum FieldDefault {
    None,
    Trait,
    Expr(Expr),
}

impl FromMeta for FieldDefault {
    fn from_word() -> darling::Result<Self> {
        Ok(Self::Trait)
    }

    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        Ok(Self::Expr(expr.clone()))
    }
}

pub enum OptionTag {
    Long(SpannedValue<String>),
    Short(SpannedValue<char>),
    LongShort {
        long: SpannedValue<String>,
        short: SpannedValue<char>,
    },
}

impl OptionTag {
    pub fn long(&self) -> Option<SpannedValue<&str>> {
        match *self {
            OptionTag::Long(ref long) | OptionTag::LongShort { ref long, .. } => {
                Some(SpannedValue::new(long.as_str(), long.span()))
            }
            OptionTag::Short(_) => None,
        }
    }

    pub fn short(&self) -> Option<SpannedValue<char>> {
        match *self {
            OptionTag::Short(short) | OptionTag::LongShort { short, .. } => Some(short),
            OptionTag::Long(_) => None,
        }
    }
}

/// Everything we know about a single parameter, whether it came from a
/// struct field or a function argument.
pub struct ParameterInfo<'a> {
    pub ident: IdentString<'a>,
    pub ty: &'a Type,

    /// `None` for positional parameters
    pub tags: Option<OptionTag>,
    pub default: FieldDefault,
    pub help: String,
    pub placeholder: Option<SpannedValue<String>>,
    pub choices: Option<Vec<LitStr>>,
}

impl<'a> ParameterInfo<'a> {
    pub fn new(ident: &'a Ident, ty: &'a Type, attrs: &[Attribute]) -> syn::Result<Self> {
        let parsed = RawParsedAttr::from_attributes(attrs).map_err(darling_error)?;
        let ident = IdentString::new(ident);

        let help = match parsed.help {
            Some(help) => help,
            None => compute_docs(attrs)?,
        };

        let long = parsed
            .long
            .map(|long| compute_long(explicit(long), &ident))
            .transpose()?;

        let short = parsed
            .short
            .map(|short| compute_short(explicit(short), &ident))
            .transpose()?;

        let default = parsed.default.unwrap_or(FieldDefault::None);

        let placeholder = parsed
            .placeholder
            .map(check_placeholder)
            .transpose()?;

        let choices = parsed
            .choices
            .map(|choices| compute_choices(&choices.0))
            .transpose()?;

        // A parameter without a default is positional, unless it's been
        // explicitly given a long or short tag. A parameter with a default
        // is an option, with a long tag taken from its name.
        let tags = match (long, short) {
            (Some(long), None) => Some(OptionTag::Long(long)),
            (None, Some(short)) => Some(OptionTag::Short(short)),
            (Some(long), Some(short)) => Some(OptionTag::LongShort { long, short }),
            (None, None) => match default {
                FieldDefault::None => None,
                _ => Some(OptionTag::Long(compute_long(None, &ident)?)),
            },
        };

        Ok(Self {
            ident,
            ty,
            tags,
            default,
            help,
            placeholder,
            choices,
        })
    }
}

/// Container-level settings for a `Flags` type
pub struct ContainerInfo {
    pub name: Option<Expr>,
    pub docs: String,
}

impl ContainerInfo {
    pub fn new(attrs: &[Attribute]) -> syn::Result<Self> {
        let parsed = RawContainerAttr::from_attributes(attrs).map_err(darling_error)?;

        Ok(Self {
            name: parsed.name.map(|name| name.0),
            docs: compute_docs(attrs)?,
        })
    }
}

/// True for attributes that belong to flagship's parameter handling
pub fn is_flag_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("flag")
}

pub fn compute_docs(attrs: &[Attribute]) -> syn::Result<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| match attr.meta {
            syn::Meta::NameValue(ref meta) => Some(meta),
            _ => None,
        })
        .filter(|meta| meta.path.is_ident("doc"))
        .map(|meta| match meta.value {
            Expr::Lit(ref lit) => match lit.lit {
                syn::Lit::Str(ref lit) => Ok(lit.value()),
                _ => Err(syn::Error::new(meta.span(), "malformed #[doc] attribute")),
            },
            Expr::Macro(ref expr) => Err(syn::Error::new(
                expr.span(),
                "macro #[doc] attributes aren't supported",
            )),
            _ => Err(syn::Error::new(meta.span(), "malformed #[doc] attribute")),
        })
        .map_ok(|doc| match doc.strip_prefix(' ') {
            Some(doc) => doc.to_owned(),
            None => doc,
        })
        .collect::<syn::Result<_>>()?;

    Ok(lines.join("\n").trim().to_owned())
}

/// Type and const generics can't be supported, because parameter types need
/// to be fully known to describe them.
pub fn reject_generics(generics: &Generics, what: &str) -> syn::Result<()> {
    match generics.params.first() {
        None => Ok(()),
        Some(param) => Err(syn::Error::new(
            param.span(),
            format!("generic {what} aren't supported by flagship"),
        )),
    }
}

fn compute_long(
    long: Option<SpannedValue<String>>,
    field_name: &IdentString<'_>,
) -> syn::Result<SpannedValue<String>> {
    let long = long.unwrap_or_else(|| {
        SpannedValue::new(field_name.as_str().to_kebab_case(), field_name.span())
    });

    if long.starts_with("--") {
        Err(syn::Error::new(
            long.span(),
            "long parameters don't need to start with --; this is handled automatically",
        ))
    } else if long.starts_with('-') {
        Err(syn::Error::new(
            long.span(),
            "long parameters don't start with '-'",
        ))
    } else if !long.starts_with(|c: char| c.is_alphabetic()) {
        Err(syn::Error::new(
            long.span(),
            "long parameters should start with something alphabetic",
        ))
    } else if long.contains('=') {
        Err(syn::Error::new(
            long.span(),
            "long parameters must not include an '=', as it is the argument separator",
        ))
    } else if long.contains(|c: char| c.is_whitespace()) {
        Err(syn::Error::new(
            long.span(),
            "long parameters shouldn't include whitespace",
        ))
    } else {
        Ok(long)
    }
}

fn compute_short(
    short: Option<SpannedValue<char>>,
    field_name: &IdentString<'_>,
) -> syn::Result<SpannedValue<char>> {
    let c = match short {
        Some(short) => short,
        None => SpannedValue::new(
            field_name.as_str().chars().next().ok_or_else(|| {
                syn::Error::new(field_name.span(), "can't compute a short flag from this name")
            })?,
            field_name.span(),
        ),
    };

    if *c == '-' {
        Err(syn::Error::new(c.span(), "short parameter must not be '-'"))
    } else if !c.is_ascii_graphic() {
        Err(syn::Error::new(
            c.span(),
            "short parameter should be an ascii printable",
        ))
    } else {
        Ok(c)
    }
}

fn check_placeholder(placeholder: SpannedValue<String>) -> syn::Result<SpannedValue<String>> {
    if placeholder.contains(|c: char| c.is_whitespace()) {
        Err(syn::Error::new(
            placeholder.span(),
            "placeholder shouldn't include whitespace",
        ))
    } else {
        Ok(placeholder)
    }
}

/// `choices` must be an array of string literals, like `["a", "b"]`
fn compute_choices(choices: &Expr) -> syn::Result<Vec<LitStr>> {
    let Expr::Array(array) = choices else {
        return Err(syn::Error::new(
            choices.span(),
            "choices should be an array of string literals",
        ));
    };

    let choices: Vec<LitStr> = array
        .elems
        .iter()
        .map(|elem| match elem {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => Ok(lit.clone()),
            elem => Err(syn::Error::new(
                elem.span(),
                "choices should be string literals",
            )),
        })
        .collect::<syn::Result<_>>()?;

    if let Some(duplicate) = choices.iter().duplicates_by(|lit| lit.value()).next() {
        return Err(syn::Error::new(duplicate.span(), "duplicate choice"));
    }

    match choices.is_empty() {
        true => Err(syn::Error::new(array.span(), "choices can't be empty")),
        false => Ok(choices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_parameter(item: syn::ItemStruct, check: impl FnOnce(ParameterInfo<'_>)) {
        let field = item.fields.iter().next().unwrap();
        let ident = field.ident.as_ref().unwrap();

        check(ParameterInfo::new(ident, &field.ty, &field.attrs).unwrap());
    }

    fn default_tokens(default: &FieldDefault) -> Option<String> {
        match *default {
            FieldDefault::None => None,
            FieldDefault::Trait => Some(String::from("<trait>")),
            FieldDefault::Expr(ref expr) => Some(expr.to_token_stream().to_string()),
        }
    }

    #[test]
    fn default_expressions() {
        let cases: [(syn::ItemStruct, &str); 5] = [
            (
                syn::parse_quote! { struct S { #[flag(default = 4)] layers: u32 } },
                "4",
            ),
            (
                syn::parse_quote! { struct S { #[flag(default = true)] layers: bool } },
                "true",
            ),
            (
                syn::parse_quote! { struct S { #[flag(default = 0.01)] layers: f64 } },
                "0.01",
            ),
            (
                syn::parse_quote! { struct S { #[flag(default = Suite::Diamonds)] layers: Suite } },
                "Suite :: Diamonds",
            ),
            (
                syn::parse_quote! { struct S { #[flag(default = "text")] layers: String } },
                "\"text\"",
            ),
        ];

        for (item, expected) in cases {
            with_parameter(item, |param| {
                assert_eq!(default_tokens(&param.default).as_deref(), Some(expected));
                assert_eq!(
                    param.tags.as_ref().and_then(|tags| tags.long()).as_deref().copied(),
                    Some("layers")
                );
            });
        }
    }

    #[test]
    fn bare_default_uses_the_trait() {
        with_parameter(
            syn::parse_quote! { struct S { #[flag(default)] retries: u32 } },
            |param| {
                assert_eq!(default_tokens(&param.default).as_deref(), Some("<trait>"));
                assert!(param.tags.is_some());
            },
        );
    }

    #[test]
    fn no_default_is_positional() {
        with_parameter(
            syn::parse_quote! {
                struct S {
                    /// Where to read from
                    input: String
                }
            },
            |param| {
                assert!(matches!(param.default, FieldDefault::None));
                assert!(param.tags.is_none());
                assert_eq!(param.help, "Where to read from");
            },
        );
    }

    #[test]
    fn explicit_tags() {
        with_parameter(
            syn::parse_quote! {
                struct S { #[flag(long = "early-stop", short = 'e')] early_stopping: bool }
            },
            |param| {
                let tags = param.tags.as_ref().unwrap();
                assert_eq!(tags.long().as_deref().copied(), Some("early-stop"));
                assert_eq!(tags.short().as_deref().copied(), Some('e'));
            },
        );
    }

    #[test]
    fn inherited_tags_are_kebab_case() {
        with_parameter(
            syn::parse_quote! { struct S { #[flag(long, short)] dry_run: bool } },
            |param| {
                let tags = param.tags.as_ref().unwrap();
                assert_eq!(tags.long().as_deref().copied(), Some("dry-run"));
                assert_eq!(tags.short().as_deref().copied(), Some('d'));
            },
        );
    }
}
