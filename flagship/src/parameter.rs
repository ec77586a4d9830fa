/*!
Traits that map Rust types onto command-line parameters.

The type of a function parameter (or struct field) is the only information
flagship has about how it should be parsed, so these traits carry everything
[`FlagSpec`][crate::flag::FlagSpec] needs: how many values the type takes,
what to call it in help text, the possible values (if it has a closed set),
and how to turn strings back into the type.

Most types should implement [`Value`], or the [`ParsedValue`] marker if they
already have a [`FromStr`] and [`Display`] implementation. [`Parameter`] is
implemented on top of [`Value`] for single values, and separately for
collections, tuples, arrays, and [`Option`].
*/

use core::fmt::{self, Display};
use std::{borrow::Cow, str::FromStr};

use crate::errors::{ParameterError, RequiredError};

/// How many values a parameter consumes from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one value
    One,

    /// Exactly this many values, all of the same type
    Exactly(usize),

    /// Any number of values, including none
    ZeroOrMore,

    /// At least one value
    OneOrMore,
}

impl Arity {
    /// True if the number of values isn't fixed.
    #[inline]
    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        matches!(*self, Arity::ZeroOrMore | Arity::OneOrMore)
    }

    /// Check that `count` values is acceptable for this arity
    pub fn check(&self, count: usize) -> Result<(), ParameterError> {
        let ok = match *self {
            Arity::One => count == 1,
            Arity::Exactly(n) => count == n,
            Arity::ZeroOrMore => true,
            Arity::OneOrMore => count >= 1,
        };

        match ok {
            true => Ok(()),
            false => Err(ParameterError::WrongCount {
                expected: *self,
                got: count,
            }),
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::One => f.write_str("1"),
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::ZeroOrMore => f.write_str("any number of"),
            Arity::OneOrMore => f.write_str("1 or more"),
        }
    }
}

/// The broad shape of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A flag that takes no value, like `--verbose`
    Switch,

    /// A parameter that takes one or more values
    Values { arity: Arity },
}

/**
A type that can be parsed from exactly one command-line argument.

Types that implement [`Value`] automatically implement [`Parameter`], such
that they take a single argument and are required unless a default is given.
They can also be used as the elements of collections and tuples.
*/
pub trait Value: Sized {
    /// The name of this type, as shown in help text
    fn type_name() -> Cow<'static, str>;

    /// If this type only accepts a fixed set of strings, this is that set
    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        None
    }

    /// Parse a value from an argument given on the command line
    fn from_arg(arg: &str) -> Result<Self, ParameterError>;

    /// Render this value the way a user would type it. Used to show defaults
    /// in help text.
    fn render(&self) -> String;
}

/// For types with [`FromStr`] and [`Display`] implementations,
/// [`ParsedValue`] automatically gives them a [`Value`] implementation. The
/// type name shown in help text is [`ParsedValue::TYPE_NAME`].
pub trait ParsedValue: FromStr + Display {
    const TYPE_NAME: &'static str;
}

impl<T> Value for T
where
    T: ParsedValue,
    T::Err: Display,
{
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(T::TYPE_NAME)
    }

    #[inline]
    fn from_arg(arg: &str) -> Result<Self, ParameterError> {
        arg.parse()
            .map_err(|err| ParameterError::parse_error(arg, err))
    }

    #[inline]
    fn render(&self) -> String {
        self.to_string()
    }
}

/**
A parameter is a type that can fill a single flag or positional argument.

It is the "type" part of a function parameter: it decides whether the
parameter is a switch or takes values, how many values, what happens when it
is absent, and how the values are converted. The name, description, and
default come from the parameter itself, not the type.
*/
pub trait Parameter: Sized {
    /// The name of this type, as shown in help text
    fn type_name() -> Cow<'static, str>;

    /// Whether this is a switch or takes values, and how many
    fn kind() -> Kind;

    /// The fixed set of strings each value must be one of, if any
    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        None
    }

    /**
    This parameter was absent from the command line, and there is no default.

    Most types should return a [`RequiredError`] here. However, there are
    plenty of types with a sensible behavior when absent, such as an
    [`Option`] being [`None`] or a [`Vec`] being empty.
    */
    #[inline]
    fn absent() -> Result<Self, RequiredError> {
        Err(RequiredError)
    }

    /// This parameter got one or more values from the command line.
    fn from_values(values: &[&str]) -> Result<Self, ParameterError>;

    /// This parameter is a switch, and its final state is `on`.
    #[inline]
    fn from_switch(on: bool) -> Result<Self, ParameterError> {
        let _ = on;
        Err(ParameterError::NotASwitch)
    }

    /// If this value is a switch, its state. Used to pick the switch action
    /// from a default.
    #[inline]
    fn as_switch(&self) -> Option<bool> {
        None
    }

    /// Render this value for display as a default in help text
    fn render(&self) -> String;
}

impl<T: Value> Parameter for T {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        <T as Value>::type_name()
    }

    #[inline]
    fn kind() -> Kind {
        Kind::Values { arity: Arity::One }
    }

    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        <T as Value>::choices()
    }

    fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
        match *values {
            [value] => <T as Value>::from_arg(value),
            _ => Err(ParameterError::WrongCount {
                expected: Arity::One,
                got: values.len(),
            }),
        }
    }

    #[inline]
    fn render(&self) -> String {
        Value::render(self)
    }
}

/// Parse every value in `values` as a `T`
pub fn parse_all<T: Value>(values: &[&str]) -> Result<Vec<T>, ParameterError> {
    values.iter().map(|value| T::from_arg(value)).collect()
}

/**
A list of values that must contain at least one element. Used as a parameter,
it requires one or more values on the command line.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OneOrMore<T> {
    pub first: T,
    pub rest: Vec<T>,
}

impl<T> OneOrMore<T> {
    /// Create a list with a single element
    pub fn new(first: T) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Create a list from a [`Vec`], if it isn't empty
    pub fn from_vec(mut items: Vec<T>) -> Option<Self> {
        match items.is_empty() {
            true => None,
            false => {
                let first = items.remove(0);
                Some(Self { first, rest: items })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + Clone {
        core::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn into_vec(self) -> Vec<T> {
        let mut items = self.rest;
        items.insert(0, self.first);
        items
    }
}

impl<T> From<OneOrMore<T>> for Vec<T> {
    fn from(items: OneOrMore<T>) -> Self {
        items.into_vec()
    }
}
