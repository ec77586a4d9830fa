/*!
Implementations of the [`parameter`][crate::parameter] traits for various
primitive and standard library types
 */

use core::hash::Hash;
use std::{borrow::Cow, ffi::OsString, path::PathBuf};

use joinery::JoinableIterator as _;

use crate::errors::{ParameterError, RequiredError};
use crate::parameter::{Arity, Kind, OneOrMore, Parameter, ParsedValue, Value, parse_all};

macro_rules! from_str {
    ($(
        $type:ident $($(::$path:ident)+)? => $name:literal,
    )*) => {
        $(
            impl ParsedValue for $type $($(:: $path)+)? {
                const TYPE_NAME: &'static str = $name;
            }
        )*
    };
}

from_str! {
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    f32 => "f32",
    f64 => "f64",
    char => "char",
    String => "String",

    core::net::Ipv4Addr => "Ipv4Addr",
    core::net::Ipv6Addr => "Ipv6Addr",
    core::net::IpAddr => "IpAddr",
    core::net::SocketAddrV4 => "SocketAddrV4",
    core::net::SocketAddrV6 => "SocketAddrV6",
    core::net::SocketAddr => "SocketAddr",
}

impl Value for PathBuf {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("PathBuf")
    }

    #[inline]
    fn from_arg(arg: &str) -> Result<Self, ParameterError> {
        Ok(PathBuf::from(arg))
    }

    #[inline]
    fn render(&self) -> String {
        self.display().to_string()
    }
}

impl Value for OsString {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("OsString")
    }

    #[inline]
    fn from_arg(arg: &str) -> Result<Self, ParameterError> {
        Ok(OsString::from(arg))
    }

    #[inline]
    fn render(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl Parameter for bool {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }

    #[inline]
    fn kind() -> Kind {
        Kind::Switch
    }

    #[inline]
    fn absent() -> Result<Self, RequiredError> {
        Ok(false)
    }

    fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
        match *values {
            [value] => value
                .parse()
                .map_err(|err| ParameterError::parse_error(value, err)),
            _ => Err(ParameterError::WrongCount {
                expected: Arity::One,
                got: values.len(),
            }),
        }
    }

    #[inline]
    fn from_switch(on: bool) -> Result<Self, ParameterError> {
        Ok(on)
    }

    #[inline]
    fn as_switch(&self) -> Option<bool> {
        Some(*self)
    }

    #[inline]
    fn render(&self) -> String {
        self.to_string()
    }
}

impl<T: Parameter> Parameter for Option<T> {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    #[inline]
    fn kind() -> Kind {
        T::kind()
    }

    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        T::choices()
    }

    #[inline]
    fn absent() -> Result<Self, RequiredError> {
        Ok(None)
    }

    #[inline]
    fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
        T::from_values(values).map(Some)
    }

    #[inline]
    fn from_switch(on: bool) -> Result<Self, ParameterError> {
        T::from_switch(on).map(Some)
    }

    #[inline]
    fn as_switch(&self) -> Option<bool> {
        self.as_ref().and_then(T::as_switch)
    }

    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => String::from("None"),
        }
    }
}

fn render_list<'a, T, I>(items: I) -> String
where
    T: Value + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: Clone,
{
    let rendered = items.into_iter().map(Value::render).join_with(", ");
    format!("[{rendered}]")
}

// Collections all take any number of values of their element type and are
// empty when absent.
macro_rules! collections {
    (
        $($type:ident $(:: $path:ident)* [T $(: $($bounds:tt)+)?]),+ $(,)?
    ) => {
        $(
            impl<T> Parameter for std:: $type $(::$path)* <T>
            where
                T: Value $(+ $($bounds)+)?,
            {
                fn type_name() -> Cow<'static, str> {
                    Cow::Owned(format!("[{}]", <T as Value>::type_name()))
                }

                #[inline]
                fn kind() -> Kind {
                    Kind::Values { arity: Arity::ZeroOrMore }
                }

                #[inline]
                fn choices() -> Option<&'static [&'static str]> {
                    <T as Value>::choices()
                }

                #[inline]
                fn absent() -> Result<Self, RequiredError> {
                    Ok(Self::new())
                }

                #[inline]
                fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
                    parse_all::<T>(values).map(|values| values.into_iter().collect())
                }

                #[inline]
                fn render(&self) -> String {
                    render_list(self)
                }
            }
        )+
    }
}

collections! {
    vec::Vec[T],
    collections::VecDeque[T],
    collections::BTreeSet[T: Ord],
    collections::HashSet[T: Eq + Hash],
}

impl<T: Value> Parameter for OneOrMore<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("({}, ...)", <T as Value>::type_name()))
    }

    #[inline]
    fn kind() -> Kind {
        Kind::Values {
            arity: Arity::OneOrMore,
        }
    }

    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        <T as Value>::choices()
    }

    fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
        Arity::OneOrMore.check(values.len())?;

        parse_all(values).and_then(|values| {
            OneOrMore::from_vec(values).ok_or(ParameterError::WrongCount {
                expected: Arity::OneOrMore,
                got: 0,
            })
        })
    }

    fn render(&self) -> String {
        render_list(self.iter())
    }
}

fn tuple_type_name<T: Value>(count: usize) -> Cow<'static, str> {
    let name = <T as Value>::type_name();
    let names = core::iter::repeat_n(&name, count).join_with(", ");
    Cow::Owned(format!("({names})"))
}

// Arrays behave like homogeneous tuples: exactly N values of the element type.
impl<T: Value, const N: usize> Parameter for [T; N] {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        tuple_type_name::<T>(N)
    }

    #[inline]
    fn kind() -> Kind {
        Kind::Values {
            arity: Arity::Exactly(N),
        }
    }

    #[inline]
    fn choices() -> Option<&'static [&'static str]> {
        <T as Value>::choices()
    }

    fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
        Arity::Exactly(N).check(values.len())?;

        parse_all::<T>(values)?
            .try_into()
            .map_err(|values: Vec<T>| ParameterError::WrongCount {
                expected: Arity::Exactly(N),
                got: values.len(),
            })
    }

    fn render(&self) -> String {
        let rendered = self.iter().map(Value::render).join_with(", ");
        format!("({rendered})")
    }
}

// Only homogeneous tuples are parameters: every element has the same type,
// so the whole tuple can be described as "N values of T".
macro_rules! element_type {
    ($_value:ident) => {
        T
    };
}

macro_rules! tuples {
    ($(
        $count:literal => ($($idx:tt $value:ident),+);
    )+) => {
        $(
            impl<T: Value> Parameter for ($(element_type!($value),)+) {
                #[inline]
                fn type_name() -> Cow<'static, str> {
                    tuple_type_name::<T>($count)
                }

                #[inline]
                fn kind() -> Kind {
                    Kind::Values { arity: Arity::Exactly($count) }
                }

                #[inline]
                fn choices() -> Option<&'static [&'static str]> {
                    <T as Value>::choices()
                }

                fn from_values(values: &[&str]) -> Result<Self, ParameterError> {
                    match *values {
                        [$($value,)+] => Ok(($(<T as Value>::from_arg($value)?,)+)),
                        _ => Err(ParameterError::WrongCount {
                            expected: Arity::Exactly($count),
                            got: values.len(),
                        }),
                    }
                }

                fn render(&self) -> String {
                    let rendered = [$(Value::render(&self.$idx),)+].into_iter().join_with(", ");
                    format!("({rendered})")
                }
            }
        )+
    };
}

tuples! {
    1 => (0 a);
    2 => (0 a, 1 b);
    3 => (0 a, 1 b, 2 c);
    4 => (0 a, 1 b, 2 c, 3 d);
    5 => (0 a, 1 b, 2 c, 3 d, 4 e);
    6 => (0 a, 1 b, 2 c, 3 d, 4 e, 5 f);
}
