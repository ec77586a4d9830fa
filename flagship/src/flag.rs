/*!
Flag descriptions: everything needed to register one parameter with the
underlying argument parser, derived from a name, a type, an optional
description, and an optional default.
*/

use core::fmt::{self, Display};
use std::borrow::Cow;

use heck::ToKebabCase as _;
use joinery::JoinableIterator as _;
use lazy_format::lazy_format;

use crate::parameter::{Kind, Parameter};

/// Where a parameter appears on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// A positional argument. Its position is its index among the other
    /// positionals.
    Positional,

    /// A named option or switch, like `--long` or `-s`
    Named {
        long: Option<Cow<'static, str>>,
        short: Option<char>,
    },
}

impl Position {
    /// A `--long` flag with no short form
    pub fn long(long: impl Into<Cow<'static, str>>) -> Self {
        Self::Named {
            long: Some(long.into()),
            short: None,
        }
    }
}

/// What a switch does when it appears on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The switch is off unless it's given
    SetTrue,

    /// The switch is on unless it's given
    SetFalse,
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Action::SetTrue => "set_true",
            Action::SetFalse => "set_false",
        })
    }
}

/**
A complete description of a single command-line parameter.

A [`FlagSpec`] is usually built by the `#[derive(Flags)]` or
`#[flagship::main]` macros, from a struct field or function parameter, and
then handed to [`build_command`][crate::command::build_command] to register it
with [`clap`].
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// The parameter name; also the id used to look it up in the parsed
    /// matches.
    pub id: &'static str,

    pub position: Position,

    /// The user's description of this parameter. May be empty.
    pub help: Cow<'static, str>,

    /// The name of the type, for help text
    pub type_name: Cow<'static, str>,

    pub kind: Kind,

    /// If set, every value must be one of these
    pub choices: Option<&'static [&'static str]>,

    /// The name of the value in usage messages, like `FILE`
    pub placeholder: Option<Cow<'static, str>>,

    /// The rendered default value, if there is one
    pub default: Option<String>,

    /// True if parsing fails when this parameter is absent
    pub required: bool,

    /// For switches, what happens when the switch is given
    pub action: Option<Action>,
}

impl FlagSpec {
    /**
    Describe a parameter of type `T`. Positionals and named parameters are
    both required if `T` has no absent value; call
    [`with_default`][Self::with_default] to relax that.

    Switches are always named, since they don't take a value; a positional
    switch becomes `--id`, in kebab case.
    */
    pub fn of<T: Parameter>(
        id: &'static str,
        position: Position,
        help: impl Into<Cow<'static, str>>,
    ) -> Self {
        let kind = T::kind();

        let (position, action) = match kind {
            Kind::Switch => (
                match position {
                    Position::Positional => Position::long(id.to_kebab_case()),
                    position => position,
                },
                Some(Action::SetTrue),
            ),
            Kind::Values { .. } => (position, None),
        };

        Self {
            id,
            position,
            help: help.into(),
            type_name: T::type_name(),
            kind,
            choices: T::choices(),
            placeholder: None,
            default: None,
            required: T::absent().is_err(),
            action,
        }
    }

    /// Attach a default value. A default makes the parameter optional, and
    /// a switch that defaults to on is turned off when it's given.
    #[must_use]
    pub fn with_default<T: Parameter>(mut self, default: &T) -> Self {
        if let Some(true) = default.as_switch() {
            self.action = Some(Action::SetFalse);
        }

        self.default = Some(default.render());
        self.required = false;
        self
    }

    /// Restrict the values of this parameter to a fixed set of strings
    #[must_use]
    pub fn with_choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Set the name of the value in usage messages
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<Cow<'static, str>>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// True if this is a positional parameter
    #[inline]
    #[must_use]
    pub fn is_positional(&self) -> bool {
        matches!(self.position, Position::Positional)
    }

    /// The long name of this flag, if it has one
    #[inline]
    #[must_use]
    pub fn long(&self) -> Option<&str> {
        match self.position {
            Position::Named { ref long, .. } => long.as_deref(),
            Position::Positional => None,
        }
    }

    /// The short name of this flag, if it has one
    #[inline]
    #[must_use]
    pub fn short(&self) -> Option<char> {
        match self.position {
            Position::Named { short, .. } => short,
            Position::Positional => None,
        }
    }

    /// The value name shown in usage messages: the explicit placeholder if
    /// there is one, then `{a, b, c}` for choices.
    pub fn value_name(&self) -> Option<Cow<'static, str>> {
        match (&self.placeholder, self.choices) {
            (Some(placeholder), _) => Some(placeholder.clone()),
            (None, Some(choices)) => Some(Cow::Owned(
                lazy_format!("{{{}}}", choices.iter().join_with(", ")).to_string(),
            )),
            (None, None) => None,
        }
    }

    /**
    The help text for this flag: the user's description, followed by the
    type (or action, for switches) and default.

    ```
    use flagship::flag::{FlagSpec, Position};

    let flag = FlagSpec::of::<(i32, i32)>("p4", Position::long("p4"), "description for p4")
        .with_default(&(3i32, 2i32));

    assert_eq!(
        flag.description().to_string(),
        "description for p4 (type: `(i32, i32)`) (default: `(3, 2)`)",
    );
    ```
    */
    pub fn description(&self) -> impl Display + '_ {
        let annotation = lazy_format! {
            match (self.action) {
                Some(action) => " (action: `{action}`)",
                None => (" (type: `{}`)", self.type_name),
            }
        };

        let default = lazy_format! {
            match (self.default) {
                Some(ref default) => " (default: `{default}`)",
                None => "",
            }
        };

        lazy_format!("{}{annotation}{default}", self.help)
    }
}
