/*!
The bridge to [`clap`]. Flag descriptions become [`clap::Arg`]s, and after
clap has parsed the command line, raw values are pulled back out of the
[`ArgMatches`] and converted into typed parameters.

Everything clap is good at (tokenizing, arity checks, help and usage
rendering, error messages) is left to clap.
*/

use std::{borrow::Cow, collections::HashMap};

use clap::{
    Arg, ArgAction, ArgMatches, Command,
    builder::{OsStringValueParser, PossibleValuesParser, ValueRange},
    parser::ValueSource,
};

use crate::errors::{Error, ParameterError};
use crate::flag::{Action, FlagSpec, Position};
use crate::parameter::{Arity, Kind, Parameter};

fn num_args(arity: Arity) -> ValueRange {
    match arity {
        Arity::One => ValueRange::SINGLE,
        Arity::Exactly(n) => ValueRange::from(n),
        Arity::ZeroOrMore => ValueRange::from(0usize..),
        Arity::OneOrMore => ValueRange::from(1usize..),
    }
}

/// Make a single [`clap::Arg`] from a flag description. `index` is the
/// 1-based position among positionals, and is ignored for named flags.
pub fn build_arg(flag: &FlagSpec, index: usize) -> Arg {
    let mut arg = Arg::new(flag.id).help(flag.description().to_string());

    arg = match flag.position {
        Position::Positional => arg.index(index),
        Position::Named {
            ref long,
            ref short,
        } => {
            let arg = match long {
                Some(long) => arg.long(long.to_string()),
                None => arg,
            };

            match *short {
                Some(short) => arg.short(short),
                None => arg,
            }
        }
    };

    arg = match flag.kind {
        Kind::Switch => arg.action(match flag.action {
            Some(Action::SetFalse) => ArgAction::SetFalse,
            Some(Action::SetTrue) | None => ArgAction::SetTrue,
        }),
        Kind::Values { arity } => {
            let arg = arg.action(ArgAction::Set).num_args(num_args(arity));

            match flag.choices {
                Some(choices) => arg
                    .value_parser(PossibleValuesParser::new(choices.iter().copied()))
                    .hide_possible_values(true),
                None => arg.value_parser(OsStringValueParser::new()),
            }
        }
    };

    arg = match flag.value_name() {
        Some(name) => arg.value_name(name.into_owned()),
        None => arg,
    };

    arg.required(flag.required)
}

/**
Check a set of flags for problems clap would otherwise report with a panic:
duplicate names, and positionals that clap can't assign values to.

Positionals are filled in order, so:

- required positionals must all come before optional ones
- a positional with a variable number of values must be the last one
- a positional with a fixed number of values (like a tuple) must be the last
  one, or the second to last when the last is required
*/
pub fn validate(flags: &[FlagSpec]) -> Result<(), Error> {
    let mut ids: HashMap<&str, &'static str> = HashMap::new();
    let mut longs: HashMap<&str, &'static str> = HashMap::new();
    let mut shorts: HashMap<char, &'static str> = HashMap::new();

    for flag in flags {
        if let Some(first) = ids.insert(flag.id, flag.id) {
            return Err(Error::Conflict {
                name: Cow::Borrowed(flag.id),
                first: Cow::Borrowed(first),
                second: flag.id,
            });
        }

        if let Some(long) = flag.long() {
            if let Some(first) = longs.insert(long, flag.id) {
                return Err(Error::Conflict {
                    name: Cow::Owned(format!("--{long}")),
                    first: Cow::Borrowed(first),
                    second: flag.id,
                });
            }
        }

        if let Some(short) = flag.short() {
            if let Some(first) = shorts.insert(short, flag.id) {
                return Err(Error::Conflict {
                    name: Cow::Owned(format!("-{short}")),
                    first: Cow::Borrowed(first),
                    second: flag.id,
                });
            }
        }
    }

    let positionals: Vec<&FlagSpec> = flags.iter().filter(|flag| flag.is_positional()).collect();

    if let Some(first_optional) = positionals.iter().position(|flag| !flag.required) {
        if let Some(required) = positionals[first_optional..].iter().find(|flag| flag.required) {
            return Err(Error::OptionalPositional {
                optional: positionals[first_optional].id,
                required: required.id,
            });
        }
    }

    let last = positionals.len().saturating_sub(1);

    for (index, flag) in positionals.iter().enumerate() {
        let Kind::Values { arity } = flag.kind else {
            continue;
        };

        match arity {
            Arity::ZeroOrMore | Arity::OneOrMore if index != last => {
                return Err(Error::VariadicPositional { field: flag.id });
            }
            Arity::Exactly(count) if count > 1 => {
                let placed = index == last || (index + 1 == last && positionals[last].required);

                if !placed {
                    return Err(Error::FixedPositional { field: flag.id });
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Every name `command` already uses: its own arguments, plus the help and
/// version flags clap adds when it builds the command.
fn existing_names(command: &Command) -> Vec<(String, Option<String>, Option<char>)> {
    let mut names: Vec<_> = command
        .get_arguments()
        .map(|arg| {
            (
                arg.get_id().as_str().to_owned(),
                arg.get_long().map(str::to_owned),
                arg.get_short(),
            )
        })
        .collect();

    if !command.is_disable_help_flag_set() {
        names.push((String::from("help"), Some(String::from("help")), Some('h')));
    }

    let has_version = command.get_version().is_some() || command.get_long_version().is_some();

    if has_version && !command.is_disable_version_flag_set() {
        names.push((
            String::from("version"),
            Some(String::from("version")),
            Some('V'),
        ));
    }

    names
}

/// Check the flags against the arguments `command` already has
fn check_existing(command: &Command, flags: &[FlagSpec]) -> Result<(), Error> {
    for (id, long, short) in existing_names(command) {
        for flag in flags {
            let name = if flag.id == id {
                Some(id.clone())
            } else if let Some(long) = long.as_deref().filter(|&long| flag.long() == Some(long)) {
                Some(format!("--{long}"))
            } else if let Some(short) = short.filter(|&short| flag.short() == Some(short)) {
                Some(format!("-{short}"))
            } else {
                None
            };

            if let Some(name) = name {
                return Err(Error::Conflict {
                    name: Cow::Owned(name),
                    first: Cow::Owned(id),
                    second: flag.id,
                });
            }
        }
    }

    Ok(())
}

/// A parameter is allowed to take `-h` for itself, in which case help is
/// only available as `--help`.
fn release_short_help(command: Command, flags: &[FlagSpec]) -> Command {
    let claimed = flags.iter().any(|flag| flag.short() == Some('h'));

    match claimed && !command.is_disable_help_flag_set() {
        false => command,
        true => command.disable_help_flag(true).arg(
            Arg::new("help")
                .long("help")
                .help("Print help")
                .action(ArgAction::Help),
        ),
    }
}

/**
Register every flag with `base`, which is used for everything else about the
command (its name, description, version, and so on). Repeated options
override earlier ones. A flag can't reuse a name `base` already has, except
that a `-h` flag replaces the short form of help.
*/
pub fn build_command(base: Command, flags: &[FlagSpec]) -> Result<Command, Error> {
    validate(flags)?;

    let base = release_short_help(base, flags);
    check_existing(&base, flags)?;

    tracing::debug!(
        command = base.get_name(),
        flags = flags.len(),
        "building command"
    );

    let mut index = 0;

    Ok(flags
        .iter()
        .fold(base.args_override_self(true), |command, flag| {
            if flag.is_positional() {
                index += 1;
            }

            tracing::trace!(
                id = flag.id,
                positional = flag.is_positional(),
                kind = ?flag.kind,
                required = flag.required,
                "registering argument"
            );

            command.arg(build_arg(flag, index))
        }))
}

/// Collect the raw values clap matched for `id`, if they came from the
/// command line.
fn raw_values<'a>(
    matches: &'a ArgMatches,
    id: &'static str,
) -> Result<Option<Vec<&'a str>>, Error> {
    match matches.value_source(id) {
        Some(ValueSource::CommandLine) => {}
        _ => return Ok(None),
    }

    let Some(values) = matches.get_raw(id) else {
        return Ok(Some(Vec::new()));
    };

    values
        .map(|value| {
            value.to_str().ok_or_else(|| Error::Parameter {
                field: id,
                error: ParameterError::InvalidUtf8 {
                    arg: value.to_string_lossy().into_owned(),
                },
            })
        })
        .collect::<Result<Vec<&str>, Error>>()
        .map(Some)
}

/**
Extract the typed value of the parameter `id` from clap's matches.

If the parameter appeared on the command line, its values are converted with
[`Parameter::from_values`] (or [`Parameter::from_switch`], for switches).
Otherwise `default` is used if it was given, then [`Parameter::absent`]; if
all of those come up empty, the parameter was required.

A switch that wasn't given is absent like anything else, so an
`Option<bool>` is `None` unless the switch appears.
*/
pub fn extract<T, F>(matches: &ArgMatches, id: &'static str, default: Option<F>) -> Result<T, Error>
where
    T: Parameter,
    F: FnOnce() -> T,
{
    let parameter_error = |error| Error::Parameter { field: id, error };

    let given = match T::kind() {
        Kind::Switch => match matches.value_source(id) {
            Some(ValueSource::CommandLine) => {
                let on = matches.get_flag(id);
                tracing::trace!(id, on, "extracted switch");
                return T::from_switch(on).map_err(parameter_error);
            }
            _ => None,
        },
        Kind::Values { .. } => raw_values(matches, id)?,
    };

    match given {
        Some(values) => {
            tracing::trace!(id, ?values, "extracted values");
            T::from_values(&values).map_err(parameter_error)
        }
        None => match default {
            Some(default) => Ok(default()),
            None => T::absent().map_err(|_| Error::Required { field: id }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> Vec<FlagSpec> {
        vec![
            FlagSpec::of::<i32>("p1", Position::Positional, "description for p1"),
            FlagSpec::of::<Vec<f32>>("p2", Position::Positional, ""),
            FlagSpec::of::<(i32, i32)>("p4", Position::long("p4"), "description for p4")
                .with_default(&(3i32, 2i32)),
            FlagSpec::of::<bool>("p5", Position::long("p5"), "description for p5")
                .with_default(&true),
        ]
    }

    fn parse(args: &[&str]) -> Result<ArgMatches, clap::Error> {
        build_command(Command::new("test"), &flags())
            .unwrap()
            .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
    }

    #[test]
    fn parse_positionals_and_options() {
        let matches = parse(&["1", "2.5", "3", "--p4", "7", "8", "--p5"]).unwrap();

        assert_eq!(extract::<i32, fn() -> i32>(&matches, "p1", None).unwrap(), 1);
        assert_eq!(
            extract::<Vec<f32>, fn() -> Vec<f32>>(&matches, "p2", None).unwrap(),
            [2.5f32, 3.0f32]
        );
        assert_eq!(
            extract(&matches, "p4", Some(|| (3i32, 2i32))).unwrap(),
            (7, 8)
        );
        assert!(!extract::<bool, fn() -> bool>(&matches, "p5", None).unwrap());
    }

    #[test]
    fn defaults_when_absent() {
        let matches = parse(&["1"]).unwrap();

        assert_eq!(
            extract::<Vec<f32>, fn() -> Vec<f32>>(&matches, "p2", None).unwrap(),
            Vec::<f32>::new()
        );
        assert_eq!(
            extract(&matches, "p4", Some(|| (3i32, 2i32))).unwrap(),
            (3, 2)
        );
        assert!(extract(&matches, "p5", Some(|| true)).unwrap());
        assert!(!extract::<bool, fn() -> bool>(&matches, "p5", None).unwrap());
    }

    #[test]
    fn missing_positional_is_a_clap_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn wrong_arity_is_a_clap_error() {
        let err = parse(&["1", "--p4", "7"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::WrongNumberOfValues);
    }

    #[test]
    fn bad_value_is_a_parameter_error() {
        let matches = parse(&["one"]).unwrap();
        let err = extract::<i32, fn() -> i32>(&matches, "p1", None).unwrap_err();

        assert!(matches!(
            err,
            Error::Parameter {
                field: "p1",
                error: ParameterError::Parse { .. }
            }
        ));
    }

    #[test]
    fn repeated_option_overrides() {
        let matches = parse(&["1", "--p4", "1", "2", "--p4", "5", "6"]).unwrap();
        assert_eq!(
            extract(&matches, "p4", Some(|| (3i32, 2i32))).unwrap(),
            (5, 6)
        );
    }

    #[test]
    fn choices_are_enforced_by_clap() {
        let flags = [FlagSpec::of::<String>("mode", Position::long("mode"), "")
            .with_choices(&["a", "b", "c"])
            .with_default(&String::from("a"))];

        let command = build_command(Command::new("test"), &flags).unwrap();
        let err = command
            .clone()
            .try_get_matches_from(["test", "--mode", "d"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);

        let matches = command
            .try_get_matches_from(["test", "--mode", "b"])
            .unwrap();
        assert_eq!(
            extract(&matches, "mode", Some(|| String::from("a"))).unwrap(),
            "b"
        );
    }

    #[test]
    fn duplicate_long_is_a_conflict() {
        let flags = [
            FlagSpec::of::<i32>("a", Position::long("same"), ""),
            FlagSpec::of::<i32>("b", Position::long("same"), ""),
        ];

        let err = validate(&flags).unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict {
                ref first,
                second: "b",
                ..
            } if first == "a"
        ));
    }

    #[test]
    fn variadic_positional_must_be_last() {
        let flags = [
            FlagSpec::of::<Vec<i32>>("many", Position::Positional, ""),
            FlagSpec::of::<i32>("one", Position::Positional, ""),
        ];

        assert!(matches!(
            validate(&flags),
            Err(Error::VariadicPositional { field: "many" })
        ));
    }

    #[test]
    fn optional_positional_before_required() {
        let flags = [
            FlagSpec::of::<Option<i32>>("a", Position::Positional, ""),
            FlagSpec::of::<i32>("b", Position::Positional, ""),
        ];

        assert!(matches!(
            validate(&flags),
            Err(Error::OptionalPositional {
                optional: "a",
                required: "b"
            })
        ));
    }

    #[test]
    fn optional_positional_after_required() {
        let flags = [
            FlagSpec::of::<i32>("a", Position::Positional, ""),
            FlagSpec::of::<Option<i32>>("b", Position::Positional, ""),
            FlagSpec::of::<Vec<i32>>("c", Position::Positional, ""),
        ];

        validate(&flags).unwrap();
        build_command(Command::new("test"), &flags).unwrap();
    }

    #[test]
    fn tuple_positional_too_early() {
        let flags = [
            FlagSpec::of::<(i32, i32)>("p", Position::Positional, ""),
            FlagSpec::of::<i32>("q", Position::Positional, ""),
            FlagSpec::of::<i32>("r", Position::Positional, ""),
        ];

        assert!(matches!(
            validate(&flags),
            Err(Error::FixedPositional { field: "p" })
        ));
    }

    #[test]
    fn tuple_positional_before_optional() {
        let flags = [
            FlagSpec::of::<(i32, i32)>("p", Position::Positional, ""),
            FlagSpec::of::<Option<i32>>("q", Position::Positional, ""),
        ];

        assert!(matches!(
            validate(&flags),
            Err(Error::FixedPositional { field: "p" })
        ));
    }

    #[test]
    fn tuple_positional_second_to_last() {
        let flags = [
            FlagSpec::of::<i32>("a", Position::Positional, ""),
            FlagSpec::of::<(i32, i32)>("p", Position::Positional, ""),
            FlagSpec::of::<i32>("q", Position::Positional, ""),
        ];

        let matches = build_command(Command::new("test"), &flags)
            .unwrap()
            .try_get_matches_from(["test", "1", "2", "3", "4"])
            .unwrap();

        assert_eq!(
            extract::<(i32, i32), fn() -> (i32, i32)>(&matches, "p", None).unwrap(),
            (2, 3)
        );
        assert_eq!(extract::<i32, fn() -> i32>(&matches, "q", None).unwrap(), 4);
    }

    #[test]
    fn short_h_replaces_short_help() {
        let flags = [FlagSpec::of::<String>(
            "host",
            Position::Named {
                long: None,
                short: Some('h'),
            },
            "",
        )];
        let command = build_command(Command::new("test"), &flags).unwrap();

        let matches = command
            .clone()
            .try_get_matches_from(["test", "-h", "localhost"])
            .unwrap();
        assert_eq!(
            extract::<String, fn() -> String>(&matches, "host", None).unwrap(),
            "localhost"
        );

        let err = command.try_get_matches_from(["test", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn help_id_is_a_conflict() {
        let flags = [FlagSpec::of::<String>("help", Position::Positional, "")];

        assert!(matches!(
            build_command(Command::new("test"), &flags),
            Err(Error::Conflict {
                ref first,
                second: "help",
                ..
            }) if first == "help"
        ));
    }

    #[test]
    fn version_long_is_a_conflict() {
        let flags = [FlagSpec::of::<bool>("show_version", Position::long("version"), "")];

        assert!(build_command(Command::new("test"), &flags).is_ok());
        assert!(matches!(
            build_command(Command::new("test").version("1.0"), &flags),
            Err(Error::Conflict {
                ref name,
                ..
            }) if name == "--version"
        ));
    }

    #[test]
    fn base_argument_is_a_conflict() {
        let base = Command::new("test").arg(Arg::new("config").long("config"));
        let flags = [FlagSpec::of::<String>("path", Position::long("config"), "")];

        assert!(matches!(
            build_command(base, &flags),
            Err(Error::Conflict {
                ref first,
                second: "path",
                ..
            }) if first == "config"
        ));
    }

    #[test]
    fn absent_switch_is_none() {
        let flags = [FlagSpec::of::<Option<bool>>("verbose", Position::long("verbose"), "")];
        let command = build_command(Command::new("test"), &flags).unwrap();

        let matches = command.clone().try_get_matches_from(["test"]).unwrap();
        assert_eq!(
            extract::<Option<bool>, fn() -> Option<bool>>(&matches, "verbose", None).unwrap(),
            None
        );

        let matches = command
            .try_get_matches_from(["test", "--verbose"])
            .unwrap();
        assert_eq!(
            extract::<Option<bool>, fn() -> Option<bool>>(&matches, "verbose", None).unwrap(),
            Some(true)
        );
    }
}
