/*!
Entry points for parsing: the [`Flags`] trait, usually derived or generated
by `#[flagship::main]`, and [`FlagGroup`], which combines several [`Flags`]
types into a single command line.
*/

use std::{
    ffi::OsString,
    fmt::{self, Write as _},
};

use clap::{ArgMatches, Command};
use indent_write::fmt::IndentWriter;

use crate::command::build_command;
use crate::errors::Error;
use crate::flag::FlagSpec;

/**
A type whose fields are command-line parameters.

Implementations only need to describe their parameters ([`flags`]) and
rebuild themselves from clap's matches ([`from_matches`]); the provided
methods take care of building the [`Command`] and running it. Use
`#[derive(Flags)]` rather than implementing this by hand.

[`flags`]: Flags::flags
[`from_matches`]: Flags::from_matches
*/
pub trait Flags: Sized {
    /// The name of the Rust type
    const NAME: &'static str;

    /// The name of the program, for usage messages
    const COMMAND_NAME: &'static str;

    /// A description of the program, usually from doc comments
    const DESCRIPTION: &'static str;

    /// Describe every parameter of this type
    fn flags() -> Vec<FlagSpec>;

    /// Build an instance from clap's matches
    fn from_matches(matches: &ArgMatches) -> Result<Self, Error>;

    /// The default [`Command`] that parameters are added to.
    fn base_command() -> Command {
        let command = Command::new(Self::COMMAND_NAME);

        match Self::DESCRIPTION.trim() {
            "" => command,
            description => command.about(description.to_owned()),
        }
    }

    /// The complete [`Command`] for this type
    fn command() -> Result<Command, Error> {
        Self::command_with(Self::base_command())
    }

    /// Add this type's parameters to an existing [`Command`], which supplies
    /// the name, description, and any other settings.
    fn command_with(base: Command) -> Result<Command, Error> {
        build_command(base, &Self::flags())
    }

    /// Parse the given arguments. The first argument is the program name.
    fn try_parse_from<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_with(Self::base_command(), args)
    }

    /// Parse the given arguments with this type's parameters added to `base`.
    fn try_parse_with<I, T>(base: Command, args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_with(base)?.try_get_matches_from(args)?;
        let parsed = Self::from_matches(&matches)?;

        tracing::debug!(flags = Self::NAME, "parsed command line");
        Ok(parsed)
    }

    /// Parse the process's arguments. If parsing fails, or help was
    /// requested, print a message and exit.
    fn parse() -> Self {
        Self::parse_with(Self::base_command())
    }

    /// Parse the process's arguments with this type's parameters added to
    /// `base`. If parsing fails, or help was requested, print a message and
    /// exit.
    fn parse_with(base: Command) -> Self {
        Self::parse_with_from(base, std::env::args_os())
    }

    /// Parse the given arguments with this type's parameters added to
    /// `base`. If parsing fails, or help was requested, print a message and
    /// exit.
    fn parse_with_from<I, T>(base: Command, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = base.clone();

        match Self::try_parse_with(base, args) {
            Ok(parsed) => parsed,
            Err(error) => error.into_clap(&mut command).exit(),
        }
    }
}

/// A collection of [`Flags`] types, all of which are parsed from the same
/// command line. Implemented for tuples of [`Flags`] types.
pub trait FlagGroup: Sized {
    /// The name and description of each member
    fn members() -> Vec<(&'static str, &'static str)>;

    /// The parameters of every member, in order
    fn flags() -> Vec<FlagSpec>;

    /// Build every member from clap's matches
    fn from_matches(matches: &ArgMatches) -> Result<Self, Error>;
}

macro_rules! flag_group {
    ($($T:ident)+) => {
        impl<$($T: Flags,)+> FlagGroup for ($($T,)+) {
            fn members() -> Vec<(&'static str, &'static str)> {
                vec![$(($T::NAME, $T::DESCRIPTION),)+]
            }

            fn flags() -> Vec<FlagSpec> {
                let mut flags = Vec::new();
                $(flags.extend($T::flags());)+
                flags
            }

            fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
                Ok(($($T::from_matches(matches)?,)+))
            }
        }
    };
}

flag_group! {A}
flag_group! {A B}
flag_group! {A B C}
flag_group! {A B C D}
flag_group! {A B C D E}
flag_group! {A B C D E F}

fn write_group_description(
    dest: &mut impl fmt::Write,
    description: &str,
    members: &[(&str, &str)],
) -> fmt::Result {
    dest.write_str(description)?;
    dest.write_str("Flags are used to initialize the following types:")?;

    for &(name, docs) in members {
        write!(dest, "\n  {name}:\t")?;

        let mut lines = docs.trim().lines();

        if let Some(first) = lines.next() {
            dest.write_str(first)?;
        }

        let mut indented = IndentWriter::new("    ", &mut *dest);
        lines.try_for_each(|line| write!(indented, "\n{line}"))?;
    }

    Ok(())
}

/**
The description of a combined command line: `description`, followed by the
name and documentation of every member of the group.
*/
pub fn group_description<G: FlagGroup>(description: &str) -> String {
    let mut dest = String::new();

    // Writing to a String can't fail
    let _ = write_group_description(&mut dest, description, &G::members());
    dest
}

/// Parse the given arguments into every member of a group, using `base` for
/// the name and settings of the command. `description` is prepended to the
/// generated list of members.
pub fn try_init_from_command_line_with<G, I, T>(
    base: Command,
    description: &str,
    args: I,
) -> Result<G, Error>
where
    G: FlagGroup,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = base.about(group_description::<G>(description));
    let matches = build_command(command, &G::flags())?.try_get_matches_from(args)?;
    let group = G::from_matches(&matches)?;

    tracing::debug!(members = G::members().len(), "initialized group from command line");
    Ok(group)
}

/**
Initialize every member of a group from the process's arguments. All the
members' parameters are combined into a single command line; each member
is then built from its own parameters.

```no_run
use flagship::{Flags, init_from_command_line};

/// The model to train
#[derive(Flags)]
struct Model {
    /// Number of layers
    #[flag(default = 4)]
    layers: u32,
}

/// How to train it
#[derive(Flags)]
struct Trainer {
    /// Learning rate
    #[flag(default = 0.01)]
    rate: f64,
}

let (model, trainer): (Model, Trainer) = init_from_command_line("Train a model.\n");
```

If parsing fails, or help was requested, this prints a message and exits.
*/
pub fn init_from_command_line<G: FlagGroup>(description: &str) -> G {
    let base = Command::new(env_command_name());
    let mut command = base.clone();

    match try_init_from_command_line_with(base, description, std::env::args_os()) {
        Ok(group) => group,
        Err(error) => error.into_clap(&mut command).exit(),
    }
}

/// The name the process was invoked as, minus any directories
fn env_command_name() -> String {
    std::env::args_os()
        .next()
        .map(std::path::PathBuf::from)
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| String::from("program"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::extract;
    use crate::flag::Position;

    struct Model {
        layers: u32,
    }

    impl Flags for Model {
        const NAME: &'static str = "Model";
        const COMMAND_NAME: &'static str = "model";
        const DESCRIPTION: &'static str = "The model\nwith two lines of docs\n";

        fn flags() -> Vec<FlagSpec> {
            vec![FlagSpec::of::<u32>("layers", Position::long("layers"), "").with_default(&4u32)]
        }

        fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
            Ok(Self {
                layers: extract(matches, "layers", Some(|| 4u32))?,
            })
        }
    }

    struct Trainer {
        rate: f64,
    }

    impl Flags for Trainer {
        const NAME: &'static str = "Trainer";
        const COMMAND_NAME: &'static str = "trainer";
        const DESCRIPTION: &'static str = "";

        fn flags() -> Vec<FlagSpec> {
            vec![FlagSpec::of::<f64>("rate", Position::Positional, "")]
        }

        fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
            Ok(Self {
                rate: extract::<f64, fn() -> f64>(matches, "rate", None)?,
            })
        }
    }

    #[test]
    fn group_description_lists_members() {
        assert_eq!(
            group_description::<(Model, Trainer)>("Train.\n"),
            "Train.\nFlags are used to initialize the following types:\
            \n  Model:\tThe model\
            \n    with two lines of docs\
            \n  Trainer:\t"
        );
    }

    #[test]
    fn each_member_gets_its_own_flags() {
        let (model, trainer): (Model, Trainer) = try_init_from_command_line_with(
            Command::new("train"),
            "",
            ["train", "--layers", "8", "0.5"],
        )
        .unwrap();

        assert_eq!(model.layers, 8);
        assert_eq!(trainer.rate, 0.5);
    }

    #[test]
    fn conflicting_members() {
        let result: Result<(Model, Model), Error> =
            try_init_from_command_line_with(Command::new("train"), "", ["train"]);

        assert!(matches!(result, Err(Error::Conflict { .. })));
    }

    #[test]
    fn help_is_informational() {
        let error = Model::try_parse_from(["model", "--help"]).err().unwrap();
        assert!(error.is_informational());
    }
}
