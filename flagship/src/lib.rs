/*!
Derive a command-line interface from a function signature.

flagship looks at the parameters of a function (their names, types, and
optional descriptions) and builds the argument parser you would otherwise
write by hand. The parsing itself (tokenizing, arity, help and error
messages) is done by [`clap`]; flagship only decides what to ask clap for.

```no_run
#[derive(flagship::Value, Debug)]
enum Suite {
    Hearts,
    Spades,
    Clubs,
    Diamonds,
}

/// This is main.
#[flagship::main]
fn main(
    #[flag(help = "description for p1")] p1: i32,
    p2: Vec<f32>,
    #[flag(default = Suite::Diamonds)] p3: Suite,
    #[flag(help = "description for p4", default = (3, 2))] p4: (i32, i32),
    #[flag(help = "description for p5", default = true)] p5: bool,
) {
    println!("{p1} {p2:?} {p3:?} {p4:?} {p5}");
}
```

The mapping from types to parameters:

- Parameters without a default are positional; parameters with a default are
  `--long` options. `#[flag(long)]` or `#[flag(short)]` make a parameter an
  option without giving it a default.
- Any [`Value`][parameter::Value] (numbers, strings, paths, addresses, and
  anything marked [`ParsedValue`][parameter::ParsedValue]) takes a single
  argument.
- `bool` is a switch. It's off by default, unless its default is `true`, in
  which case giving the switch turns it off.
- [`Vec`] and the other collections take any number of arguments,
  [`OneOrMore`][parameter::OneOrMore] takes at least one, and homogeneous
  tuples and arrays take exactly as many as they have elements.
- [`Option`] makes a parameter optional.
- `#[derive(Value)]` on an enum of unit variants makes it a choice between
  the (kebab-case) variant names.

Several types can also share one command line: see
[`init_from_command_line`].
*/

extern crate self as flagship;

pub mod command;
pub mod errors;
pub mod flag;
pub mod flags;
mod impls;
pub mod parameter;

pub use clap;

#[cfg(feature = "derive")]
pub use flagship_derive::{Flags, Value, main};

pub use errors::{Error, ParameterError};
pub use parameter::{Parameter, Value};
pub use flags::{
    FlagGroup, Flags, group_description, init_from_command_line, try_init_from_command_line_with,
};
