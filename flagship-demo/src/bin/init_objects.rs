//! Several types initialized from one command line.

use std::path::PathBuf;

use flagship::{Flags, init_from_command_line};
use tracing_subscriber::EnvFilter;

/// A stack of dense layers.
/// Wider layers train more slowly.
#[derive(Flags, Debug)]
struct Model {
    /// Number of layers
    #[flag(default = 4)]
    layers: u32,

    /// Width of each layer
    #[flag(short, default = 128)]
    width: u32,

    /// Activation function
    #[flag(choices = ["relu", "tanh", "sigmoid"], default = String::from("relu"))]
    activation: String,
}

/// Stochastic gradient descent.
#[derive(Flags, Debug)]
struct Trainer {
    /// Training data
    #[flag(placeholder = "FILE")]
    data: PathBuf,

    /// Learning rate
    #[flag(default = 0.01)]
    rate: f64,

    /// Stop early if the loss stops improving
    #[flag(long = "early-stop", default)]
    early_stopping: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (model, trainer): (Model, Trainer) = init_from_command_line("Train a model.\n");

    println!("{model:#?}");
    println!("{trainer:#?}");
}
