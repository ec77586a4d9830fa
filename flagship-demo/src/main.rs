use std::io::{self, Write as _};

use tracing_subscriber::EnvFilter;

#[derive(flagship::Value, Debug, Clone, Copy, PartialEq, Eq)]
enum Suite {
    Hearts,
    Spades,
    Clubs,
    Diamonds,
}

/// This is main.
#[flagship::main(name = "flagship-demo")]
fn run(
    #[flag(help = "description for p1")] p1: i32,
    p2: Vec<f32>,
    #[flag(default = Suite::Diamonds)] p3: Suite,
    #[flag(help = "description for p4", default = (3, 2))] p4: (i32, i32),
    #[flag(help = "description for p5", default = true)] p5: bool,
) -> anyhow::Result<()> {
    tracing::info!(p1, p5, "running");

    let mut out = io::stdout().lock();

    writeln!(out, "p1 = {p1}")?;
    writeln!(out, "p2 = {p2:?}")?;
    writeln!(out, "p3 = {p3:?}")?;
    writeln!(out, "p4 = {p4:?}")?;
    writeln!(out, "p5 = {p5}")?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    run()
}
