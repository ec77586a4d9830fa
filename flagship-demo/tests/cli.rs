use std::process::{Command, Output};

fn demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flagship-demo"))
        .args(args)
        .output()
        .expect("failed to run flagship-demo")
}

#[test]
fn runs_with_parsed_values() {
    let output = demo(&["1", "2.5", "--p3", "spades", "--p5"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "p1 = 1\np2 = [2.5]\np3 = Spades\np4 = (3, 2)\np5 = false\n"
    );
}

#[test]
fn help_exits_zero() {
    let output = demo(&["--help"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("This is main."));
    assert!(stdout.contains("description for p1 (type: `i32`)"));
}

#[test]
fn missing_positional_exits_two() {
    let output = demo(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_choice_exits_two() {
    let output = demo(&["1", "--p3", "jokers"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unparsable_value_exits_two() {
    let output = demo(&["x"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("p1"));
}
