//! Helpers for end-to-end tests.
//!
//! The main tool is the [expansion_test] macro, which checks that two inputs produce the
//! same commands. Input and expected output are run in fresh engines with plain TeX
//! category codes and no end of line character.

use crate::command::Command;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::TracedError;
use crate::token::trace::Origin;

pub fn new_engine() -> Engine {
    Engine::new(Config {
        end_line_char: -1,
        ..Config::plain_tex()
    })
}

pub fn run(input: &str) -> Result<Vec<Command>, TracedError> {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, input);
    engine.run()
}

pub fn run_expansion_equality_test(input: &str, want: &str) {
    let _ = simplelog::TestLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
    let got = match run(input) {
        Ok(got) => got,
        Err(err) => panic!("failed to run the input:\n{err}"),
    };
    let want = match run(want) {
        Ok(want) => want,
        Err(err) => panic!("failed to run the expected output:\n{err}"),
    };
    assert_eq!(got, want);
}

pub fn run_failure_test(input: &str) {
    if let Ok(got) = run(input) {
        panic!("running {input:?} succeeded with output {got:?}");
    }
}

/// Checks that the input produces the same commands as the expected output.
macro_rules! expansion_test {
    ( $name: ident, $input: expr, $want: expr ) => {
        #[test]
        fn $name() {
            crate::testing::run_expansion_equality_test($input, $want);
        }
    };
}

/// Checks that running the input fails.
macro_rules! expansion_failure_test {
    ( $name: ident, $input: expr ) => {
        #[test]
        fn $name() {
            crate::testing::run_failure_test($input);
        }
    };
}

pub(crate) use expansion_failure_test;
pub(crate) use expansion_test;
