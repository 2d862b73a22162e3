//! Helpers for testing parsers.

use super::command::{self, Step};
use super::Parsable;
use crate::banisher::Banisher;
use crate::config::Config;
use crate::error::Result;
use crate::executor;
use crate::font::tests::SquareLoader;
use crate::token::trace::Origin;
use crate::token::write_tokens;

/// Builds a banisher with plain TeX category codes and runs the setup code.
pub fn new_banisher(setup: &str) -> Banisher {
    let mut b = Banisher::new(Config {
        end_line_char: -1,
        ..Config::plain_tex()
    });
    run_setup(&mut b, setup);
    b
}

/// A banisher in which the current font is 10pt wide and 5pt high.
pub fn banisher_with_square_font() -> Banisher {
    let mut b = Banisher::new(Config {
        end_line_char: -1,
        ..Config::plain_tex()
    });
    b.set_font_loader(Box::new(SquareLoader));
    run_setup(&mut b, r"\font\square=square \square");
    b
}

fn run_setup(b: &mut Banisher, setup: &str) {
    b.push_source(Origin::Terminal, setup);
    loop {
        match command::parse_command(b).unwrap() {
            Step::Command(c) => {
                executor::execute(b, c).unwrap();
            }
            Step::EndOfSubPipeline => panic!("unexpected end of a nested list in the setup"),
            Step::EndOfInput => break,
        }
    }
}

pub fn parse_in<T: Parsable>(b: &mut Banisher, input: &str) -> Result<T> {
    b.push_source(Origin::Terminal, input);
    T::parse(b)
}

pub fn parse_after<T: Parsable>(setup: &str, input: &str) -> Result<T> {
    let mut b = new_banisher(setup);
    parse_in(&mut b, input)
}

pub fn run_parse<T: Parsable>(input: &str) -> Result<T> {
    parse_after("", input)
}

/// Parses a value and returns the unexpanded input that remains.
pub fn parse_and_collect_rest<T: Parsable>(input: &str) -> String {
    let mut b = new_banisher("");
    parse_in::<T>(&mut b, input).unwrap();
    let mut rest = vec![];
    while let Some(token) = b.next_raw().unwrap() {
        rest.push(token);
    }
    write_tokens(&rest, &b.interner)
}

macro_rules! parse_success_tests {
    ( $type: ty, $( ($name: ident, $input: expr, $want: expr $(,)? ), )+ ) => {
        $(
            #[test]
            fn $name() {
                let got: $type = run_parse::<$type>($input).unwrap();
                assert_eq!(got, $want);
            }
        )+
    };
}

macro_rules! parse_failure_tests {
    ( $type: ty, $( ($name: ident, $input: expr $(,)? ), )+ ) => {
        $(
            #[test]
            fn $name() {
                let got = run_parse::<$type>($input);
                assert!(got.is_err(), "parsing {:?} succeeded with {:?}", $input, got.ok());
            }
        )+
    };
}

pub(crate) use parse_failure_tests;
pub(crate) use parse_success_tests;
