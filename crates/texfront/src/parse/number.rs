//! Number parsing.
//!
//! A number is a sequence of signs followed by a decimal, octal (`'`) or hexadecimal (`"`)
//! constant, a character constant (`` ` ``), or an internal quantity. TeX.2021.440.

use super::InternalValue;
use crate::banisher::Banisher;
use crate::error::{Error, Result};
use crate::instruction::InstructionToken;
use crate::state::registers::NUM_REGISTERS;
use crate::token::{CommandRef, Token, Value};

const GUIDANCE: &str = "a number begins with zero or more signs followed by one of the following:
- A decimal digit (0-9), which begins a decimal number.
- The character ', which begins an octal number.
- The character \", which begins a hexadecimal number.
- The character ` followed by a character token or a single-character control sequence.
- A command that references an internal quantity, like \\count0 or \\year.";

/// An integer constant, together with the expanded instruction that ended it.
pub(super) struct Constant {
    pub value: i32,
    pub decimal: bool,
    pub terminator: Option<InstructionToken>,
}

/// Parses optional signs and spaces, returning true if the combined sign is negative.
pub(super) fn parse_signs(b: &mut Banisher) -> Result<bool> {
    let mut negative = false;
    while let Some(minus) = get_optional_element![
        b,
        Value::Other('+') => false,
        Value::Other('-') => true,
        Value::Space(_) => false,
    ] {
        negative ^= minus;
    }
    Ok(negative)
}

pub(super) fn starts_constant(value: Value) -> bool {
    matches!(value, Value::Other('0'..='9' | '\'' | '"' | '`'))
}

pub(super) fn parse_integer(b: &mut Banisher) -> Result<i32> {
    let negative = parse_signs(b)?;
    let it = b.next_expanded_or_err("reading a number")?;
    let n = if starts_constant(it.token.value()) {
        let constant = parse_constant(b, it)?;
        finish_constant(b, constant.terminator);
        constant.value
    } else {
        match super::internal_value(b, &it)? {
            Some(InternalValue::Integer(n)) => n,
            Some(InternalValue::Dimension(d)) => d.0,
            Some(InternalValue::Glue(g)) => g.width.0,
            _ => {
                let got = it.token;
                b.push_back(it);
                return Err(b.syntax_error("a number", Some(got), GUIDANCE));
            }
        }
    };
    // Only i32::MIN cannot be negated, and it cannot be produced by a constant.
    Ok(if negative { n.wrapping_neg() } else { n })
}

/// Handles the token after a constant: a space is consumed and anything else is returned.
pub(super) fn finish_constant(b: &mut Banisher, terminator: Option<InstructionToken>) {
    match terminator {
        Some(it) if !matches!(it.token.value(), Value::Space(_)) => b.push_back(it),
        _ => {}
    }
}

/// Parses a constant whose first token has been read.
pub(super) fn parse_constant(b: &mut Banisher, first: InstructionToken) -> Result<Constant> {
    match first.token.value() {
        Value::Other(c @ '0'..='9') => parse_digits(b, 10, Some(c as i64 - '0' as i64), first.token),
        Value::Other('\'') => parse_digits(b, 8, None, first.token),
        Value::Other('"') => parse_digits(b, 16, None, first.token),
        _ => {
            let value = parse_character(b)?;
            Ok(Constant {
                value,
                decimal: false,
                terminator: b.next_expanded()?,
            })
        }
    }
}

fn digit(value: Value, radix: i64) -> Option<i64> {
    let d = match value {
        Value::Other(c @ '0'..='9') => c as i64 - '0' as i64,
        Value::Other(c @ 'A'..='F') | Value::Letter(c @ 'A'..='F') if radix == 16 => {
            c as i64 - 'A' as i64 + 10
        }
        _ => return None,
    };
    if d < radix {
        Some(d)
    } else {
        None
    }
}

fn parse_digits(b: &mut Banisher, radix: i64, first: Option<i64>, start: Token) -> Result<Constant> {
    let mut value = first.unwrap_or(0);
    let mut started = first.is_some();
    loop {
        let it = match b.next_expanded()? {
            None => break,
            Some(it) => it,
        };
        let d = match digit(it.token.value(), radix) {
            Some(d) => d,
            None => {
                if !started {
                    let got = it.token;
                    b.push_back(it);
                    return Err(digit_error(b, radix, Some(got)));
                }
                return Ok(Constant {
                    value: value as i32,
                    decimal: radix == 10,
                    terminator: Some(it),
                });
            }
        };
        started = true;
        value = value * radix + d;
        if value > i32::MAX as i64 {
            return Err(Error::overflow(
                Some(start),
                format!["number too big: the largest number is {}", i32::MAX],
            ));
        }
    }
    if !started {
        return Err(digit_error(b, radix, None));
    }
    Ok(Constant {
        value: value as i32,
        decimal: radix == 10,
        terminator: None,
    })
}

fn digit_error(b: &Banisher, radix: i64, got: Option<Token>) -> Box<Error> {
    let (expected, guidance) = match radix {
        8 => (
            "an octal digit",
            "an octal digit is a token with value 0-7 and category other",
        ),
        _ => (
            "a hexadecimal digit",
            "a hexadecimal digit is a token with value 0-9 and category other, or A-F and category letter or other",
        ),
    };
    b.syntax_error(expected, got, guidance)
}

/// TeX.2021.442. The token after the backtick is not expanded.
fn parse_character(b: &mut Banisher) -> Result<i32> {
    let token = match b.next_raw()? {
        None => return Err(b.syntax_error("a character after `", None, GUIDANCE)),
        Some(token) => token,
    };
    let c = match token.value() {
        Value::CommandRef(CommandRef::ControlSequence(cs_name)) => {
            let name = b.interner.resolve(cs_name).unwrap_or_default();
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(b.syntax_error(
                        "a character",
                        Some(token),
                        "a character is a character token or single-character control sequence like \\a",
                    ))
                }
            }
        }
        Value::CommandRef(CommandRef::Frozen(_)) => {
            return Err(b.syntax_error("a character", Some(token), ""));
        }
        value => match value.char_and_cat_code() {
            Some((c, _)) => c,
            None => return Err(b.syntax_error("a character", Some(token), "")),
        },
    };
    Ok(c as i32)
}

/// Parses the index of a register.
pub(crate) fn parse_register_index(b: &mut Banisher, token: Token) -> Result<usize> {
    let n = parse_integer(b)?;
    match usize::try_from(n) {
        Ok(i) if i < NUM_REGISTERS => Ok(i),
        _ => Err(Error::overflow(
            Some(token),
            format!["bad register code {n}: registers are numbered 0 to {}", NUM_REGISTERS - 1],
        )),
    }
}

/// Parses a character code.
pub(crate) fn parse_char_code(b: &mut Banisher, token: Token) -> Result<char> {
    let n = parse_integer(b)?;
    match u32::try_from(n).ok().and_then(char::from_u32) {
        Some(c) => Ok(c),
        None => Err(Error::overflow(
            Some(token),
            format!["bad character code {n}"],
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::testing::*;

    parse_success_tests![
        i32,
        (octal_15, "'17", 15),
        (octal_129, "'201", 129),
        (octal_max, "'17777777777", 2147483647),
        (decimal_0, "0", 0),
        (decimal_padded, "00019", 19),
        (decimal_max, "2147483647", 2147483647),
        (decimal_min, "-2147483647", -2147483647),
        (hexadecimal_31, "\"1F", 31),
        (hexadecimal_letter_category, "\"AB", 171),
        (hexadecimal_max, "\"7FFFFFFF", 2147483647),
        (character, "`A", 65),
        (character_control_sequence, r"`\A", 65),
        (character_non_ascii, "`ö", 0x00F6),
        (character_active, "`~", 126),
        (signs_plus, "+4", 4),
        (signs_minus_minus_spaces, "  -  - 4", 4),
        (signs_plus_minus, "+-4", -4),
        (count_register, r"\count1", 0),
        (integer_parameter, r"\mag", 1000),
        (cat_code, r"\catcode`\{", 1),
        (conditional_in_number, r"1\iftrue2\else3\fi", 12),
    ];

    parse_failure_tests![
        i32,
        (letter, "a"),
        (octal_empty, "'"),
        (octal_digit_too_big, "'8"),
        (hexadecimal_empty, "\"G"),
        (decimal_too_big, "2147483648"),
        (decimal_much_too_big, "500000000000000"),
        (hexadecimal_too_big, "\"7FFFFFFF0"),
        (character_missing, "`"),
        (control_sequence_too_long, r"`\BC"),
        (token_list, r"\toks0"),
    ];

    #[test]
    fn char_def_constant() {
        assert_eq!(parse_after::<i32>(r"\chardef\x=77", r"\x").unwrap(), 77);
    }

    #[test]
    fn dimension_is_coerced_to_scaled_points() {
        assert_eq!(parse_after::<i32>(r"\dimen0=1pt", r"\dimen0").unwrap(), 65536);
    }

    #[test]
    fn macro_expands_to_digits() {
        assert_eq!(parse_after::<i32>(r"\def\x{12}", r"\x3").unwrap(), 123);
    }

    #[test]
    fn space_after_constant_is_consumed() {
        let rest = parse_and_collect_rest::<i32>("12 3");
        assert_eq!(rest, "3");
    }

    #[test]
    fn terminator_is_returned_to_the_input() {
        let rest = parse_and_collect_rest::<i32>("12a b");
        assert_eq!(rest, "a b");
    }
}
