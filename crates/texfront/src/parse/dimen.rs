//! Dimension parsing. TeX.2021.448.

use super::keyword::keyword;
use super::number::{self, Constant};
use super::InternalValue;
use crate::banisher::Banisher;
use crate::error::{Error, Result};
use crate::instruction::InstructionToken;
use crate::state::parameters::IntegerParameter;
use crate::token::{Token, Value};
use texfront_core::{GlueOrder, Scaled, ScaledUnit};

const UNIT_GUIDANCE: &str = "a unit of measure is one of pt, pc, in, bp, cm, mm, dd, cc, sp, em and ex, \
optionally preceded by true, or an internal dimension like \\dimen0";

/// Parses a dimension.
///
/// If `allow_infinite` is set, as it is for the stretch and shrink of glue,
/// the units `fil`, `fill` and `filll` are accepted too.
pub(super) fn parse_dimension(b: &mut Banisher, allow_infinite: bool) -> Result<(Scaled, GlueOrder)> {
    let negative = number::parse_signs(b)?;
    let it = b.next_expanded_or_err("reading a dimension")?;
    parse_dimension_from(b, negative, it, allow_infinite)
}

/// Parses a dimension whose signs and first instruction have been read.
pub(super) fn parse_dimension_from(
    b: &mut Banisher,
    negative: bool,
    it: InstructionToken,
    allow_infinite: bool,
) -> Result<(Scaled, GlueOrder)> {
    let start = it.token;
    let (integer, fraction) = match it.token.value() {
        Value::Other('.' | ',') => (0, parse_decimal_fraction(b)?),
        value if number::starts_constant(value) => {
            let Constant {
                value,
                decimal,
                terminator,
            } = number::parse_constant(b, it)?;
            match terminator {
                Some(next) if decimal && matches!(next.token.value(), Value::Other('.' | ',')) => {
                    (value, parse_decimal_fraction(b)?)
                }
                terminator => {
                    number::finish_constant(b, terminator);
                    (value, Scaled::ZERO)
                }
            }
        }
        _ => match super::internal_value(b, &it)? {
            Some(InternalValue::Dimension(d)) => return Ok((apply_sign(negative, d), GlueOrder::Normal)),
            Some(InternalValue::Glue(g)) => {
                return Ok((apply_sign(negative, g.width), GlueOrder::Normal))
            }
            Some(InternalValue::Integer(n)) => (n, Scaled::ZERO),
            _ => {
                b.push_back(it);
                return Err(b.syntax_error(
                    "a dimension",
                    Some(start),
                    "a dimension is a number followed by a unit of measure, or an internal dimension",
                ));
            }
        },
    };
    parse_units(b, negative, integer, fraction, allow_infinite, start)
}

fn apply_sign(negative: bool, s: Scaled) -> Scaled {
    if negative {
        -s
    } else {
        s
    }
}

/// TeX.2021.452. At most 17 digits affect the result.
fn parse_decimal_fraction(b: &mut Banisher) -> Result<Scaled> {
    let mut digits = [0_u8; 17];
    let mut i = 0_usize;
    while let Some(it) = b.next_expanded()? {
        let d = match it.token.value() {
            Value::Other(c @ '0'..='9') => c as u8 - b'0',
            Value::Space(_) => break,
            _ => {
                b.push_back(it);
                break;
            }
        };
        if let Some(digit) = digits.get_mut(i) {
            *digit = d;
            i += 1;
        }
    }
    Ok(Scaled::from_decimal_fraction(&digits[0..i]))
}

/// Reads the unit of measure and applies it. TeX.2021.453.
pub(super) fn parse_units(
    b: &mut Banisher,
    mut negative: bool,
    integer: i32,
    fraction: Scaled,
    allow_infinite: bool,
    start: Token,
) -> Result<(Scaled, GlueOrder)> {
    if integer < 0 {
        negative = !negative;
    }
    let too_large = || Error::overflow(Some(start), "dimension too large");
    let mut integer = integer.checked_abs().ok_or_else(too_large)?;
    let mut fraction = fraction;

    // TeX.2021.454
    if allow_infinite && keyword(b, "fil")? {
        let mut order = GlueOrder::Fil;
        while keyword(b, "l")? {
            order = match order {
                GlueOrder::Normal | GlueOrder::Fil => GlueOrder::Fill,
                GlueOrder::Fill => GlueOrder::Filll,
                GlueOrder::Filll => {
                    return Err(Error::overflow(
                        Some(start),
                        "illegal unit of measure: the largest order of infinity is filll",
                    ))
                }
            };
        }
        let s = attach_fraction(integer, fraction).ok_or_else(too_large)?;
        super::optional_space(b)?;
        return Ok((apply_sign(negative, s), order));
    }

    // TeX.2021.455
    let v = match internal_unit(b)? {
        Some(v) => Some(v),
        None => {
            if keyword(b, "em")? {
                super::optional_space(b)?;
                Some(b.state.fonts.current().quad())
            } else if keyword(b, "ex")? {
                super::optional_space(b)?;
                Some(b.state.fonts.current().x_height())
            } else {
                None
            }
        }
    };
    if let Some(v) = v {
        let s = v
            .xn_over_d(fraction.0, 0o200000)
            .and_then(|(f, _)| v.nx_plus_y(integer, f))
            .map_err(|_| too_large())?;
        return Ok((apply_sign(negative, s), GlueOrder::Normal));
    }

    // TeX.2021.457
    if keyword(b, "true")? {
        let mag = b.state.parameters.integer(IntegerParameter::Mag);
        if !(1..=32768).contains(&mag) {
            return Err(Error::overflow(
                Some(start),
                format!["illegal magnification {mag}: \\mag must be between 1 and 32768"],
            ));
        }
        if mag != 1000 {
            let (i, remainder) = Scaled(integer).xn_over_d(1000, mag).map_err(|_| too_large())?;
            let f = (1000 * fraction.0 as i64 + (1 << 16) * remainder.0 as i64) / mag as i64;
            integer = i.0 + (f >> 16) as i32;
            fraction = Scaled((f & 0xFFFF) as i32);
        }
    }

    // TeX.2021.458
    let mut unit = None;
    for (abbreviation, candidate) in ScaledUnit::ALL {
        if keyword(b, abbreviation)? {
            unit = Some(candidate);
            break;
        }
    }
    let unit = match unit {
        Some(unit) => unit,
        None => {
            let got = b.next_expanded()?;
            let got_token = got.as_ref().map(|it| it.token);
            if let Some(got) = got {
                b.push_back(got);
            }
            return Err(b.syntax_error("a unit of measure", got_token, UNIT_GUIDANCE));
        }
    };
    let s = match unit {
        // The fractional part of a dimension in scaled points is dropped.
        ScaledUnit::ScaledPoint => Some(Scaled(integer)),
        ScaledUnit::Point => attach_fraction(integer, fraction),
        _ => {
            let (n, d) = unit.conversion_fraction();
            let (i, remainder) = Scaled(integer).xn_over_d(n, d).map_err(|_| too_large())?;
            let f = (n as i64 * fraction.0 as i64 + (1 << 16) * remainder.0 as i64) / d as i64;
            match i.0.checked_add((f >> 16) as i32) {
                None => None,
                Some(integer) => attach_fraction(integer, Scaled((f & 0xFFFF) as i32)),
            }
        }
    };
    super::optional_space(b)?;
    match s {
        Some(s) if s <= Scaled::MAX_DIMEN => Ok((apply_sign(negative, s), GlueOrder::Normal)),
        _ => Err(too_large()),
    }
}

fn attach_fraction(integer: i32, fraction: Scaled) -> Option<Scaled> {
    if integer >= 1 << 14 {
        None
    } else {
        Some(Scaled(integer * Scaled::ONE.0 + fraction.0))
    }
}

/// An internal quantity used as a unit, as in `2\dimen0`.
///
/// Integers are used as a number of scaled points.
fn internal_unit(b: &mut Banisher) -> Result<Option<Scaled>> {
    loop {
        let it = match b.next_expanded()? {
            None => return Ok(None),
            Some(it) => it,
        };
        if let Value::Space(_) = it.token.value() {
            continue;
        }
        if it.token.command_ref().is_none() {
            b.push_back(it);
            return Ok(None);
        }
        return Ok(match super::internal_value(b, &it)? {
            Some(InternalValue::Integer(n)) => Some(Scaled(n)),
            Some(InternalValue::Dimension(d)) => Some(d),
            Some(InternalValue::Glue(g)) => Some(g.width),
            Some(_) => {
                let got = it.token;
                b.push_back(it);
                return Err(b.syntax_error("a unit of measure", Some(got), UNIT_GUIDANCE));
            }
            None => {
                b.push_back(it);
                None
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::testing::*;
    use texfront_core::Scaled;

    parse_success_tests![
        Scaled,
        (zero_pt, "0pt", Scaled::ZERO),
        (one_pt, "1pt", Scaled::ONE),
        (one_pt_negative, "-1pt", -Scaled::ONE),
        (upper_case_unit, "2PT", Scaled::TWO),
        (space_before_unit, "1 pt", Scaled::ONE),
        (empty_fraction, ".pt", Scaled::ZERO),
        (fraction, "1.5pt", Scaled::ONE + Scaled::from_decimal_fraction(&[5])),
        (comma_fraction, "-0,5pt", -Scaled::from_decimal_fraction(&[5])),
        (pi, "3.14159pt", Scaled(205887)),
        (units_in, "1in", (Scaled::ONE * 7227) / 100),
        (units_pc, "1pc", Scaled::ONE * 12),
        (units_cm, "1cm", (Scaled::ONE * 7227) / 254),
        (units_mm, "1mm", (Scaled::ONE * 7227) / 2540),
        (units_bp, "1bp", (Scaled::ONE * 7227) / 7200),
        (units_dd, "1dd", (Scaled::ONE * 1238) / 1157),
        (units_cc, "1cc", (Scaled::ONE * 14856) / 1157),
        (units_sp, "1.999999sp", Scaled(1)),
        (true_units_without_magnification, "1truept", Scaled::ONE),
        (nearly_overflow_pt, "16383.99998pt", Scaled::MAX_DIMEN),
        (nearly_overflow_sp, "1073741823sp", Scaled::MAX_DIMEN),
        (internal_dimension, r"\hsize", Scaled::ZERO),
        (internal_unit, r"2\count0", Scaled::ZERO),
        (null_font_em, "1em", Scaled::ZERO),
    ];

    parse_failure_tests![
        Scaled,
        (invalid_unit, "1xy"),
        (missing_unit, "1"),
        (overflow_pt, "16384pt"),
        (overflow_pt_negative, "-16384pt"),
        (overflow_in, "300in"),
        (overflow_sp, "1073741824sp"),
        (fil_is_not_a_unit, "1fil"),
    ];

    #[test]
    fn internal_dimension_as_unit() {
        let got = parse_after::<Scaled>(r"\dimen0=2pt", r"3\dimen0").unwrap();
        assert_eq!(got, Scaled::ONE * 6);
    }

    #[test]
    fn true_units_are_demagnified() {
        let got = parse_after::<Scaled>(r"\mag=2000", "2truept").unwrap();
        assert_eq!(got, Scaled::ONE);
    }

    #[test]
    fn magnification_out_of_range() {
        assert!(parse_after::<Scaled>(r"\mag=0", "2truept").is_err());
    }

    #[test]
    fn em_uses_the_current_font() {
        let mut b = banisher_with_square_font();
        let got = parse_in::<Scaled>(&mut b, "2em").unwrap();
        assert_eq!(got, Scaled::ONE * 20);
        let got = parse_in::<Scaled>(&mut b, "1ex").unwrap();
        assert_eq!(got, Scaled::ONE * 5);
    }
}
