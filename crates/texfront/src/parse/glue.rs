//! Glue parsing. TeX.2021.461.

use super::dimen;
use super::keyword::keyword;
use super::number;
use super::InternalValue;
use crate::banisher::Banisher;
use crate::error::Result;
use texfront_core::{Glue, GlueOrder, Scaled};

pub(super) fn parse_glue(b: &mut Banisher) -> Result<Glue> {
    let negative = number::parse_signs(b)?;
    let it = b.next_expanded_or_err("reading glue")?;
    let start = it.token;
    let width = match super::internal_value(b, &it)? {
        Some(InternalValue::Glue(g)) => return Ok(if negative { -g } else { g }),
        Some(InternalValue::Dimension(d)) => {
            if negative {
                -d
            } else {
                d
            }
        }
        Some(InternalValue::Integer(n)) => {
            dimen::parse_units(b, negative, n, Scaled::ZERO, false, start)?.0
        }
        Some(_) => {
            b.push_back(it);
            return Err(b.syntax_error(
                "glue",
                Some(start),
                "glue is a dimension optionally followed by plus and minus components, or an internal glue like \\skip0",
            ));
        }
        None => dimen::parse_dimension_from(b, negative, it, false)?.0,
    };
    let mut glue = Glue::from_width(width);
    if let Some((stretch, order)) = optional_component(b, "plus")? {
        glue.stretch = stretch;
        glue.stretch_order = order;
    }
    if let Some((shrink, order)) = optional_component(b, "minus")? {
        glue.shrink = shrink;
        glue.shrink_order = order;
    }
    Ok(glue)
}

fn optional_component(b: &mut Banisher, word: &str) -> Result<Option<(Scaled, GlueOrder)>> {
    super::optional_continuation(b, |b| {
        if !keyword(b, word)? {
            return Ok(None);
        }
        Ok(Some(dimen::parse_dimension(b, true)?))
    })
}

#[cfg(test)]
mod tests {
    use crate::parse::testing::*;
    use texfront_core::{Glue, GlueOrder, Scaled};

    parse_success_tests![
        Glue,
        (width_only, "1pt", Glue::from_width(Scaled::ONE)),
        (
            width_and_stretch,
            "1pt plus 2pt",
            Glue {
                width: Scaled::ONE,
                stretch: Scaled::TWO,
                ..Default::default()
            }
        ),
        (
            width_and_shrink,
            "1pt minus 2pt",
            Glue {
                width: Scaled::ONE,
                shrink: Scaled::TWO,
                ..Default::default()
            }
        ),
        (
            stretch_fil,
            "0pt plus 1fil",
            Glue {
                stretch: Scaled::ONE,
                stretch_order: GlueOrder::Fil,
                ..Default::default()
            }
        ),
        (
            stretch_fill_upper_case,
            "0pt plus 1FILL",
            Glue {
                stretch: Scaled::ONE,
                stretch_order: GlueOrder::Fill,
                ..Default::default()
            }
        ),
        (
            stretch_and_shrink_filll,
            "-1pt plus -2pt minus 3 filll",
            Glue {
                width: -Scaled::ONE,
                stretch: -Scaled::TWO,
                shrink: Scaled::ONE * 3,
                shrink_order: GlueOrder::Filll,
                ..Default::default()
            }
        ),
        (negated_internal_glue, r"-\skip0", Glue::default()),
        (internal_dimension_width, r"\hsize plus 1pt", Glue {
            stretch: Scaled::ONE,
            ..Default::default()
        }),
    ];

    parse_failure_tests![
        Glue,
        (no_unit, "1"),
        (fil_as_width, "1fil"),
        (too_many_ls, "1pt plus 1fillll"),
    ];

    #[test]
    fn internal_glue_is_not_followed_by_components() {
        let rest = parse_and_collect_rest::<Glue>(r"\skip0 plus 1pt");
        assert_eq!(rest, "plus 1pt");
    }

    #[test]
    fn incomplete_stretch_is_returned_to_the_input() {
        let rest = parse_and_collect_rest::<Glue>("1pt plus 2xx");
        assert_eq!(rest, "plus 2xx");
    }

    #[test]
    fn glue_register() {
        let got = parse_after::<Glue>(r"\skip3=1pt plus 2fil", r"\skip3").unwrap();
        assert_eq!(
            got,
            Glue {
                width: Scaled::ONE,
                stretch: Scaled::TWO,
                stretch_order: GlueOrder::Fil,
                ..Default::default()
            }
        );
    }
}
