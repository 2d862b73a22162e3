//! Parsing elements of the TeX grammar from the expanded instruction stream.
//!
//! The module is built around the [Parsable] trait, which is implemented by the Rust types
//! that correspond to elements of the grammar: [i32] for numbers, [Scaled] for dimensions,
//! [Glue] and [std::cmp::Ordering] for relations.
//! Commands are parsed by [command::parse_command].
//!
//! Explicit character tokens are matched on the token's value, so a command that was `\let`
//! to a character never counts as a digit, keyword letter or `=`.

#[macro_use]
mod helpers;

pub mod command;
mod dimen;
mod glue;
mod keyword;
mod number;
mod relation;
#[cfg(test)]
mod testing;
mod variable;

pub(crate) use keyword::keyword;
pub(crate) use number::{parse_char_code, parse_register_index};
pub(crate) use variable::parse_variable;

use crate::banisher::Banisher;
use crate::error::Result;
use crate::font::FontId;
use crate::instruction::{Instruction, InstructionToken};
use crate::primitive::Primitive;
use crate::token::{Token, Value};
use crate::variable::Variable;
use texfront_core::{Glue, Scaled};

/// Elements of the TeX grammar that can be parsed from the expanded input.
pub trait Parsable: Sized {
    fn parse(b: &mut Banisher) -> Result<Self>;
}

macro_rules! generate_tuple_impls {
    ( $first: ident ) => {};
    ( $first: ident, $( $name: ident ),+ ) => {
        generate_tuple_impls![ $( $name ),+];

        impl<$first : Parsable, $( $name : Parsable ),+> Parsable for ($first, $( $name ),+) {
            fn parse(b: &mut Banisher) -> Result<Self> {
                Ok(($first::parse(b)?, $( $name::parse(b)? ),+))
            }
        }
    };
}

generate_tuple_impls![T1, T2, T3];

/// The value of an internal quantity, as read by `\the`.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalValue {
    Integer(i32),
    Dimension(Scaled),
    Glue(Glue),
    TokenList(Vec<Token>),
    Font(FontId),
}

/// Reads the internal quantity that starts with the provided instruction.
///
/// Returns [None] if the instruction does not refer to an internal quantity.
/// In this case nothing is read from the input.
pub fn internal_value(b: &mut Banisher, it: &InstructionToken) -> Result<Option<InternalValue>> {
    if let Some(variable) = parse_variable(b, it)? {
        let state = &b.state;
        return Ok(Some(match variable {
            Variable::Integer(v) => InternalValue::Integer(state.integer(v)),
            Variable::Dimension(v) => InternalValue::Dimension(state.dimension(v)),
            Variable::Glue(v) => InternalValue::Glue(state.glue(v)),
            Variable::TokenList(v) => InternalValue::TokenList(state.token_list(v).to_vec()),
        }));
    }
    Ok(match it.instruction {
        Instruction::CharCode(c) => Some(InternalValue::Integer(c as i32)),
        Instruction::Font(id) => Some(InternalValue::Font(id)),
        Instruction::Primitive(Primitive::NullFont) => Some(InternalValue::Font(FontId::NULL_FONT)),
        Instruction::Primitive(Primitive::Font) => {
            Some(InternalValue::Font(b.state.fonts.current_id()))
        }
        _ => None,
    })
}

/// Consumes an optional `=`, and the spaces before it.
///
/// TeX.2021.405.
pub fn optional_equals(b: &mut Banisher) -> Result<()> {
    while let Some(found_equals) = get_optional_element![
        b,
        Value::Other('=') => true,
        Value::Space(_) => false,
    ] {
        if found_equals {
            break;
        }
    }
    Ok(())
}

/// Consumes a single optional space.
pub fn optional_space(b: &mut Banisher) -> Result<()> {
    get_optional_element![b, Value::Space(_) => (),];
    Ok(())
}

/// Consumes any number of spaces.
pub fn optional_spaces(b: &mut Banisher) -> Result<()> {
    while get_optional_element![b, Value::Space(_) => (),].is_some() {}
    Ok(())
}

/// Parses an optional continuation of a command.
///
/// A syntax error inside the continuation means the command ended before it.
/// Everything the continuation read is returned to the input and [None] is returned.
pub fn optional_continuation<T, F>(b: &mut Banisher, f: F) -> Result<Option<T>>
where
    F: FnOnce(&mut Banisher) -> Result<Option<T>>,
{
    let mark = b.mark();
    match f(b) {
        Ok(value) => Ok(value),
        Err(err) if err.is_syntax() => {
            log::trace!("optional continuation failed, rewinding: {err}");
            b.rewind(mark);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl Parsable for i32 {
    fn parse(b: &mut Banisher) -> Result<Self> {
        number::parse_integer(b)
    }
}

impl Parsable for Scaled {
    fn parse(b: &mut Banisher) -> Result<Self> {
        Ok(dimen::parse_dimension(b, false)?.0)
    }
}

impl Parsable for Glue {
    fn parse(b: &mut Banisher) -> Result<Self> {
        glue::parse_glue(b)
    }
}
