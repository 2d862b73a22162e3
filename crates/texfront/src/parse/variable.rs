use super::number::{parse_char_code, parse_register_index};
use crate::banisher::Banisher;
use crate::codes::CodeKind;
use crate::error::Result;
use crate::instruction::{Instruction, InstructionToken};
use crate::primitive::Primitive;
use crate::state::parameters::Parameter;
use crate::state::registers::RegisterKind;
use crate::variable::{
    DimensionVariable, GlueVariable, IntegerVariable, TokenListVariable, Variable,
};

/// Reads the variable that starts with the provided instruction.
///
/// Returns [None] without reading anything if the instruction does not start a variable.
pub fn parse_variable(b: &mut Banisher, it: &InstructionToken) -> Result<Option<Variable>> {
    let register = |kind: RegisterKind, i: usize| match kind {
        RegisterKind::Count => Variable::Integer(IntegerVariable::Register(i)),
        RegisterKind::Dimen => Variable::Dimension(DimensionVariable::Register(i)),
        RegisterKind::Skip => Variable::Glue(GlueVariable::Register(i)),
        RegisterKind::Toks => Variable::TokenList(TokenListVariable::Register(i)),
    };
    let code = |p: Primitive| match p {
        Primitive::CatCode => Some(CodeKind::Category),
        Primitive::LcCode => Some(CodeKind::LowerCase),
        Primitive::UcCode => Some(CodeKind::UpperCase),
        Primitive::SfCode => Some(CodeKind::SpaceFactor),
        Primitive::MathCode => Some(CodeKind::Math),
        Primitive::DelCode => Some(CodeKind::Delimiter),
        _ => None,
    };
    Ok(Some(match it.instruction {
        Instruction::Register(kind, i) => register(kind, i),
        Instruction::Parameter(p) => match p {
            Parameter::Integer(p) => Variable::Integer(IntegerVariable::Parameter(p)),
            Parameter::Dimension(p) => Variable::Dimension(DimensionVariable::Parameter(p)),
            Parameter::Glue(p) => Variable::Glue(GlueVariable::Parameter(p)),
            Parameter::TokenList(p) => Variable::TokenList(TokenListVariable::Parameter(p)),
        },
        Instruction::Primitive(p) => {
            let kind = match p {
                Primitive::Count => Some(RegisterKind::Count),
                Primitive::Dimen => Some(RegisterKind::Dimen),
                Primitive::Skip => Some(RegisterKind::Skip),
                Primitive::Toks => Some(RegisterKind::Toks),
                _ => None,
            };
            if let Some(kind) = kind {
                register(kind, parse_register_index(b, it.token)?)
            } else if let Some(kind) = code(p) {
                Variable::Integer(IntegerVariable::Code(kind, parse_char_code(b, it.token)?))
            } else {
                return Ok(None);
            }
        }
        _ => return Ok(None),
    }))
}
