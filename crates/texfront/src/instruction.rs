//! Instructions: tokens classified by their current meaning.

use crate::command::Command;
use crate::font::FontId;
use crate::primitive::Primitive;
use crate::router::{Route, Router};
use crate::state::parameters::Parameter;
use crate::state::registers::RegisterKind;
use crate::texmacro::Macro;
use crate::token::{CommandRef, Frozen, Token, Value};
use std::rc::Rc;

/// What a token means at the moment it is read.
///
/// The last group of variants are aggregates: several tokens that the banisher
/// gathered into a single unit before handing them to the parser.
#[derive(Debug, Clone)]
pub enum Instruction {
    Character(Value),
    Primitive(Primitive),
    Macro(Rc<Macro>),
    Register(RegisterKind, usize),
    Parameter(Parameter),
    CharCode(u32),
    Font(FontId),
    /// A control sequence or active character with no meaning.
    Undefined,
    /// A token protected by `\noexpand`. It behaves like `\relax`.
    NoExpand,
    /// Marks the end of an alignment cell.
    EndTemplate,

    BalancedText(Vec<Token>),
    BoxContents(Vec<Command>),
    MacroDefinition(Box<MacroDefinition>),
    LetTarget(Box<LetTarget>),
    /// The end group character that closes a box, discretionary part or cell.
    EndOfSubPipeline,
}

#[derive(Debug, Clone)]
pub struct MacroDefinition {
    pub name: CommandRef,
    pub definition: Rc<Macro>,
    /// Set for `\gdef` and `\xdef`.
    pub force_global: bool,
}

#[derive(Debug, Clone)]
pub struct LetTarget {
    pub name: CommandRef,
    pub target: Token,
}

/// An instruction together with the token it was produced from.
#[derive(Debug, Clone)]
pub struct InstructionToken {
    pub instruction: Instruction,
    pub token: Token,
}

impl InstructionToken {
    pub fn new(instruction: Instruction, token: Token) -> InstructionToken {
        InstructionToken { instruction, token }
    }
}

impl Router {
    /// Classifies a token by its current meaning.
    pub fn classify(&self, token: Token) -> Instruction {
        let command_ref = match token.value() {
            Value::CommandRef(command_ref) => command_ref,
            value => return Instruction::Character(value),
        };
        if command_ref == CommandRef::Frozen(Frozen::EndTemplate) {
            return Instruction::EndTemplate;
        }
        match self.lookup(command_ref) {
            None => Instruction::Undefined,
            Some(route) => self.instruction_for_route(route),
        }
    }

    pub(crate) fn instruction_for_route(&self, route: Route) -> Instruction {
        match route {
            Route::Primitive(p) => Instruction::Primitive(p),
            Route::Macro(m) => Instruction::Macro(m),
            Route::Character(value) => Instruction::Character(value),
            Route::CharCode(c) => Instruction::CharCode(c),
            Route::Register(kind, i) => Instruction::Register(kind, i),
            Route::Parameter(p) => Instruction::Parameter(p),
            Route::Font(id) => Instruction::Font(id),
        }
    }
}

/// Whether two instructions have the same meaning, in the sense of `\ifx`.
pub fn same_meaning(a: &Instruction, b: &Instruction) -> bool {
    let relax = |i: &Instruction| {
        matches!(
            i,
            Instruction::NoExpand | Instruction::Primitive(Primitive::Relax)
        )
    };
    match (a, b) {
        (Instruction::Character(a), Instruction::Character(b)) => a == b,
        (Instruction::Primitive(a), Instruction::Primitive(b)) => a == b,
        (Instruction::Macro(a), Instruction::Macro(b)) => a == b,
        (Instruction::Register(a, i), Instruction::Register(b, j)) => a == b && i == j,
        (Instruction::Parameter(a), Instruction::Parameter(b)) => a == b,
        (Instruction::CharCode(a), Instruction::CharCode(b)) => a == b,
        (Instruction::Font(a), Instruction::Font(b)) => a == b,
        (Instruction::Undefined, Instruction::Undefined) => true,
        _ => relax(a) && relax(b),
    }
}
