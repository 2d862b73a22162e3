//! Variables: the targets of assignments.

use crate::codes::CodeKind;
use crate::state::parameters::{
    DimensionParameter, GlueParameter, IntegerParameter, TokenListParameter,
};
use crate::state::State;
use crate::token::Token;
use texfront_core::{Glue, Scaled};
use texfront_stdext::collections::groupingmap::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerVariable {
    Register(usize),
    Parameter(IntegerParameter),
    Code(CodeKind, char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionVariable {
    Register(usize),
    Parameter(DimensionParameter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlueVariable {
    Register(usize),
    Parameter(GlueParameter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenListVariable {
    Register(usize),
    Parameter(TokenListParameter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Integer(IntegerVariable),
    Dimension(DimensionVariable),
    Glue(GlueVariable),
    TokenList(TokenListVariable),
}

impl State {
    pub fn integer(&self, v: IntegerVariable) -> i32 {
        match v {
            IntegerVariable::Register(i) => self.registers.count(i),
            IntegerVariable::Parameter(p) => self.parameters.integer(p),
            IntegerVariable::Code(kind, c) => self.codes.get_or_default(kind, c),
        }
    }

    pub fn set_integer(&mut self, v: IntegerVariable, value: i32, scope: Scope) {
        match v {
            IntegerVariable::Register(i) => self.registers.set_count(i, value, scope),
            IntegerVariable::Parameter(p) => self.parameters.set_integer(p, value, scope),
            IntegerVariable::Code(kind, c) => self.codes.set(kind, c, value, scope),
        }
    }

    pub fn dimension(&self, v: DimensionVariable) -> Scaled {
        match v {
            DimensionVariable::Register(i) => self.registers.dimen(i),
            DimensionVariable::Parameter(p) => self.parameters.dimension(p),
        }
    }

    pub fn set_dimension(&mut self, v: DimensionVariable, value: Scaled, scope: Scope) {
        match v {
            DimensionVariable::Register(i) => self.registers.set_dimen(i, value, scope),
            DimensionVariable::Parameter(p) => self.parameters.set_dimension(p, value, scope),
        }
    }

    pub fn glue(&self, v: GlueVariable) -> Glue {
        match v {
            GlueVariable::Register(i) => self.registers.skip(i),
            GlueVariable::Parameter(p) => self.parameters.glue(p),
        }
    }

    pub fn set_glue(&mut self, v: GlueVariable, value: Glue, scope: Scope) {
        match v {
            GlueVariable::Register(i) => self.registers.set_skip(i, value, scope),
            GlueVariable::Parameter(p) => self.parameters.set_glue(p, value, scope),
        }
    }

    pub fn token_list(&self, v: TokenListVariable) -> &[Token] {
        match v {
            TokenListVariable::Register(i) => self.registers.toks(i),
            TokenListVariable::Parameter(p) => self.parameters.token_list(p),
        }
    }

    pub fn set_token_list(&mut self, v: TokenListVariable, value: Vec<Token>, scope: Scope) {
        match v {
            TokenListVariable::Register(i) => self.registers.set_toks(i, value, scope),
            TokenListVariable::Parameter(p) => self.parameters.set_token_list(p, value, scope),
        }
    }
}
