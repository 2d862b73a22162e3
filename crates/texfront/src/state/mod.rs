//! The state of the pipeline that TeX commands can change.
//!
//! Every container here is scoped: [State::push_scope] and [State::pop_scope]
//! begin and end a group in all of them at once.

pub mod parameters;
pub mod registers;

use crate::codes::Codes;
use crate::config::Config;
use crate::font::Fonts;
use crate::router::Router;
use crate::token::CsNameInterner;
use parameters::{IntegerParameter, Parameters};
use registers::Registers;
use texfront_stdext::collections::groupingmap::{NoGroupToEndError, Scope};

#[derive(Debug)]
pub struct State {
    pub codes: Codes,
    pub router: Router,
    pub registers: Registers,
    pub parameters: Parameters,
    pub fonts: Fonts,
    depth: usize,
}

impl State {
    pub fn new(config: &Config, interner: &mut CsNameInterner) -> State {
        State {
            codes: Codes::new(config.cat_codes),
            router: Router::new(interner),
            registers: Default::default(),
            parameters: Parameters::new(config),
            fonts: Default::default(),
            depth: 0,
        }
    }

    /// Number of open groups.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push_scope(&mut self) {
        self.codes.begin_group();
        self.router.begin_group();
        self.registers.begin_group();
        self.parameters.begin_group();
        self.fonts.begin_group();
        self.depth += 1;
        log::debug!("entered group at depth {}", self.depth);
    }

    pub fn pop_scope(&mut self) -> Result<(), NoGroupToEndError> {
        if self.depth == 0 {
            return Err(NoGroupToEndError);
        }
        self.codes.end_group()?;
        self.router.end_group()?;
        self.registers.end_group()?;
        self.parameters.end_group()?;
        self.fonts.end_group()?;
        self.depth -= 1;
        log::debug!("left group, now at depth {}", self.depth);
        Ok(())
    }

    /// The scope of an assignment, taking `\globaldefs` into account.
    pub fn scope(&self, global: bool) -> Scope {
        match self.parameters.integer(IntegerParameter::GlobalDefs) {
            i if i > 0 => Scope::Global,
            i if i < 0 => Scope::Local,
            _ => Scope::from_global_flag(global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_without_push() {
        let mut interner = CsNameInterner::default();
        let mut state = State::new(&Default::default(), &mut interner);
        assert!(state.pop_scope().is_err());
        state.push_scope();
        assert_eq!(state.depth(), 1);
        assert!(state.pop_scope().is_ok());
    }

    #[test]
    fn globaldefs_overrides_prefix() {
        let mut interner = CsNameInterner::default();
        let mut state = State::new(&Default::default(), &mut interner);
        assert_eq!(state.scope(false), Scope::Local);
        state
            .parameters
            .set_integer(IntegerParameter::GlobalDefs, 1, Scope::Local);
        assert_eq!(state.scope(false), Scope::Global);
        state
            .parameters
            .set_integer(IntegerParameter::GlobalDefs, -1, Scope::Local);
        assert_eq!(state.scope(true), Scope::Local);
    }
}
