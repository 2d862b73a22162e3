//! Numbered registers: `\count`, `\dimen`, `\skip`, `\toks` and `\box`.

use crate::command::TexBox;
use crate::token::Token;
use texfront_core::{Glue, Scaled};
use texfront_stdext::collections::groupingmap::{GroupingVec, NoGroupToEndError, Scope};

/// Number of registers of each kind.
pub const NUM_REGISTERS: usize = 256;

/// The kind of a register.
///
/// Box registers are not included because they cannot be the target of a
/// short hand definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterKind {
    Count,
    Dimen,
    Skip,
    Toks,
}

impl std::fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegisterKind::Count => "count",
            RegisterKind::Dimen => "dimen",
            RegisterKind::Skip => "skip",
            RegisterKind::Toks => "toks",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Default)]
pub struct Registers {
    count: GroupingVec<i32>,
    dimen: GroupingVec<Scaled>,
    skip: GroupingVec<Glue>,
    toks: GroupingVec<Vec<Token>>,
    boxes: GroupingVec<Option<TexBox>>,
}

impl Registers {
    pub fn count(&self, i: usize) -> i32 {
        self.count.get(&i).copied().unwrap_or_default()
    }

    pub fn set_count(&mut self, i: usize, value: i32, scope: Scope) {
        self.count.insert(i, value, scope);
    }

    pub fn dimen(&self, i: usize) -> Scaled {
        self.dimen.get(&i).copied().unwrap_or_default()
    }

    pub fn set_dimen(&mut self, i: usize, value: Scaled, scope: Scope) {
        self.dimen.insert(i, value, scope);
    }

    pub fn skip(&self, i: usize) -> Glue {
        self.skip.get(&i).copied().unwrap_or_default()
    }

    pub fn set_skip(&mut self, i: usize, value: Glue, scope: Scope) {
        self.skip.insert(i, value, scope);
    }

    pub fn toks(&self, i: usize) -> &[Token] {
        self.toks.get(&i).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn set_toks(&mut self, i: usize, value: Vec<Token>, scope: Scope) {
        self.toks.insert(i, value, scope);
    }

    /// Returns the box in a register, or [None] if the register is void.
    pub fn get_box(&self, i: usize) -> Option<&TexBox> {
        self.boxes.get(&i).and_then(Option::as_ref)
    }

    pub fn set_box(&mut self, i: usize, value: Option<TexBox>, scope: Scope) {
        self.boxes.insert(i, value, scope);
    }

    /// Removes the box from a register, leaving the register void in the current group.
    pub fn take_box(&mut self, i: usize) -> Option<TexBox> {
        let b = self.get_box(i).cloned();
        if b.is_some() {
            self.boxes.insert(i, None, Scope::Local);
        }
        b
    }

    pub fn begin_group(&mut self) {
        self.count.begin_group();
        self.dimen.begin_group();
        self.skip.begin_group();
        self.toks.begin_group();
        self.boxes.begin_group();
    }

    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        self.count.end_group()?;
        self.dimen.end_group()?;
        self.skip.end_group()?;
        self.toks.end_group()?;
        self.boxes.end_group()
    }
}
