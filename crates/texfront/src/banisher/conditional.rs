//! Conditionals.
//!
//! Each open conditional has a frame on a stack. The frame records which part of the
//! conditional is being processed, which decides what a subsequent `\else`, `\or` or `\fi`
//! means. False branches are skipped by reading raw tokens and counting nested conditionals
//! (TeX.2021.494).

use super::Banisher;
use crate::error::{Error, Result};
use crate::instruction::{self, Instruction};
use crate::parse::Parsable;
use crate::primitive::Primitive;
use crate::token::{CatCode, Frozen, Token};
use std::cmp::Ordering;
use texfront_core::Scaled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Conditional {
    /// The condition is still being read.
    Evaluating,
    /// In the true branch.
    True,
    /// In the else branch.
    Else,
    /// In the selected case of an `\ifcase`.
    Case,
}

enum Outcome {
    Bool(bool),
    Case(i32),
}

/// Where skipping stopped.
enum Stop {
    Else,
    Or,
    Fi,
}

impl Banisher {
    pub(super) fn conditional_start(&mut self, token: Token, p: Primitive, mark: usize) -> Result<()> {
        self.conditionals.push(Conditional::Evaluating);
        let depth = self.conditionals.len();
        let outcome = match self.evaluate(p) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.conditionals.truncate(depth - 1);
                self.restore(token, mark);
                return Err(err);
            }
        };
        // Instructions the parser looked ahead at are returned to the raw input,
        // as they may be skipped.
        while let Some(it) = self.pushback.pop() {
            self.unread_instruction(it);
        }
        log::trace!("{} evaluated", self.describe(token));
        match outcome {
            Outcome::Bool(true) => self.set_top(Conditional::True),
            Outcome::Bool(false) => match self.skip_branch(token, depth)? {
                Stop::Fi => {
                    self.conditionals.pop();
                }
                Stop::Else => self.set_top(Conditional::Else),
                Stop::Or => {
                    self.conditionals.pop();
                    return Err(self.extra(token, "\\or"));
                }
            },
            Outcome::Case(mut n) => {
                if n < 0 {
                    n = i32::MAX;
                }
                while n > 0 {
                    match self.skip_branch(token, depth)? {
                        Stop::Or => n -= 1,
                        Stop::Else => {
                            self.set_top(Conditional::Else);
                            return Ok(());
                        }
                        Stop::Fi => {
                            self.conditionals.pop();
                            return Ok(());
                        }
                    }
                }
                self.set_top(Conditional::Case);
            }
        }
        Ok(())
    }

    fn set_top(&mut self, c: Conditional) {
        if let Some(top) = self.conditionals.last_mut() {
            *top = c;
        }
    }

    pub(super) fn conditional_end(&mut self, token: Token, p: Primitive) -> Result<()> {
        let top = match self.conditionals.last() {
            None => return Err(self.extra(token, &format!["\\{}", p.name()])),
            Some(top) => *top,
        };
        match (top, p) {
            (Conditional::Evaluating, _) => {
                // The condition is incomplete: end it with a \relax and read this token again.
                self.unread(token);
                self.unread(Token::new_frozen(Frozen::Relax, token.trace_key()));
            }
            (_, Primitive::Fi) => {
                self.conditionals.pop();
            }
            (Conditional::True | Conditional::Case, Primitive::Else)
            | (Conditional::Case, Primitive::Or) => {
                let depth = self.conditionals.len();
                self.skip_to_fi(token, depth)?;
                self.conditionals.pop();
            }
            _ => return Err(self.extra(token, &format!["\\{}", p.name()])),
        }
        Ok(())
    }

    fn extra(&self, token: Token, name: &str) -> Box<Error> {
        Box::new(Error::ExtraConditionalToken {
            token,
            name: name.to_string(),
        })
    }

    /// Skips to the next `\else`, `\or` or `\fi` of the conditional at the given depth.
    ///
    /// If skipping fails the conditional is abandoned. Running out of input is not
    /// retryable here, as the skipped tokens are gone.
    fn skip_branch(&mut self, start: Token, depth: usize) -> Result<Stop> {
        self.skip_nested(start).map_err(|err| {
            self.conditionals.truncate(depth - 1);
            if err.is_end_of_input() {
                Box::new(Error::IncompleteConditional {
                    token: start,
                    name: self.describe(start),
                })
            } else {
                err
            }
        })
    }

    fn skip_nested(&mut self, start: Token) -> Result<Stop> {
        let mut depth = 0_usize;
        loop {
            let token = match self.next_raw()? {
                None => {
                    return Err(Error::end_of_input(format![
                        "skipping the branch of the conditional {}",
                        self.describe(start)
                    ]))
                }
                Some(token) => token,
            };
            match self.state.router.classify(token) {
                Instruction::Primitive(p) if p.is_conditional() => depth += 1,
                Instruction::Primitive(Primitive::Fi) => {
                    if depth == 0 {
                        return Ok(Stop::Fi);
                    }
                    depth -= 1;
                }
                Instruction::Primitive(Primitive::Else) if depth == 0 => return Ok(Stop::Else),
                Instruction::Primitive(Primitive::Or) if depth == 0 => return Ok(Stop::Or),
                Instruction::Macro(m) if self.config.expand_while_skipping => {
                    self.expand_macro(token, &m)?;
                }
                _ => self.consecutive_expansions = 0,
            }
        }
    }

    fn skip_to_fi(&mut self, start: Token, depth: usize) -> Result<()> {
        loop {
            if let Stop::Fi = self.skip_branch(start, depth)? {
                return Ok(());
            }
        }
    }

    fn evaluate(&mut self, p: Primitive) -> Result<Outcome> {
        Ok(match p {
            Primitive::IfTrue => Outcome::Bool(true),
            Primitive::IfFalse => Outcome::Bool(false),
            Primitive::IfNum => {
                let a = i32::parse(self)?;
                let ordering = Ordering::parse(self)?;
                let b = i32::parse(self)?;
                Outcome::Bool(a.cmp(&b) == ordering)
            }
            Primitive::IfDim => {
                let a = Scaled::parse(self)?;
                let ordering = Ordering::parse(self)?;
                let b = Scaled::parse(self)?;
                Outcome::Bool(a.cmp(&b) == ordering)
            }
            Primitive::IfOdd => Outcome::Bool(i32::parse(self)? % 2 != 0),
            Primitive::IfCase => Outcome::Case(i32::parse(self)?),
            Primitive::IfX => {
                let a = self.next_raw_or_err("reading the first token after \\ifx")?;
                let b = match self.next_raw_or_err("reading the second token after \\ifx") {
                    Ok(b) => b,
                    Err(err) => {
                        self.unread(a);
                        return Err(err);
                    }
                };
                let a = self.state.router.classify(a);
                let b = self.state.router.classify(b);
                Outcome::Bool(instruction::same_meaning(&a, &b))
            }
            Primitive::If => {
                let (a, _) = self.char_and_cat_code_for_if()?;
                let (b, _) = self.char_and_cat_code_for_if()?;
                Outcome::Bool(a == b)
            }
            Primitive::IfCat => {
                let (_, a) = self.char_and_cat_code_for_if()?;
                let (_, b) = self.char_and_cat_code_for_if()?;
                Outcome::Bool(a == b)
            }
            Primitive::IfVMode => Outcome::Bool(self.mode().is_vertical()),
            Primitive::IfHMode => Outcome::Bool(self.mode().is_horizontal()),
            Primitive::IfMMode => Outcome::Bool(false),
            Primitive::IfInner => Outcome::Bool(self.mode().is_inner()),
            _ => Outcome::Bool(false),
        })
    }

    pub(super) fn next_raw_or_err(&mut self, doing: &str) -> Result<Token> {
        match self.next_raw()? {
            None => Err(Error::end_of_input(doing)),
            Some(token) => Ok(token),
        }
    }

    /// TeX.2021.506. Commands that are not characters compare as character 256 with
    /// category 16, so they are all equal to each other.
    fn char_and_cat_code_for_if(&mut self) -> Result<(Option<char>, Option<CatCode>)> {
        let it = self.next_expanded_or_err("reading a token to compare in \\if or \\ifcat")?;
        Ok(match it.instruction {
            Instruction::Character(value) => match value.char_and_cat_code() {
                Some((c, cat_code)) => (Some(c), Some(cat_code)),
                None => (None, None),
            },
            Instruction::NoExpand => match it.token.value().char_and_cat_code() {
                Some((c, cat_code)) => (Some(c), Some(cat_code)),
                None => (None, None),
            },
            _ => (None, None),
        })
    }
}
