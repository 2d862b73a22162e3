//! Primitives that the banisher packages into aggregates: macro definitions, `\let`,
//! and case changes, plus reading balanced texts.

use super::Banisher;
use crate::error::{Error, Result};
use crate::instruction::{Instruction, InstructionToken, LetTarget, MacroDefinition};
use crate::primitive::Primitive;
use crate::texmacro::Macro;
use crate::token::{CommandRef, Token, Value};
use std::rc::Rc;

impl Banisher {
    /// Reads a `\def`, `\gdef`, `\edef` or `\xdef`.
    ///
    /// If the name or parameter text is incomplete, the tokens read are returned to the input.
    pub(super) fn read_definition(&mut self, token: Token, p: Primitive) -> Result<InstructionToken> {
        let mut consumed = vec![];
        match self.read_definition_head(&mut consumed) {
            Ok((name, name_token, parameter_text, brace)) => {
                let replacement_text = match p {
                    Primitive::EDef | Primitive::XDef => self.read_expanded_balanced(),
                    _ => self.read_balanced_raw(),
                };
                let replacement_text = match replacement_text {
                    Ok(replacement_text) => replacement_text,
                    Err(err) => {
                        self.unread_all(consumed);
                        self.unread(token);
                        return Err(err);
                    }
                };
                let definition =
                    Macro::parse(name_token, parameter_text, replacement_text, brace, &self.interner)?;
                log::debug!(
                    "read the definition of {} with {} parameter(s)",
                    name.to_string(&self.interner),
                    definition.num_parameters()
                );
                Ok(InstructionToken::new(
                    Instruction::MacroDefinition(Box::new(MacroDefinition {
                        name,
                        definition: Rc::new(definition),
                        force_global: matches!(p, Primitive::GDef | Primitive::XDef),
                    })),
                    token,
                ))
            }
            Err(err) => {
                self.unread_all(consumed);
                self.unread(token);
                Err(err)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn read_definition_head(
        &mut self,
        consumed: &mut Vec<Token>,
    ) -> Result<(CommandRef, Token, Vec<Token>, Option<Token>)> {
        let (name, name_token) = self.read_command_name(consumed, "reading the name of a macro")?;
        let mut parameter_text = vec![];
        let brace = loop {
            let token = self.next_raw_recorded(consumed, "reading the parameter text of a macro")?;
            match token.value() {
                Value::BeginGroup(_) => break token,
                Value::EndGroup(_) => {
                    return Err(Error::unbalanced(
                        Some(token),
                        "end group character in the parameter text of a macro",
                    ))
                }
                _ => parameter_text.push(token),
            }
        };
        let brace_delimited = matches!(parameter_text.last().map(Token::value), Some(Value::Parameter(_)));
        let brace = if brace_delimited {
            parameter_text.pop();
            Some(brace)
        } else {
            None
        };
        Ok((name, name_token, parameter_text, brace))
    }

    fn next_raw_recorded(&mut self, consumed: &mut Vec<Token>, doing: &str) -> Result<Token> {
        match self.next_raw()? {
            None => Err(Error::end_of_input(doing)),
            Some(token) => {
                consumed.push(token);
                Ok(token)
            }
        }
    }

    /// Reads the control sequence or active character being defined.
    fn read_command_name(&mut self, consumed: &mut Vec<Token>, doing: &str) -> Result<(CommandRef, Token)> {
        let token = self.next_raw_recorded(consumed, doing)?;
        match token.command_ref() {
            Some(command_ref @ (CommandRef::ControlSequence(_) | CommandRef::ActiveCharacter(_))) => {
                Ok((command_ref, token))
            }
            _ => Err(self.syntax_error(
                "a control sequence or active character",
                Some(token),
                "only control sequences and active characters can be defined",
            )),
        }
    }

    /// Reads a `\let` or `\futurelet`.
    pub(super) fn read_let(&mut self, token: Token, future: bool) -> Result<InstructionToken> {
        let mut consumed = vec![];
        match self.read_let_inner(&mut consumed, future) {
            Ok((name, target)) => Ok(InstructionToken::new(
                Instruction::LetTarget(Box::new(LetTarget { name, target })),
                token,
            )),
            Err(err) => {
                self.unread_all(consumed);
                self.unread(token);
                Err(err)
            }
        }
    }

    fn read_let_inner(&mut self, consumed: &mut Vec<Token>, future: bool) -> Result<(CommandRef, Token)> {
        let (name, _) = self.read_command_name(consumed, "reading the name in \\let")?;
        if future {
            let first = self.next_raw_recorded(consumed, "reading the tokens after \\futurelet")?;
            let second = self.next_raw_recorded(consumed, "reading the tokens after \\futurelet")?;
            self.unread(second);
            self.unread(first);
            return Ok((name, second));
        }
        // TeX.2021.1221: optional spaces, an optional = and then one optional space.
        let mut token = self.next_raw_recorded(consumed, "reading the target of \\let")?;
        while let Value::Space(_) = token.value() {
            token = self.next_raw_recorded(consumed, "reading the target of \\let")?;
        }
        if let Value::Other('=') = token.value() {
            token = self.next_raw_recorded(consumed, "reading the target of \\let")?;
            if let Value::Space(_) = token.value() {
                token = self.next_raw_recorded(consumed, "reading the target of \\let")?;
            }
        }
        Ok((name, token))
    }

    /// Performs `\uppercase` or `\lowercase`: the case-changed text is put back on the input.
    pub(super) fn shift_case(&mut self, token: Token, upper: bool) -> Result<()> {
        let mark = self.mark();
        loop {
            let it = self.next_expanded_or_err("reading the text of a case change")?;
            match it.instruction {
                Instruction::Character(Value::Space(_)) | Instruction::Primitive(Primitive::Relax) => {
                    continue
                }
                Instruction::Character(Value::BeginGroup(_)) => break,
                _ => {
                    let got = it.token;
                    self.push_back(it);
                    return Err(self.syntax_error(
                        "a begin group character",
                        Some(got),
                        &format!["the text of {} must be enclosed in braces", self.describe(token)],
                    ));
                }
            }
        }
        self.truncate_window(mark);
        let text = self.read_balanced_raw()?;
        let codes = &self.state.codes;
        let shifted: Vec<Token> = text
            .into_iter()
            .map(|t| {
                let map = |c: char| -> char {
                    let mapped = if upper {
                        codes.upper_case(c)
                    } else {
                        codes.lower_case(c)
                    };
                    mapped.unwrap_or(c)
                };
                let value = match t.value() {
                    Value::BeginGroup(c) => Value::BeginGroup(map(c)),
                    Value::EndGroup(c) => Value::EndGroup(map(c)),
                    Value::MathShift(c) => Value::MathShift(map(c)),
                    Value::AlignmentTab(c) => Value::AlignmentTab(map(c)),
                    Value::Parameter(c) => Value::Parameter(map(c)),
                    Value::Superscript(c) => Value::Superscript(map(c)),
                    Value::Subscript(c) => Value::Subscript(map(c)),
                    Value::Space(c) => Value::Space(map(c)),
                    Value::Letter(c) => Value::Letter(map(c)),
                    Value::Other(c) => Value::Other(map(c)),
                    Value::CommandRef(CommandRef::ActiveCharacter(c)) => {
                        Value::CommandRef(CommandRef::ActiveCharacter(map(c)))
                    }
                    value @ Value::CommandRef(_) => value,
                };
                t.with_value(value)
            })
            .collect();
        self.unread_all(shifted);
        Ok(())
    }

    /// Reads unexpanded tokens up to the end group character matching an already read `{`.
    ///
    /// If the input ends first, the tokens read are returned to the input.
    pub(super) fn read_balanced_raw(&mut self) -> Result<Vec<Token>> {
        let mut result = vec![];
        let mut depth = 0_usize;
        loop {
            let token = match self.next_raw()? {
                None => {
                    self.unread_all(result);
                    return Err(Error::end_of_input("reading a balanced text"));
                }
                Some(token) => token,
            };
            match token.value() {
                Value::BeginGroup(_) => depth += 1,
                Value::EndGroup(_) => {
                    if depth == 0 {
                        return Ok(result);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            result.push(token);
        }
    }

    /// Reads a balanced text, expanding it as `\edef` does.
    ///
    /// Tokens after `\noexpand` and the tokens produced by `\the` are not expanded further.
    pub(super) fn read_expanded_balanced(&mut self) -> Result<Vec<Token>> {
        let mut result = vec![];
        let mut depth = 0_usize;
        loop {
            let (token, protected) = match self.next_raw_with_protection()? {
                None => return Err(Error::end_of_input("reading an expanded balanced text")),
                Some(next) => next,
            };
            if !protected {
                match self.state.router.classify(token) {
                    Instruction::Macro(m) => {
                        self.expand_macro(token, &m)?;
                        continue;
                    }
                    Instruction::Primitive(Primitive::NoExpand) => {
                        match self.next_raw()? {
                            None => {
                                return Err(Error::end_of_input("reading the token after \\noexpand"))
                            }
                            Some(next) => result.push(next),
                        }
                        continue;
                    }
                    Instruction::Primitive(Primitive::The) => {
                        self.count_expansion(token)?;
                        let mark = self.mark();
                        let tokens = self.the(token);
                        self.truncate_window(mark);
                        result.extend(tokens?);
                        continue;
                    }
                    Instruction::Primitive(p) if p.is_expandable() => {
                        self.expand_primitive(token, p)?;
                        continue;
                    }
                    Instruction::Undefined => {
                        return Err(self.undefined_error(token));
                    }
                    _ => {}
                }
            }
            self.consecutive_expansions = 0;
            match token.value() {
                Value::BeginGroup(_) => depth += 1,
                Value::EndGroup(_) => {
                    if depth == 0 {
                        return Ok(result);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            result.push(token);
        }
    }
}
